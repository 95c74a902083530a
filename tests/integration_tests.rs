//! Integration tests for ga4ghr
//!
//! Every test runs against a fresh simulated repository built from the
//! default parameters.

use axum::http::StatusCode;
use axum_test::TestServer;
use ga4ghr::{
    datamodel::{DataRepository, SimulationParams},
    handlers::{AppState, create_router},
};
use serde_json::{Value, json};

const NOT_FOUND_CODE: i64 = 758389611;

fn create_test_state() -> AppState {
    let repository = DataRepository::simulated(&SimulationParams::default()).unwrap();
    AppState::new(repository, 1024 * 1024, 100)
}

fn create_test_server() -> TestServer {
    TestServer::new(create_router(create_test_state())).unwrap()
}

fn create_test_server_with_state() -> (TestServer, AppState) {
    let state = create_test_state();
    let server = TestServer::new(create_router(state.clone())).unwrap();
    (server, state)
}

async fn search(server: &TestServer, path: &str, body: Value) -> Value {
    let response = server.post(path).json(&body).await;
    response.assert_status_ok();
    response.json()
}

/// Follows next_page_token until exhausted and returns every item of `field`.
async fn search_all(server: &TestServer, path: &str, mut body: Value, field: &str) -> Vec<Value> {
    let mut items = Vec::new();
    loop {
        let page = search(server, path, body.clone()).await;
        items.extend(page[field].as_array().unwrap().iter().cloned());
        let token = page["next_page_token"].as_str().unwrap().to_string();
        if token.is_empty() {
            return items;
        }
        body["page_token"] = json!(token);
    }
}

fn assert_exception(response: &axum_test::TestResponse, status: StatusCode) -> Value {
    response.assert_status(status);
    let body: Value = response.json();
    assert!(body["error_code"].as_i64().unwrap() > 0);
    assert!(!body["message"].as_str().unwrap().is_empty());
    body
}

async fn first_dataset_id(server: &TestServer) -> String {
    let page = search(server, "/datasets/search", json!({})).await;
    page["datasets"][0]["id"].as_str().unwrap().to_string()
}

async fn first_variant_set_id(server: &TestServer) -> String {
    let dataset_id = first_dataset_id(server).await;
    let page = search(server, "/variantsets/search", json!({ "dataset_id": dataset_id })).await;
    page["variant_sets"][0]["id"].as_str().unwrap().to_string()
}

async fn first_reference(server: &TestServer) -> Value {
    let sets = search(server, "/referencesets/search", json!({})).await;
    let set_id = sets["reference_sets"][0]["id"].as_str().unwrap();
    let page = search(server, "/references/search", json!({ "reference_set_id": set_id })).await;
    page["references"][0].clone()
}

#[tokio::test]
async fn test_service_info() {
    let server = create_test_server();

    let response = server.get("/service-info").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["name"], "ga4ghr");
    assert_eq!(body["type"]["group"], "org.ga4gh");
}

#[tokio::test]
async fn test_datasets_search_and_get() {
    let server = create_test_server();

    let page = search(&server, "/datasets/search", json!({})).await;
    let datasets = page["datasets"].as_array().unwrap();
    assert_eq!(datasets.len(), 2);
    assert_eq!(page["next_page_token"], "");

    for dataset in datasets {
        let id = dataset["id"].as_str().unwrap();
        let response = server.get(&format!("/datasets/{id}")).await;
        response.assert_status_ok();
        assert_eq!(&response.json::<Value>(), dataset);
    }
}

#[tokio::test]
async fn test_search_pagination_is_complete() {
    let server = create_test_server();
    let dataset_id = first_dataset_id(&server).await;

    let all = search(&server, "/variantsets/search", json!({ "dataset_id": dataset_id })).await;
    let paged = search_all(
        &server,
        "/variantsets/search",
        json!({ "dataset_id": dataset_id, "page_size": 1 }),
        "variant_sets",
    )
    .await;
    assert_eq!(paged.len(), 4);
    assert_eq!(&paged, all["variant_sets"].as_array().unwrap());
}

#[tokio::test]
async fn test_search_under_tiny_budget_returns_one_item_per_page() {
    let (server, state) = create_test_server_with_state();
    state.set_max_response_length(1);

    let first = search(&server, "/datasets/search", json!({})).await;
    assert_eq!(first["datasets"].as_array().unwrap().len(), 1);
    assert_ne!(first["next_page_token"], "");

    let all = search_all(&server, "/datasets/search", json!({}), "datasets").await;
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_bad_ids_are_not_found() {
    let server = create_test_server();
    let paths = [
        "/datasets/notAnId",
        "/referencesets/notAnId",
        "/references/notAnId",
        "/variantsets/notAnId",
        "/callsets/notAnId",
        "/variants/notAnId",
        "/variantannotationsets/notAnId",
        "/readgroupsets/notAnId",
        "/readgroups/notAnId",
        "/featuresets/notAnId",
        "/features/notAnId",
        "/references/notAnId/bases",
    ];
    for path in paths {
        let response = server.get(path).await;
        let body = assert_exception(&response, StatusCode::NOT_FOUND);
        assert_eq!(body["error_code"], NOT_FOUND_CODE, "{path}");
    }
}

#[tokio::test]
async fn test_bad_parent_id_in_search() {
    let server = create_test_server();
    let response = server
        .post("/variantannotationsets/search")
        .json(&json!({ "variant_set_id": "b4d==" }))
        .await;
    let body = assert_exception(&response, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], NOT_FOUND_CODE);
    assert_eq!(body["message"], "No object of this type exists with id 'b4d=='");
}

#[tokio::test]
async fn test_id_of_wrong_kind_is_not_found() {
    let server = create_test_server();
    let dataset_id = first_dataset_id(&server).await;
    let response = server.get(&format!("/variantsets/{dataset_id}")).await;
    assert_exception(&response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reference_set_filters() {
    let server = create_test_server();
    let all = search(&server, "/referencesets/search", json!({})).await;
    let sets = all["reference_sets"].as_array().unwrap();
    assert_eq!(sets.len(), 3);

    let target = &sets[1];
    for filter in [
        json!({ "md5checksum": target["md5checksum"] }),
        json!({ "accession": "SIMRS1.1" }),
        json!({ "assembly_id": "simulatedAssembly1" }),
    ] {
        let page = search(&server, "/referencesets/search", filter).await;
        assert_eq!(page["reference_sets"], json!([target]));
    }

    for filter in [
        json!({ "md5checksum": "bad" }),
        json!({ "accession": "bad" }),
        json!({ "assembly_id": "bad" }),
    ] {
        let page = search(&server, "/referencesets/search", filter).await;
        assert_eq!(page["reference_sets"], json!([]));
    }

    let id = target["id"].as_str().unwrap();
    let response = server.get(&format!("/referencesets/{id}")).await;
    response.assert_status_ok();
    assert_eq!(&response.json::<Value>(), target);
}

#[tokio::test]
async fn test_reference_filters() {
    let server = create_test_server();
    let sets = search(&server, "/referencesets/search", json!({})).await;
    let set_id = sets["reference_sets"][0]["id"].as_str().unwrap();

    let all = search(&server, "/references/search", json!({ "reference_set_id": set_id })).await;
    let references = all["references"].as_array().unwrap();
    assert_eq!(references.len(), 4);

    let target = &references[2];
    let by_accession = search(
        &server,
        "/references/search",
        json!({ "reference_set_id": set_id, "accession": "SIMREF0_2.1" }),
    )
    .await;
    assert_eq!(by_accession["references"], json!([target]));

    let by_checksum = search(
        &server,
        "/references/search",
        json!({ "reference_set_id": set_id, "md5checksum": target["md5checksum"] }),
    )
    .await;
    assert_eq!(by_checksum["references"], json!([target]));

    let none = search(
        &server,
        "/references/search",
        json!({ "reference_set_id": set_id, "accession": "bad" }),
    )
    .await;
    assert_eq!(none["references"], json!([]));
}

#[tokio::test]
async fn test_list_bases_whole_and_slices() {
    let server = create_test_server();
    let reference = first_reference(&server).await;
    let id = reference["id"].as_str().unwrap();
    let length = reference["length"].as_i64().unwrap();

    let response = server.get(&format!("/references/{id}/bases")).await;
    response.assert_status_ok();
    let whole: Value = response.json();
    let sequence = whole["sequence"].as_str().unwrap().to_string();
    assert_eq!(sequence.len() as i64, length);
    assert_eq!(whole["offset"], 0);
    assert_eq!(whole["next_page_token"], "");

    for (start, end) in [(0, 1), (5, 20), (length - 1, length), (10, 10)] {
        let response = server
            .get(&format!("/references/{id}/bases"))
            .add_query_param("start", start)
            .add_query_param("end", end)
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["sequence"], sequence[start as usize..end as usize]);
        assert_eq!(body["offset"], start);
    }
}

#[tokio::test]
async fn test_list_bases_out_of_bounds() {
    let server = create_test_server();
    let reference = first_reference(&server).await;
    let id = reference["id"].as_str().unwrap();
    let length = reference["length"].as_i64().unwrap();

    for (start, end) in [(-1, 0), (-1, -1), (length, 0), (0, length + 1)] {
        let response = server
            .get(&format!("/references/{id}/bases"))
            .add_query_param("start", start)
            .add_query_param("end", end)
            .await;
        assert_exception(&response, StatusCode::RANGE_NOT_SATISFIABLE);
    }
}

#[tokio::test]
async fn test_list_bases_paged_by_budget() {
    let (server, state) = create_test_server_with_state();
    let reference = first_reference(&server).await;
    let id = reference["id"].as_str().unwrap();
    let length = reference["length"].as_u64().unwrap() as usize;

    let whole: Value = server.get(&format!("/references/{id}/bases")).await.json();
    let expected = whole["sequence"].as_str().unwrap().to_string();

    for budget in [1, 2, length - 1] {
        state.set_max_response_length(budget);
        let mut sequence = String::new();
        let mut token = String::new();
        loop {
            let response = server
                .get(&format!("/references/{id}/bases"))
                .add_query_param("page_token", &token)
                .await;
            response.assert_status_ok();
            let page: Value = response.json();
            assert_eq!(page["offset"].as_u64().unwrap() as usize, sequence.len());
            let chunk = page["sequence"].as_str().unwrap();
            assert!(!chunk.is_empty() && chunk.len() <= budget);
            sequence.push_str(chunk);
            token = page["next_page_token"].as_str().unwrap().to_string();
            if token.is_empty() {
                break;
            }
        }
        assert_eq!(sequence, expected, "budget {budget}");
    }
}

#[tokio::test]
async fn test_variant_sets_and_call_sets() {
    let server = create_test_server();
    let variant_set_id = first_variant_set_id(&server).await;

    let response = server.get(&format!("/variantsets/{variant_set_id}")).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["id"], variant_set_id);

    let all = search(&server, "/callsets/search", json!({ "variant_set_id": variant_set_id })).await;
    let call_sets = all["call_sets"].as_array().unwrap();
    assert_eq!(call_sets.len(), 5);

    let named = search(
        &server,
        "/callsets/search",
        json!({ "variant_set_id": variant_set_id, "name": call_sets[3]["name"] }),
    )
    .await;
    assert_eq!(named["call_sets"], json!([call_sets[3]]));

    let none = search(
        &server,
        "/callsets/search",
        json!({ "variant_set_id": variant_set_id, "name": "bad" }),
    )
    .await;
    assert_eq!(none["call_sets"], json!([]));

    let id = call_sets[0]["id"].as_str().unwrap();
    let response = server.get(&format!("/callsets/{id}")).await;
    response.assert_status_ok();
    assert_eq!(&response.json::<Value>(), &call_sets[0]);
}

#[tokio::test]
async fn test_variants_search() {
    let server = create_test_server();
    let variant_set_id = first_variant_set_id(&server).await;

    let empty = search(
        &server,
        "/variants/search",
        json!({ "variant_set_id": variant_set_id, "reference_name": "srs0", "start": 0, "end": 0 }),
    )
    .await;
    assert_eq!(empty["variants"], json!([]));
    assert_eq!(empty["next_page_token"], "");

    let page = search(
        &server,
        "/variants/search",
        json!({
            "variant_set_id": variant_set_id,
            "reference_name": "srs0",
            "start": 0,
            "end": 65536,
            "page_size": 10,
        }),
    )
    .await;
    let variants = page["variants"].as_array().unwrap();
    assert_eq!(variants.len(), 10);
    assert_ne!(page["next_page_token"], "");
    for variant in variants {
        assert_eq!(variant["calls"].as_array().unwrap().len(), 5);
        let id = variant["id"].as_str().unwrap();
        let response = server.get(&format!("/variants/{id}")).await;
        response.assert_status_ok();
        assert_eq!(&response.json::<Value>(), variant);
    }
}

#[tokio::test]
async fn test_variants_paging_stays_on_reference() {
    let server = create_test_server();
    let variant_set_id = first_variant_set_id(&server).await;
    let request = |reference_name: &str| {
        json!({
            "variant_set_id": variant_set_id,
            "reference_name": reference_name,
            "start": 0,
            "end": 1_000_000_000_000i64,
            "page_size": 7,
        })
    };

    // Every position of srs0 holds a variant at the default density, and the
    // window stops at the end of the reference.
    let variants = search_all(&server, "/variants/search", request("srs0"), "variants").await;
    assert!((50..=200).contains(&variants.len()));
    for (position, variant) in variants.iter().enumerate() {
        assert_eq!(variant["start"], json!(position));
    }

    let unknown = search(&server, "/variants/search", request("chr1")).await;
    assert_eq!(unknown["variants"], json!([]));
    assert_eq!(unknown["next_page_token"], "");
}

#[tokio::test]
async fn test_variants_call_set_filter() {
    let server = create_test_server();
    let variant_set_id = first_variant_set_id(&server).await;
    let call_sets = search(&server, "/callsets/search", json!({ "variant_set_id": variant_set_id })).await;
    let call_set_id = call_sets["call_sets"][1]["id"].clone();

    let page = search(
        &server,
        "/variants/search",
        json!({
            "variant_set_id": variant_set_id,
            "reference_name": "srs0",
            "start": 0,
            "end": 20,
            "call_set_ids": [call_set_id, call_set_id],
        }),
    )
    .await;
    for variant in page["variants"].as_array().unwrap() {
        assert_eq!(variant["calls"].as_array().unwrap().len(), 1);
        assert_eq!(variant["calls"][0]["call_set_id"], call_set_id);
    }
}

#[tokio::test]
async fn test_variants_bad_window_is_inconsistent() {
    let server = create_test_server();
    let variant_set_id = first_variant_set_id(&server).await;
    for (start, end) in [(-1, 10), (10, 5)] {
        let response = server
            .post("/variants/search")
            .json(&json!({
                "variant_set_id": variant_set_id,
                "reference_name": "srs0",
                "start": start,
                "end": end,
            }))
            .await;
        assert_exception(&response, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_variant_annotations_effects_filter() {
    let server = create_test_server();
    let variant_set_id = first_variant_set_id(&server).await;
    let sets = search(
        &server,
        "/variantannotationsets/search",
        json!({ "variant_set_id": variant_set_id }),
    )
    .await;
    let annotation_set = &sets["variant_annotation_sets"][0];
    let annotation_set_id = annotation_set["id"].as_str().unwrap();

    let response = server
        .get(&format!("/variantannotationsets/{annotation_set_id}"))
        .await;
    response.assert_status_ok();
    assert_eq!(&response.json::<Value>(), annotation_set);

    let request = |effects: Value| {
        json!({
            "variant_annotation_set_id": annotation_set_id,
            "reference_name": "srs0",
            "start": 0,
            "end": 50,
            "effects": effects,
        })
    };

    let all = search(&server, "/variantannotations/search", request(json!([]))).await;
    assert!(!all["variant_annotations"].as_array().unwrap().is_empty());

    let intron = json!({ "id": "SO:0001627", "term": "intron_variant" });
    let exon = json!({ "id": "SO:0001791", "term": "exon_variant" });
    let forward = search(&server, "/variantannotations/search", request(json!([intron, exon]))).await;
    let backward = search(&server, "/variantannotations/search", request(json!([exon, intron]))).await;
    assert!(!forward["variant_annotations"].as_array().unwrap().is_empty());
    assert_eq!(forward, backward);

    let nonsense = search(
        &server,
        "/variantannotations/search",
        request(json!([{ "id": "SO:9999999" }])),
    )
    .await;
    assert_eq!(nonsense["variant_annotations"], json!([]));

    // A filter matching nothing over a huge window answers promptly.
    let mut wide = request(json!([{ "id": "ThisIsNotAnEffect" }]));
    wide["end"] = json!(1_000_000);
    let wide = search(&server, "/variantannotations/search", wide).await;
    assert_eq!(wide["variant_annotations"], json!([]));
    assert_eq!(wide["next_page_token"], "");
}

#[tokio::test]
async fn test_read_group_sets_and_groups() {
    let server = create_test_server();
    let dataset_id = first_dataset_id(&server).await;

    let page = search(&server, "/readgroupsets/search", json!({ "dataset_id": dataset_id })).await;
    let set = &page["read_group_sets"][0];
    assert_eq!(set["read_groups"].as_array().unwrap().len(), 2);

    let none = search(
        &server,
        "/readgroupsets/search",
        json!({ "dataset_id": dataset_id, "name": "bad" }),
    )
    .await;
    assert_eq!(none["read_group_sets"], json!([]));

    let id = set["id"].as_str().unwrap();
    let response = server.get(&format!("/readgroupsets/{id}")).await;
    response.assert_status_ok();
    assert_eq!(&response.json::<Value>(), set);

    let group = &set["read_groups"][0];
    let group_id = group["id"].as_str().unwrap();
    let response = server.get(&format!("/readgroups/{group_id}")).await;
    response.assert_status_ok();
    assert_eq!(&response.json::<Value>(), group);
}

async fn read_group_set(server: &TestServer, dataset_index: usize) -> Value {
    let datasets = search(server, "/datasets/search", json!({})).await;
    let dataset_id = &datasets["datasets"][dataset_index]["id"];
    let page = search(server, "/readgroupsets/search", json!({ "dataset_id": dataset_id })).await;
    page["read_group_sets"][0].clone()
}

async fn reference_in(server: &TestServer, reference_set_id: &Value) -> Value {
    let page = search(
        server,
        "/references/search",
        json!({ "reference_set_id": reference_set_id }),
    )
    .await;
    page["references"][0]["id"].clone()
}

#[tokio::test]
async fn test_reads_search() {
    let server = create_test_server();
    let set = read_group_set(&server, 0).await;
    let reference_id = reference_in(&server, &set["reference_set_id"]).await;
    let group_ids: Vec<Value> = set["read_groups"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["id"].clone())
        .collect();

    let single = search(
        &server,
        "/reads/search",
        json!({ "read_group_ids": [group_ids[0]], "reference_id": reference_id }),
    )
    .await;
    let alignments = single["alignments"].as_array().unwrap();
    assert_eq!(alignments.len(), 5);
    assert!(alignments.iter().all(|a| a["read_group_id"] == group_ids[0]));

    let both = search(
        &server,
        "/reads/search",
        json!({ "read_group_ids": group_ids, "reference_id": reference_id }),
    )
    .await;
    assert_eq!(both["alignments"].as_array().unwrap().len(), 10);

    let reordered = search(
        &server,
        "/reads/search",
        json!({
            "read_group_ids": [group_ids[1], group_ids[0], group_ids[1]],
            "reference_id": reference_id,
        }),
    )
    .await;
    assert_eq!(reordered, both);

    let paged = search_all(
        &server,
        "/reads/search",
        json!({ "read_group_ids": group_ids, "reference_id": reference_id, "page_size": 3 }),
        "alignments",
    )
    .await;
    assert_eq!(&paged, both["alignments"].as_array().unwrap());
}

#[tokio::test]
async fn test_reads_unmapped_not_supported() {
    let server = create_test_server();
    let set = read_group_set(&server, 0).await;
    let response = server
        .post("/reads/search")
        .json(&json!({ "read_group_ids": [set["read_groups"][0]["id"]], "reference_id": "" }))
        .await;
    assert_exception(&response, StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn test_reads_inconsistent_requests() {
    let server = create_test_server();
    let set = read_group_set(&server, 0).await;
    let other_set = read_group_set(&server, 1).await;
    let reference_id = reference_in(&server, &set["reference_set_id"]).await;
    let other_reference_id = reference_in(&server, &other_set["reference_set_id"]).await;
    assert_ne!(reference_id, other_reference_id);

    let requests = [
        // No read groups.
        json!({ "read_group_ids": [], "reference_id": reference_id }),
        // Groups from two different read group sets.
        json!({
            "read_group_ids": [set["read_groups"][0]["id"], other_set["read_groups"][0]["id"]],
            "reference_id": reference_id,
        }),
        // Reference outside the read group set's reference set.
        json!({
            "read_group_ids": [set["read_groups"][0]["id"]],
            "reference_id": other_reference_id,
        }),
        // A repeated group plus an id that names nothing.
        json!({
            "read_group_ids": [set["read_groups"][0]["id"], set["read_groups"][0]["id"], "42"],
            "reference_id": reference_id,
        }),
    ];
    for request in requests {
        let response = server.post("/reads/search").json(&request).await;
        assert_exception(&response, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_features_search() {
    let server = create_test_server();
    let dataset_id = first_dataset_id(&server).await;
    let sets = search(&server, "/featuresets/search", json!({ "dataset_id": dataset_id })).await;
    let feature_set = &sets["feature_sets"][0];
    let feature_set_id = feature_set["id"].as_str().unwrap();

    let response = server.get(&format!("/featuresets/{feature_set_id}")).await;
    response.assert_status_ok();
    assert_eq!(&response.json::<Value>(), feature_set);

    let empty = search(
        &server,
        "/features/search",
        json!({ "feature_set_id": feature_set_id, "reference_name": "chr1", "start": 0, "end": 1 }),
    )
    .await;
    assert_eq!(empty["features"], json!([]));

    let page = search(
        &server,
        "/features/search",
        json!({ "feature_set_id": feature_set_id, "reference_name": "chr1", "start": 0, "end": 5000 }),
    )
    .await;
    let features = page["features"].as_array().unwrap();
    assert!(!features.is_empty());
    for feature in features {
        let id = feature["id"].as_str().unwrap();
        let response = server.get(&format!("/features/{id}")).await;
        response.assert_status_ok();
        assert_eq!(&response.json::<Value>(), feature);
    }

    let gene = features.iter().find(|f| f["parent_id"] == "").unwrap();
    let children = search(
        &server,
        "/features/search",
        json!({
            "feature_set_id": feature_set_id,
            "reference_name": "chr1",
            "start": 0,
            "end": 5000,
            "parent_id": gene["id"],
        }),
    )
    .await;
    let children = children["features"].as_array().unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0]["parent_id"], gene["id"]);
}

#[tokio::test]
async fn test_foreign_page_token_rejected() {
    let server = create_test_server();
    let first = search(&server, "/datasets/search", json!({ "page_size": 1 })).await;
    let token = first["next_page_token"].as_str().unwrap();
    assert!(!token.is_empty());

    let response = server
        .post("/referencesets/search")
        .json(&json!({ "page_token": token }))
        .await;
    assert_exception(&response, StatusCode::BAD_REQUEST);

    let response = server
        .post("/datasets/search")
        .json(&json!({ "page_token": "not a token" }))
        .await;
    assert_exception(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_requests() {
    let server = create_test_server();

    let response = server
        .post("/datasets/search")
        .json(&json!({ "page_size": 0 }))
        .await;
    assert_exception(&response, StatusCode::BAD_REQUEST);

    let response = server
        .post("/datasets/search")
        .text("{not json")
        .content_type("application/json")
        .await;
    assert_exception(&response, StatusCode::BAD_REQUEST);
}
