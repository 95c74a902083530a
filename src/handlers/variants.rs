use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use std::collections::{BTreeSet, HashSet};

use super::{AppState, search_window};
use crate::{
    Error, Result,
    datamodel::{CallSet, VariantAnnotationSet, VariantSet},
    ids::Identified,
    paging::{SearchScope, Sequential},
    types::{
        self, SearchCallSetsRequest, SearchCallSetsResponse, SearchVariantAnnotationSetsRequest,
        SearchVariantAnnotationSetsResponse, SearchVariantAnnotationsRequest,
        SearchVariantAnnotationsResponse, SearchVariantSetsRequest, SearchVariantSetsResponse,
        SearchVariantsRequest, SearchVariantsResponse,
    },
};

pub async fn search_variant_sets(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SearchVariantSetsRequest>, JsonRejection>,
) -> Result<Json<SearchVariantSetsResponse>> {
    let Json(request) = payload?;
    let dataset = state.repository.get_dataset(&request.dataset_id)?;
    let candidates = dataset.variant_sets.iter().map(VariantSet::to_protocol);

    let scope = SearchScope::new("variantsets").with(&request.dataset_id);
    let page = state.paginate(
        Sequential(candidates),
        request.page_size,
        &request.page_token,
        &scope,
    )?;

    Ok(Json(SearchVariantSetsResponse {
        variant_sets: page.items,
        next_page_token: page.next_page_token,
    }))
}

pub async fn get_variant_set(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<types::VariantSet>> {
    let variant_set = state.repository.get_variant_set(&id)?;
    Ok(Json(variant_set.to_protocol()))
}

pub async fn search_call_sets(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SearchCallSetsRequest>, JsonRejection>,
) -> Result<Json<SearchCallSetsResponse>> {
    let Json(request) = payload?;
    let variant_set = state.repository.get_variant_set(&request.variant_set_id)?;
    let candidates = variant_set
        .call_sets
        .iter()
        .filter(|call_set| request.name.is_empty() || call_set.local_id() == request.name)
        .map(CallSet::to_protocol);

    let scope = SearchScope::new("callsets")
        .with(&request.variant_set_id)
        .with(&request.name);
    let page = state.paginate(
        Sequential(candidates),
        request.page_size,
        &request.page_token,
        &scope,
    )?;

    Ok(Json(SearchCallSetsResponse {
        call_sets: page.items,
        next_page_token: page.next_page_token,
    }))
}

pub async fn get_call_set(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<types::CallSet>> {
    let call_set = state.repository.get_call_set(&id)?;
    Ok(Json(call_set.to_protocol()))
}

pub async fn search_variants(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SearchVariantsRequest>, JsonRejection>,
) -> Result<Json<SearchVariantsResponse>> {
    let Json(request) = payload?;
    let variant_set = state.repository.get_variant_set(&request.variant_set_id)?;
    let (start, end) = search_window(request.start, request.end)?;

    // Call set filter: set semantics, every id must name a call set of this
    // variant set.
    let mut call_set_keys = HashSet::new();
    for id in &request.call_set_ids {
        let call_set = state.repository.get_call_set(id)?;
        if call_set.parent_id().as_ref() != Some(&variant_set.id) {
            return Err(Error::Inconsistent(format!(
                "call set '{id}' does not belong to variant set '{}'",
                request.variant_set_id
            )));
        }
        call_set_keys.insert(call_set.local_id().to_string());
    }
    let call_set_filter = (!call_set_keys.is_empty()).then_some(&call_set_keys);

    let (first, last) = clamp_to_reference(&state, variant_set, &request.reference_name, start, end);
    let candidates = variant_set.variants(&request.reference_name, first, last, call_set_filter);

    let scope = SearchScope::new("variants")
        .with(&request.variant_set_id)
        .with(&request.reference_name)
        .with(start.to_string())
        .with(end.to_string())
        .with_all(call_set_keys.iter().collect::<BTreeSet<_>>());
    let page = state.paginate(
        candidates,
        request.page_size,
        &request.page_token,
        &scope,
    )?;

    Ok(Json(SearchVariantsResponse {
        variants: page.items,
        next_page_token: page.next_page_token,
    }))
}

pub async fn get_variant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<types::Variant>> {
    Ok(Json(state.repository.get_variant(&id)?))
}

pub async fn search_variant_annotation_sets(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SearchVariantAnnotationSetsRequest>, JsonRejection>,
) -> Result<Json<SearchVariantAnnotationSetsResponse>> {
    let Json(request) = payload?;
    let variant_set = state.repository.get_variant_set(&request.variant_set_id)?;
    let candidates = variant_set
        .annotation_sets
        .iter()
        .map(VariantAnnotationSet::to_protocol);

    let scope = SearchScope::new("variantannotationsets").with(&request.variant_set_id);
    let page = state.paginate(
        Sequential(candidates),
        request.page_size,
        &request.page_token,
        &scope,
    )?;

    Ok(Json(SearchVariantAnnotationSetsResponse {
        variant_annotation_sets: page.items,
        next_page_token: page.next_page_token,
    }))
}

pub async fn get_variant_annotation_set(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<types::VariantAnnotationSet>> {
    let annotation_set = state.repository.get_variant_annotation_set(&id)?;
    Ok(Json(annotation_set.to_protocol()))
}

pub async fn search_variant_annotations(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SearchVariantAnnotationsRequest>, JsonRejection>,
) -> Result<Json<SearchVariantAnnotationsResponse>> {
    let Json(request) = payload?;
    let annotation_set = state
        .repository
        .get_variant_annotation_set(&request.variant_annotation_set_id)?;
    let variant_set = state.repository.annotated_variant_set(annotation_set)?;
    let (start, end) = search_window(request.start, request.end)?;

    // Order and duplicates in the requested effects never matter.
    let effects: HashSet<String> = request.effects.iter().map(|term| term.id.clone()).collect();
    let (first, last) = clamp_to_reference(&state, variant_set, &request.reference_name, start, end);
    let candidates = annotation_set.annotations(
        variant_set,
        &request.reference_name,
        first,
        last,
        &effects,
    );

    let scope = SearchScope::new("variantannotations")
        .with(&request.variant_annotation_set_id)
        .with(&request.reference_name)
        .with(start.to_string())
        .with(end.to_string())
        .with_all(effects.iter().collect::<BTreeSet<_>>());
    let page = state.paginate(
        candidates,
        request.page_size,
        &request.page_token,
        &scope,
    )?;

    Ok(Json(SearchVariantAnnotationsResponse {
        variant_annotations: page.items,
        next_page_token: page.next_page_token,
    }))
}

/// Narrows a search window to the named reference of the variant set's
/// reference set. A reference the set is not aligned to has no variants.
fn clamp_to_reference(
    state: &AppState,
    variant_set: &VariantSet,
    reference_name: &str,
    start: u64,
    end: u64,
) -> (u64, u64) {
    match state
        .repository
        .reference_length(variant_set.reference_set_id.as_ref(), reference_name)
    {
        Some(length) => {
            let end = end.min(length);
            (start.min(end), end)
        }
        None => {
            tracing::debug!(reference_name, "reference not in the variant set's reference set");
            (0, 0)
        }
    }
}
