use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};

use super::AppState;
use crate::{
    Result,
    datamodel::{Reference, ReferenceSet},
    paging::{SearchScope, Sequential},
    types::{
        self, ListReferenceBasesRequest, ListReferenceBasesResponse, SearchReferenceSetsRequest,
        SearchReferenceSetsResponse, SearchReferencesRequest, SearchReferencesResponse,
    },
};

/// Empty filter values match everything.
fn matches(filter: &str, value: &str) -> bool {
    filter.is_empty() || filter == value
}

fn has_accession(filter: &str, accessions: &[String]) -> bool {
    filter.is_empty() || accessions.iter().any(|a| a == filter)
}

pub async fn search_reference_sets(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SearchReferenceSetsRequest>, JsonRejection>,
) -> Result<Json<SearchReferenceSetsResponse>> {
    let Json(request) = payload?;
    let candidates = state
        .repository
        .reference_sets()
        .iter()
        .filter(|set| {
            matches(&request.md5checksum, &set.md5checksum)
                && matches(&request.assembly_id, &set.assembly_id)
                && has_accession(&request.accession, &set.source_accessions)
        })
        .map(ReferenceSet::to_protocol);

    let scope = SearchScope::new("referencesets")
        .with(&request.md5checksum)
        .with(&request.accession)
        .with(&request.assembly_id);
    let page = state.paginate(
        Sequential(candidates),
        request.page_size,
        &request.page_token,
        &scope,
    )?;

    Ok(Json(SearchReferenceSetsResponse {
        reference_sets: page.items,
        next_page_token: page.next_page_token,
    }))
}

pub async fn get_reference_set(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<types::ReferenceSet>> {
    let reference_set = state.repository.get_reference_set(&id)?;
    Ok(Json(reference_set.to_protocol()))
}

pub async fn search_references(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SearchReferencesRequest>, JsonRejection>,
) -> Result<Json<SearchReferencesResponse>> {
    let Json(request) = payload?;
    let reference_set = state
        .repository
        .get_reference_set(&request.reference_set_id)?;

    let candidates = reference_set
        .references
        .iter()
        .filter(|reference| {
            matches(&request.md5checksum, &reference.md5checksum)
                && has_accession(&request.accession, &reference.source_accessions)
        })
        .map(Reference::to_protocol);

    let scope = SearchScope::new("references")
        .with(&request.reference_set_id)
        .with(&request.md5checksum)
        .with(&request.accession);
    let page = state.paginate(
        Sequential(candidates),
        request.page_size,
        &request.page_token,
        &scope,
    )?;

    Ok(Json(SearchReferencesResponse {
        references: page.items,
        next_page_token: page.next_page_token,
    }))
}

pub async fn get_reference(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<types::Reference>> {
    let reference = state.repository.get_reference(&id)?;
    Ok(Json(reference.to_protocol()))
}

/// Serves `[start, end)` of a reference's bases, one budget-sized chunk per
/// request.
pub async fn list_reference_bases(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: std::result::Result<Query<ListReferenceBasesRequest>, QueryRejection>,
) -> Result<Json<ListReferenceBasesResponse>> {
    let reference = state.repository.get_reference(&id)?;
    let Query(request) = query?;

    let length = reference.length();
    let end = request
        .end
        .unwrap_or_else(|| i64::try_from(length).unwrap_or(i64::MAX));
    let page = state
        .range_pager()
        .page(request.start, end, length, &request.page_token)?;

    let from = page.offset as usize;
    let to = from + page.len as usize;
    let sequence = String::from_utf8_lossy(&reference.bases[from..to]).into_owned();

    tracing::debug!(
        reference = %reference.name(),
        offset = page.offset,
        len = page.len,
        "listed reference bases"
    );

    Ok(Json(ListReferenceBasesResponse {
        sequence,
        offset: page.offset,
        next_page_token: page.next_page_token,
    }))
}
