use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use std::collections::BTreeSet;

use super::AppState;
use crate::{
    Error, Result,
    datamodel::{ReadCandidates, ReadGroupSet},
    ids::Identified,
    paging::{SearchScope, Sequential},
    types::{
        self, SearchReadGroupSetsRequest, SearchReadGroupSetsResponse, SearchReadsRequest,
        SearchReadsResponse,
    },
};

pub async fn search_read_group_sets(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SearchReadGroupSetsRequest>, JsonRejection>,
) -> Result<Json<SearchReadGroupSetsResponse>> {
    let Json(request) = payload?;
    let dataset = state.repository.get_dataset(&request.dataset_id)?;
    let candidates = dataset
        .read_group_sets
        .iter()
        .filter(|set| request.name.is_empty() || set.local_id() == request.name)
        .map(ReadGroupSet::to_protocol);

    let scope = SearchScope::new("readgroupsets")
        .with(&request.dataset_id)
        .with(&request.name);
    let page = state.paginate(
        Sequential(candidates),
        request.page_size,
        &request.page_token,
        &scope,
    )?;

    Ok(Json(SearchReadGroupSetsResponse {
        read_group_sets: page.items,
        next_page_token: page.next_page_token,
    }))
}

pub async fn get_read_group_set(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<types::ReadGroupSet>> {
    let set = state.repository.get_read_group_set(&id)?;
    Ok(Json(set.to_protocol()))
}

pub async fn get_read_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<types::ReadGroup>> {
    let read_group = state.repository.get_read_group(&id)?;
    Ok(Json(read_group.to_protocol()))
}

/// Searches alignments of one or more read groups against a single reference.
///
/// Several read groups may only be searched together when they make up a
/// whole read group set.
pub async fn search_reads(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SearchReadsRequest>, JsonRejection>,
) -> Result<Json<SearchReadsResponse>> {
    let Json(request) = payload?;
    if request.reference_id.is_empty() {
        return Err(Error::NotSupported(
            "Searching for unmapped reads is not supported".to_string(),
        ));
    }
    let Some(first_id) = request.read_group_ids.first() else {
        return Err(Error::Inconsistent(
            "at least one read group id is required".to_string(),
        ));
    };

    let first = state.repository.get_read_group(first_id)?;
    let set = state.repository.read_group_set_of(first)?;

    let requested: BTreeSet<&str> = request.read_group_ids.iter().map(String::as_str).collect();
    let groups = if requested.len() == 1 {
        vec![first]
    } else {
        // Ids after the first are compared with the set's members, never
        // resolved on their own.
        let members: Vec<String> = set.read_groups.iter().map(|g| g.id.to_string()).collect();
        let whole_set: BTreeSet<&str> = members.iter().map(String::as_str).collect();
        if requested != whole_set {
            return Err(Error::Inconsistent(
                "read groups searched together must form a complete read group set".to_string(),
            ));
        }
        set.read_groups.iter().collect()
    };

    let reference = state.repository.get_reference(&request.reference_id)?;
    if reference.parent_id().as_ref() != Some(&set.reference_set_id) {
        return Err(Error::Inconsistent(format!(
            "reference '{}' is not in the reference set of read group set '{}'",
            request.reference_id, set.id
        )));
    }

    let length = reference.length();
    let start = u64::try_from(request.start).map_err(|_| {
        Error::Inconsistent(format!("invalid start position {}", request.start))
    })?;
    let end = match request.end {
        None => length,
        Some(end) => u64::try_from(end)
            .map_err(|_| Error::Inconsistent(format!("invalid end position {end}")))?,
    };
    if start > end {
        return Err(Error::Inconsistent(format!(
            "invalid search window [{start}, {end})"
        )));
    }
    let end = end.min(length);
    let start = start.min(end);

    let candidates = ReadCandidates::new(&groups, reference, start, end);
    tracing::debug!(
        groups = groups.len(),
        reference = %reference.name(),
        candidates = candidates.len(),
        "searching reads"
    );

    let scope = SearchScope::new("reads")
        .with(&request.reference_id)
        .with(start.to_string())
        .with(end.to_string())
        .with_all(requested);
    let page = state.paginate(candidates, request.page_size, &request.page_token, &scope)?;

    Ok(Json(SearchReadsResponse {
        alignments: page.items,
        next_page_token: page.next_page_token,
    }))
}
