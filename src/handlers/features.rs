use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};

use super::{AppState, search_window};
use crate::{
    Result,
    datamodel::FeatureSet,
    paging::{SearchScope, Sequential},
    types::{
        self, SearchFeatureSetsRequest, SearchFeatureSetsResponse, SearchFeaturesRequest,
        SearchFeaturesResponse,
    },
};

pub async fn search_feature_sets(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SearchFeatureSetsRequest>, JsonRejection>,
) -> Result<Json<SearchFeatureSetsResponse>> {
    let Json(request) = payload?;
    let dataset = state.repository.get_dataset(&request.dataset_id)?;
    let candidates = dataset.feature_sets.iter().map(FeatureSet::to_protocol);

    let scope = SearchScope::new("featuresets").with(&request.dataset_id);
    let page = state.paginate(
        Sequential(candidates),
        request.page_size,
        &request.page_token,
        &scope,
    )?;

    Ok(Json(SearchFeatureSetsResponse {
        feature_sets: page.items,
        next_page_token: page.next_page_token,
    }))
}

pub async fn get_feature_set(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<types::FeatureSet>> {
    let feature_set = state.repository.get_feature_set(&id)?;
    Ok(Json(feature_set.to_protocol()))
}

pub async fn search_features(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SearchFeaturesRequest>, JsonRejection>,
) -> Result<Json<SearchFeaturesResponse>> {
    let Json(request) = payload?;
    let feature_set = state.repository.get_feature_set(&request.feature_set_id)?;
    let (start, end) = search_window(request.start, request.end)?;

    // A parent filter must name a feature that exists.
    let parent = if request.parent_id.is_empty() {
        None
    } else {
        Some(state.repository.get_feature(&request.parent_id)?)
    };

    let candidates = feature_set.features(
        &request.reference_name,
        start,
        end,
        parent.as_ref().map(|feature| feature.id.as_str()),
    );

    let scope = SearchScope::new("features")
        .with(&request.feature_set_id)
        .with(&request.reference_name)
        .with(start.to_string())
        .with(end.to_string())
        .with(&request.parent_id);
    let page = state.paginate(candidates, request.page_size, &request.page_token, &scope)?;

    Ok(Json(SearchFeaturesResponse {
        features: page.items,
        next_page_token: page.next_page_token,
    }))
}

pub async fn get_feature(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<types::Feature>> {
    Ok(Json(state.repository.get_feature(&id)?))
}
