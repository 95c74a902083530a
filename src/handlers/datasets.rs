use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};

use super::AppState;
use crate::{
    Result,
    datamodel::Dataset,
    paging::{SearchScope, Sequential},
    types::{self, SearchDatasetsRequest, SearchDatasetsResponse},
};

pub async fn search_datasets(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SearchDatasetsRequest>, JsonRejection>,
) -> Result<Json<SearchDatasetsResponse>> {
    let Json(request) = payload?;
    let candidates = state.repository.datasets().iter().map(Dataset::to_protocol);
    let page = state.paginate(
        Sequential(candidates),
        request.page_size,
        &request.page_token,
        &SearchScope::new("datasets"),
    )?;

    Ok(Json(SearchDatasetsResponse {
        datasets: page.items,
        next_page_token: page.next_page_token,
    }))
}

pub async fn get_dataset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<types::Dataset>> {
    let dataset = state.repository.get_dataset(&id)?;
    Ok(Json(dataset.to_protocol()))
}
