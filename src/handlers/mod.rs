mod datasets;
mod features;
mod reads;
mod references;
mod service_info;
mod variants;

pub use datasets::{get_dataset, search_datasets};
pub use features::{get_feature, get_feature_set, search_feature_sets, search_features};
pub use reads::{get_read_group, get_read_group_set, search_read_group_sets, search_reads};
pub use references::{
    get_reference, get_reference_set, list_reference_bases, search_reference_sets,
    search_references,
};
pub use service_info::service_info;
pub use variants::{
    get_call_set, get_variant, get_variant_annotation_set, get_variant_set, search_call_sets,
    search_variant_annotation_sets, search_variant_annotations, search_variant_sets,
    search_variants,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tower_http::trace::TraceLayer;

use crate::datamodel::DataRepository;
use crate::paging::{CandidateSource, Page, SearchPaginator, SearchScope, SequenceRangePager};
use crate::{Error, Result};

/// Response-size settings, read once at the start of each request.
#[derive(Debug)]
pub struct ResponseLimits {
    max_response_length: AtomicUsize,
    default_page_size: usize,
}

impl ResponseLimits {
    pub fn new(max_response_length: usize, default_page_size: usize) -> Self {
        Self {
            max_response_length: AtomicUsize::new(max_response_length),
            default_page_size,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<DataRepository>,
    pub limits: Arc<ResponseLimits>,
}

impl AppState {
    pub fn new(repository: DataRepository, max_response_length: usize, default_page_size: usize) -> Self {
        Self {
            repository: Arc::new(repository),
            limits: Arc::new(ResponseLimits::new(max_response_length, default_page_size)),
        }
    }

    pub fn max_response_length(&self) -> usize {
        self.limits.max_response_length.load(Ordering::Relaxed)
    }

    /// Changes the response budget for requests that start afterwards.
    pub fn set_max_response_length(&self, length: usize) {
        self.limits.max_response_length.store(length, Ordering::Relaxed);
    }

    pub fn paginator(&self) -> SearchPaginator {
        SearchPaginator::new(self.max_response_length())
    }

    pub fn range_pager(&self) -> SequenceRangePager {
        SequenceRangePager::new(self.max_response_length())
    }

    fn page_size(&self, requested: Option<i64>) -> Result<usize> {
        match requested {
            None => Ok(self.limits.default_page_size),
            Some(size) if size > 0 => Ok(usize::try_from(size).unwrap_or(usize::MAX)),
            Some(size) => Err(Error::InvalidRequest(format!(
                "page_size must be positive, got {size}"
            ))),
        }
    }

    /// Validates the page size and runs one page of a search.
    pub fn paginate<S: CandidateSource>(
        &self,
        source: S,
        page_size: Option<i64>,
        page_token: &str,
        scope: &SearchScope,
    ) -> Result<Page<S::Item>> {
        let page_size = self.page_size(page_size)?;
        self.paginator().paginate(source, page_size, page_token, scope)
    }
}

/// Checks a genomic search window and returns it as unsigned bounds.
pub(crate) fn search_window(start: i64, end: i64) -> Result<(u64, u64)> {
    match (u64::try_from(start), u64::try_from(end)) {
        (Ok(s), Ok(e)) if s <= e => Ok((s, e)),
        _ => Err(Error::Inconsistent(format!(
            "invalid search window [{start}, {end}): start must be non-negative and not exceed end"
        ))),
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/datasets/search", post(search_datasets))
        .route("/datasets/:id", get(get_dataset))
        .route("/referencesets/search", post(search_reference_sets))
        .route("/referencesets/:id", get(get_reference_set))
        .route("/references/search", post(search_references))
        .route("/references/:id", get(get_reference))
        .route("/references/:id/bases", get(list_reference_bases))
        .route("/variantsets/search", post(search_variant_sets))
        .route("/variantsets/:id", get(get_variant_set))
        .route("/callsets/search", post(search_call_sets))
        .route("/callsets/:id", get(get_call_set))
        .route("/variants/search", post(search_variants))
        .route("/variants/:id", get(get_variant))
        .route("/variantannotationsets/search", post(search_variant_annotation_sets))
        .route("/variantannotationsets/:id", get(get_variant_annotation_set))
        .route("/variantannotations/search", post(search_variant_annotations))
        .route("/readgroupsets/search", post(search_read_group_sets))
        .route("/readgroupsets/:id", get(get_read_group_set))
        .route("/readgroups/:id", get(get_read_group))
        .route("/reads/search", post(search_reads))
        .route("/featuresets/search", post(search_feature_sets))
        .route("/featuresets/:id", get(get_feature_set))
        .route("/features/search", post(search_features))
        .route("/features/:id", get(get_feature))
        .route("/", get(service_info))
        .route("/service-info", get(service_info))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
