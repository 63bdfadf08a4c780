use std::sync::Arc;

use crate::extraction::DocumentExtractor;
use crate::llm_client::Oracle;
use crate::shortlist::FilterMode;
use crate::store::ProfileStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProfileStore>,
    /// Model behind parsing, improvement tips and job recommendations.
    pub oracle: Arc<dyn Oracle>,
    pub extractor: DocumentExtractor,
    pub filter_mode: FilterMode,
}
