pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::profile::handlers as profile;
use crate::shortlist::handlers as shortlist;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Ingestion and per-profile scoring
        .route("/api/v1/resumes", post(profile::handle_upload_resume))
        .route("/api/v1/ats-score", post(profile::handle_ats_score))
        .route(
            "/api/v1/job-recommendations",
            post(profile::handle_job_recommendations),
        )
        // Shortlisting over the stored pool
        .route("/api/v1/shortlist", get(shortlist::handle_shortlist))
        .route(
            "/api/v1/shortlist/export",
            get(shortlist::handle_shortlist_export),
        )
        .route(
            "/api/v1/shortlist/advanced",
            post(shortlist::handle_advanced_shortlist),
        )
        .route(
            "/api/v1/shortlist/advanced/export",
            get(shortlist::handle_advanced_export),
        )
        .route("/api/v1/candidates/search", get(shortlist::handle_search))
        .route(
            "/api/v1/candidates/search/export",
            get(shortlist::handle_search_export),
        )
        .route(
            "/api/v1/candidates/:id",
            delete(shortlist::handle_delete_candidate),
        )
        .route("/api/v1/statistics", get(shortlist::handle_statistics))
        .with_state(state)
}
