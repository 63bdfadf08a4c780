use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::StoredCandidate;
use crate::shortlist::export::{
    advanced_filename, candidates_to_csv, search_results_to_csv, shortlist_filename,
    SEARCH_EXPORT_FILENAME,
};
use crate::shortlist::filter::{
    default_shortlist, filter_candidates, FilterForm, FilterMode, FilterOutcome,
};
use crate::shortlist::search::{search_candidates, SearchQuery};
use crate::shortlist::stats::{compute_statistics, ProfileStatistics};
use crate::state::AppState;

#[derive(Serialize)]
pub struct CandidateListResponse {
    pub candidates: Vec<StoredCandidate>,
    pub count: usize,
}

impl From<Vec<StoredCandidate>> for CandidateListResponse {
    fn from(candidates: Vec<StoredCandidate>) -> Self {
        Self {
            count: candidates.len(),
            candidates,
        }
    }
}

#[derive(Serialize)]
pub struct AdvancedShortlistResponse {
    pub candidates: Vec<StoredCandidate>,
    pub count: usize,
    pub mode: FilterMode,
    /// Set when narrowing stopped at a criterion that matched nobody.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_match: Option<String>,
}

fn csv_attachment(bytes: Vec<u8>, filename: &str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// GET /api/v1/shortlist
pub async fn handle_shortlist(
    State(state): State<AppState>,
) -> Result<Json<CandidateListResponse>, AppError> {
    let pool = state.store.list().await?;
    Ok(Json(default_shortlist(pool).into()))
}

/// GET /api/v1/shortlist/export
pub async fn handle_shortlist_export(State(state): State<AppState>) -> Result<Response, AppError> {
    let shortlisted = default_shortlist(state.store.list().await?);
    let bytes = candidates_to_csv(&shortlisted)?;
    Ok(csv_attachment(bytes, &shortlist_filename(Utc::now())))
}

/// POST /api/v1/shortlist/advanced
pub async fn handle_advanced_shortlist(
    State(state): State<AppState>,
    Json(form): Json<FilterForm>,
) -> Result<Json<AdvancedShortlistResponse>, AppError> {
    let criteria = form.into_criteria();
    let pool = state.store.list().await?;

    let outcome = filter_candidates(pool, &criteria, state.filter_mode);
    let no_match = match &outcome {
        FilterOutcome::NoMatch { criterion } => Some(criterion.to_string()),
        FilterOutcome::Matched(_) => None,
    };
    let candidates = outcome.into_candidates();

    let response = AdvancedShortlistResponse {
        count: candidates.len(),
        candidates,
        mode: state.filter_mode,
        no_match,
    };
    Ok(Json(response))
}

/// GET /api/v1/shortlist/advanced/export
pub async fn handle_advanced_export(
    State(state): State<AppState>,
    Query(form): Query<FilterForm>,
) -> Result<Response, AppError> {
    let criteria = form.into_criteria();
    if criteria.is_empty() {
        info!("Advanced export requested without filters, exporting every profile");
    }

    let pool = state.store.list().await?;
    let candidates = match filter_candidates(pool, &criteria, state.filter_mode) {
        FilterOutcome::Matched(candidates) => candidates,
        FilterOutcome::NoMatch { criterion } => {
            info!("Advanced export stopped at {criterion} filter");
            return Err(AppError::NotFound(
                "No candidates match the criteria".to_string(),
            ));
        }
    };

    let bytes = candidates_to_csv(&candidates)?;
    Ok(csv_attachment(bytes, &advanced_filename(&criteria, Utc::now())))
}

/// GET /api/v1/candidates/search
pub async fn handle_search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<CandidateListResponse>, AppError> {
    let pool = state.store.list().await?;
    Ok(Json(search_candidates(pool, &query)?.into()))
}

/// GET /api/v1/candidates/search/export
pub async fn handle_search_export(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, AppError> {
    let pool = state.store.list().await?;
    let results = search_candidates(pool, &query)?;
    if results.is_empty() {
        return Err(AppError::Validation(
            "No data available for export.".to_string(),
        ));
    }

    info!("Exporting {} search results", results.len());
    let bytes = search_results_to_csv(&results)?;
    Ok(csv_attachment(bytes, SEARCH_EXPORT_FILENAME))
}

/// DELETE /api/v1/candidates/:id
pub async fn handle_delete_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete(id).await? {
        return Err(AppError::NotFound(format!("Candidate {id} not found")));
    }
    info!("Deleted candidate {id}");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/statistics
pub async fn handle_statistics(
    State(state): State<AppState>,
) -> Result<Json<ProfileStatistics>, AppError> {
    let pool = state.store.list().await?;
    Ok(Json(compute_statistics(&pool)))
}
