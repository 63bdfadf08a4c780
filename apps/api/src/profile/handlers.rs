use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::extraction::RawDocument;
use crate::profile::advice::{recommend_jobs, JobRecommendation};
use crate::profile::ingest::{ingest_resume, IngestResponse};
use crate::profile::scoring::calculate_ats_score_value;
use crate::state::AppState;

const RESUME_FIELD: &str = "resume";

/// POST /api/v1/resumes
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<IngestResponse>, AppError> {
    let mut document = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        if file_name.trim().is_empty() {
            return Err(AppError::Validation("No selected file".to_string()));
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        info!("Received resume upload '{file_name}' ({} bytes)", bytes.len());
        document = Some(RawDocument::from_file_name(bytes, &file_name));
        break;
    }

    let document = document
        .ok_or_else(|| AppError::Validation(format!("No file part named '{RESUME_FIELD}'")))?;

    let response = ingest_resume(
        document,
        &state.extractor,
        state.oracle.as_ref(),
        state.store.as_ref(),
    )
    .await?;
    Ok(Json(response))
}

#[derive(Deserialize)]
pub struct AtsScoreRequest {
    pub parsed_data: Option<Value>,
}

#[derive(Serialize)]
pub struct AtsScoreResponse {
    pub score: u8,
}

/// POST /api/v1/ats-score
pub async fn handle_ats_score(
    State(state): State<AppState>,
    Json(req): Json<AtsScoreRequest>,
) -> Result<Json<AtsScoreResponse>, AppError> {
    let parsed = req
        .parsed_data
        .filter(|v| !v.is_null())
        .ok_or_else(|| AppError::Validation("No resume data provided".to_string()))?;

    let score = calculate_ats_score_value(&parsed);

    if let Some(email) = parsed.get("email").and_then(Value::as_str) {
        if !email.trim().is_empty() && state.store.update_score(email, score).await? {
            info!("Updated stored ATS score for {email} to {score}");
        }
    }

    Ok(Json(AtsScoreResponse { score }))
}

#[derive(Deserialize)]
pub struct JobRecommendationRequest {
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Serialize)]
pub struct JobRecommendationResponse {
    pub recommendations: Vec<JobRecommendation>,
}

/// POST /api/v1/job-recommendations
pub async fn handle_job_recommendations(
    State(state): State<AppState>,
    Json(req): Json<JobRecommendationRequest>,
) -> Result<Json<JobRecommendationResponse>, AppError> {
    if req.skills.iter().all(|s| s.trim().is_empty()) {
        return Err(AppError::Validation("No skills provided".to_string()));
    }

    let recommendations = recommend_jobs(&req.skills, state.oracle.as_ref()).await;
    if recommendations.is_empty() {
        return Err(AppError::Llm("Could not generate recommendations".to_string()));
    }
    Ok(Json(JobRecommendationResponse { recommendations }))
}
