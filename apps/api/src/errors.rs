use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::ExtractionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    UnsupportedFormat(String),

    /// Carries the extractor's reason verbatim.
    #[error("{0}")]
    Extraction(String),

    #[error("Invalid structured response: {0}")]
    InvalidStructuredResponse(String),

    #[error("Store validation failed: {0}")]
    StoreValidation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::UnsupportedFormat(_) | ExtractionError::LegacyDoc => {
                AppError::UnsupportedFormat(err.to_string())
            }
            other => AppError::Extraction(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::UnsupportedFormat(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_FORMAT",
                msg.clone(),
            ),
            AppError::Extraction(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_FAILED",
                format!("Unable to parse resume. {msg}"),
            ),
            AppError::InvalidStructuredResponse(msg) => {
                tracing::warn!("Oracle returned an unusable response: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "INVALID_STRUCTURED_RESPONSE",
                    "The resume parser returned invalid JSON.".to_string(),
                )
            }
            AppError::StoreValidation(msg) => (
                StatusCode::BAD_REQUEST,
                "STORE_VALIDATION_ERROR",
                format!("Failed to store resume data: {msg}"),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::DocumentKind;

    #[test]
    fn test_extraction_reason_is_preserved_verbatim() {
        let err: AppError = ExtractionError::NoTextAfterOcr(DocumentKind::Pdf).into();
        assert_eq!(err.to_string(), "PDF OCR produced no text");
        assert!(matches!(err, AppError::Extraction(_)));
    }

    #[test]
    fn test_unsupported_format_maps_to_its_own_variant() {
        let err: AppError = ExtractionError::UnsupportedFormat("txt".to_string()).into();
        assert!(matches!(err, AppError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_status_codes() {
        let resp = AppError::UnsupportedFormat("x".into()).into_response();
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let resp = AppError::StoreValidation("x".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let resp = AppError::InvalidStructuredResponse("x".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }
}
