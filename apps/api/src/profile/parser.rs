//! Structured Field Extractor — résumé text → `CandidateRecord` via the oracle.
//!
//! The oracle's answer is validated against the canonical field set, missing
//! fields are defaulted (never an error), and an empty email is recovered
//! from the résumé text itself.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::{strip_json_fences, Oracle};
use crate::models::CandidateRecord;
use crate::profile::prompts::{RESUME_PARSE_PROMPT, RESUME_PARSE_SYSTEM};

const SCALAR_FIELDS: &[&str] = &["name", "email", "phone"];
const LIST_FIELDS: &[&str] = &["skills", "education", "experience", "projects"];

static EMAIL_IN_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9.-]+").expect("email pattern compiles")
});

/// Parses résumé text into a canonical record. No retry on a bad response.
pub async fn parse_candidate(text: &str, oracle: &dyn Oracle) -> Result<CandidateRecord, AppError> {
    let prompt = RESUME_PARSE_PROMPT.replace("{resume_text}", text);
    let raw = oracle
        .complete(&prompt, RESUME_PARSE_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Resume parsing failed: {e}")))?;

    let record = validate_response(&raw)?;
    Ok(repair_email(record, text))
}

/// Fence-strips and parses the oracle response, defaulting missing fields.
pub fn validate_response(raw: &str) -> Result<CandidateRecord, AppError> {
    let value: Value = serde_json::from_str(strip_json_fences(raw))
        .map_err(|e| AppError::InvalidStructuredResponse(e.to_string()))?;

    let Value::Object(mut fields) = value else {
        return Err(AppError::InvalidStructuredResponse(
            "expected a JSON object at the top level".to_string(),
        ));
    };

    fill_missing(&mut fields)?;

    serde_json::from_value(Value::Object(fields))
        .map_err(|e| AppError::StoreValidation(e.to_string()))
}

fn fill_missing(fields: &mut Map<String, Value>) -> Result<(), AppError> {
    for &field in SCALAR_FIELDS {
        if !fields.contains_key(field) {
            warn!("Field '{field}' missing from oracle response, defaulting to \"\"");
            fields.insert(field.to_string(), Value::String(String::new()));
        }
    }

    for &field in LIST_FIELDS {
        match fields.get(field) {
            None | Some(Value::Null) => {
                warn!("Field '{field}' missing from oracle response, defaulting to []");
                fields.insert(field.to_string(), Value::Array(Vec::new()));
            }
            Some(Value::Array(_)) => {}
            Some(_) => return Err(AppError::StoreValidation(format!("{field} must be a list"))),
        }
    }

    if !matches!(fields.get("location"), Some(Value::Object(_))) {
        fields.insert("location".to_string(), Value::Object(Map::new()));
    }

    Ok(())
}

/// Fills an empty email with the first email-shaped token in the source text.
pub fn repair_email(mut record: CandidateRecord, source_text: &str) -> CandidateRecord {
    if record.email.trim().is_empty() {
        if let Some(found) = EMAIL_IN_TEXT.find(source_text) {
            info!("Recovered email from resume text: {}", found.as_str());
            record.email = found.as_str().to_string();
        }
    }
    record
}
