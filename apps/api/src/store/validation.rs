use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::AppError;
use crate::models::CandidateRecord;

static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email shape compiles"));

/// Checks a record before it is written. The email is the identity key, so an
/// empty or malformed one is rejected instead of colliding on "".
pub fn validate_for_store(record: &CandidateRecord) -> Result<(), AppError> {
    let email = record.email.trim();
    if email.is_empty() {
        return Err(AppError::StoreValidation("Valid email is required".to_string()));
    }
    if !EMAIL_SHAPE.is_match(email) {
        return Err(AppError::StoreValidation(format!(
            "Invalid email format: {email}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_email(email: &str) -> CandidateRecord {
        CandidateRecord {
            email: email.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_accepts_plain_email() {
        assert!(validate_for_store(&with_email("jane@example.com")).is_ok());
        assert!(validate_for_store(&with_email("  a.b+c@mail.example.org ")).is_ok());
    }

    #[test]
    fn test_rejects_empty_email() {
        let err = validate_for_store(&with_email("   ")).unwrap_err();
        assert!(matches!(err, AppError::StoreValidation(msg) if msg.contains("required")));
    }

    #[test]
    fn test_rejects_malformed_email() {
        for bad in ["jane", "jane@", "jane@example", "a@b@c.com", "jane doe@example.com"] {
            assert!(
                matches!(validate_for_store(&with_email(bad)), Err(AppError::StoreValidation(_))),
                "{bad} should be rejected"
            );
        }
    }
}
