use serde::Deserialize;

use crate::errors::AppError;
use crate::models::StoredCandidate;

/// Query parameters for candidate search. Every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub ats_score: Option<String>,
    pub skills: Option<String>,
}

/// Name/phone substring, minimum score and every listed skill present in the
/// stored skills text, all case-insensitive.
pub fn search_candidates(
    pool: Vec<StoredCandidate>,
    query: &SearchQuery,
) -> Result<Vec<StoredCandidate>, AppError> {
    let name = lowered(query.name.as_deref());
    let phone = lowered(query.phone.as_deref());
    let min_ats = match query.ats_score.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Some(v.parse::<i32>().map_err(|_| {
            AppError::Validation(format!("ats_score must be an integer, got '{v}'"))
        })?),
        _ => None,
    };
    let skills: Vec<String> = query
        .skills
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    Ok(pool
        .into_iter()
        .filter(|c| name.as_ref().map_or(true, |n| c.name.to_lowercase().contains(n)))
        .filter(|c| phone.as_ref().map_or(true, |p| c.phone.to_lowercase().contains(p)))
        .filter(|c| min_ats.map_or(true, |min| c.ats_score >= min))
        .filter(|c| {
            let text = c.skills.search_text().to_lowercase();
            skills.iter().all(|s| text.contains(s.as_str()))
        })
        .collect())
}

fn lowered(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}
