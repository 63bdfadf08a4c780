use anyhow::Context;
use chrono::{DateTime, Utc};
use csv::Writer;

use crate::errors::AppError;
use crate::models::StoredCandidate;
use crate::shortlist::filter::FilterCriteria;

pub const CSV_HEADER: [&str; 13] = [
    "Name",
    "Email",
    "Phone",
    "ATS Score",
    "CGPA",
    "Academic Percentage",
    "Graduation Year",
    "City",
    "Region",
    "Skills",
    "Education",
    "Experience",
    "Projects",
];

/// Columns of the search-results export.
pub const SEARCH_CSV_HEADER: [&str; 8] = [
    "ID",
    "Name",
    "Phone",
    "ATS Score",
    "CGPA",
    "Academic Percentage",
    "Graduation Year",
    "Uploaded At",
];

pub const SEARCH_EXPORT_FILENAME: &str = "filtered_results.csv";

const NOT_AVAILABLE: &str = "N/A";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// One header row plus one row per candidate, in the given order.
pub fn candidates_to_csv(candidates: &[StoredCandidate]) -> Result<Vec<u8>, AppError> {
    let mut wtr = Writer::from_writer(Vec::new());
    wtr.write_record(CSV_HEADER).context("Failed to write CSV header")?;

    for c in candidates {
        let education = serde_json::to_string(&c.education).context("Failed to encode education")?;
        let experience =
            serde_json::to_string(&c.experience).context("Failed to encode experience")?;
        let projects = serde_json::to_string(&c.projects).context("Failed to encode projects")?;

        wtr.write_record([
            c.name.clone(),
            c.email.clone(),
            c.phone.clone(),
            format!("{}%", c.ats_score),
            or_not_available(c.cgpa.as_deref()),
            c.academic_percentage
                .as_deref()
                .filter(|p| !p.is_empty())
                .map(|p| format!("{p}%"))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            or_not_available(c.graduation_year.as_deref()),
            c.city.clone(),
            c.region.clone(),
            c.skills.joined(),
            education,
            experience,
            projects,
        ])
        .with_context(|| format!("Failed to write CSV row for {}", c.email))?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| e.into_error())
        .context("Failed to flush CSV")?;
    Ok(bytes)
}

/// Search results as stored: raw score, empty cells for missing academics.
pub fn search_results_to_csv(candidates: &[StoredCandidate]) -> Result<Vec<u8>, AppError> {
    let mut wtr = Writer::from_writer(Vec::new());
    wtr.write_record(SEARCH_CSV_HEADER)
        .context("Failed to write CSV header")?;

    for c in candidates {
        wtr.write_record([
            c.id.to_string(),
            c.name.clone(),
            c.phone.clone(),
            c.ats_score.to_string(),
            c.cgpa.clone().unwrap_or_default(),
            c.academic_percentage.clone().unwrap_or_default(),
            c.graduation_year.clone().unwrap_or_default(),
            c.uploaded_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ])
        .with_context(|| format!("Failed to write CSV row for {}", c.id))?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| e.into_error())
        .context("Failed to flush CSV")?;
    Ok(bytes)
}

fn or_not_available(value: Option<&str>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

pub fn shortlist_filename(now: DateTime<Utc>) -> String {
    format!("candidate_shortlist_{}.csv", now.format(TIMESTAMP_FORMAT))
}

pub fn advanced_filename(criteria: &FilterCriteria, now: DateTime<Utc>) -> String {
    format!(
        "advanced_shortlist_{}_{}.csv",
        criteria.file_tag(),
        now.format(TIMESTAMP_FORMAT)
    )
}
