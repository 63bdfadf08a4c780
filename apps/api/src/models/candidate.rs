use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use tracing::warn;
use uuid::Uuid;

// ────────────────────────────────────────────────────────────────────────────
// Structured résumé record (oracle output after validation/repair)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub degree: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub institution: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub company: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub duration: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub technologies: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub duration: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, deserialize_with = "lenient_string")]
    pub city: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub region: String,
}

/// Canonical candidate profile. The four list fields are always present,
/// possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient_entries")]
    pub education: Vec<EducationEntry>,
    #[serde(default, deserialize_with = "lenient_entries")]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default, deserialize_with = "lenient_entries")]
    pub projects: Vec<ProjectEntry>,
    #[serde(default)]
    pub location: Location,
}

/// Academic figures mined from education text. Derived, never authoritative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicPerformance {
    pub cgpa: Option<String>,
    pub percentage: Option<String>,
    pub graduation_year: Option<String>,
}

/// Oracle output sometimes carries numbers where strings are expected
/// (`"year": 2024`). Accept any scalar, map null to "".
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_string(Value::deserialize(deserializer)?))
}

fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<Value>::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .filter(|v| !v.is_null())
        .map(value_to_string)
        .collect())
}

/// Entries the oracle sometimes flattens to a single line of text.
trait FromBareText {
    fn from_bare_text(text: String) -> Self;
}

impl FromBareText for EducationEntry {
    fn from_bare_text(text: String) -> Self {
        Self {
            degree: text,
            ..Default::default()
        }
    }
}

impl FromBareText for ExperienceEntry {
    fn from_bare_text(text: String) -> Self {
        Self {
            title: text,
            ..Default::default()
        }
    }
}

impl FromBareText for ProjectEntry {
    fn from_bare_text(text: String) -> Self {
        Self {
            title: text,
            ..Default::default()
        }
    }
}

/// Objects become entries, a bare string lands in the entry's leading field,
/// and anything else is dropped with a warning.
fn lenient_entries<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + FromBareText,
{
    let values = Vec::<Value>::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .filter_map(|value| match value {
            Value::Object(_) => match serde_json::from_value(value) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Dropping malformed entry: {e}");
                    None
                }
            },
            Value::String(text) if !text.trim().is_empty() => Some(T::from_bare_text(text)),
            Value::Null | Value::String(_) => None,
            other => {
                warn!("Dropping non-object entry: {other}");
                None
            }
        })
        .collect())
}

fn value_to_string(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Persisted profile
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub skills: String,
    pub education: String,
    pub experience: String,
    pub projects: String,
    pub ats_score: i32,
    pub city: String,
    pub region: String,
    pub cgpa: Option<String>,
    pub academic_percentage: Option<String>,
    pub graduation_year: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// Skills as persisted. Rows written by this service hold a JSON string list;
/// anything else (legacy comma text, hand edits) is kept as raw text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredSkills {
    Structured(Vec<String>),
    Raw(String),
}

impl StoredSkills {
    pub fn from_column(text: &str) -> Self {
        match serde_json::from_str::<Vec<String>>(text) {
            Ok(list) => StoredSkills::Structured(list),
            Err(_) => StoredSkills::Raw(text.to_string()),
        }
    }

    /// The text a substring search runs against: the JSON column for
    /// structured skills, the raw text otherwise.
    pub fn search_text(&self) -> String {
        match self {
            StoredSkills::Structured(list) => serde_json::to_string(list).unwrap_or_default(),
            StoredSkills::Raw(text) => text.clone(),
        }
    }

    /// Skills rendered for a single CSV cell.
    pub fn joined(&self) -> String {
        match self {
            StoredSkills::Structured(list) => list.join(", "),
            StoredSkills::Raw(text) => text.clone(),
        }
    }
}

/// A profile as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCandidate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub skills: StoredSkills,
    pub education: Vec<EducationEntry>,
    pub experience: Vec<ExperienceEntry>,
    pub projects: Vec<ProjectEntry>,
    pub ats_score: i32,
    pub cgpa: Option<String>,
    pub academic_percentage: Option<String>,
    pub graduation_year: Option<String>,
    pub city: String,
    pub region: String,
    pub uploaded_at: DateTime<Utc>,
}

impl StoredCandidate {
    /// Builds the stored view of a freshly ingested record: email trimmed,
    /// blank location parts become "Unknown".
    pub fn from_record(
        id: Uuid,
        record: &CandidateRecord,
        ats_score: u8,
        academic: &AcademicPerformance,
        uploaded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: record.name.clone(),
            email: record.email.trim().to_string(),
            phone: record.phone.clone(),
            skills: StoredSkills::Structured(record.skills.clone()),
            education: record.education.clone(),
            experience: record.experience.clone(),
            projects: record.projects.clone(),
            ats_score: i32::from(ats_score),
            cgpa: academic.cgpa.clone(),
            academic_percentage: academic.percentage.clone(),
            graduation_year: academic.graduation_year.clone(),
            city: location_or_unknown(&record.location.city),
            region: location_or_unknown(&record.location.region),
            uploaded_at,
        }
    }
}

fn location_or_unknown(value: &str) -> String {
    if value.trim().is_empty() {
        "Unknown".to_string()
    } else {
        value.to_string()
    }
}

impl From<CandidateRow> for StoredCandidate {
    fn from(row: CandidateRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            skills: StoredSkills::from_column(&row.skills),
            education: serde_json::from_str(&row.education).unwrap_or_default(),
            experience: serde_json::from_str(&row.experience).unwrap_or_default(),
            projects: serde_json::from_str(&row.projects).unwrap_or_default(),
            ats_score: row.ats_score,
            cgpa: row.cgpa,
            academic_percentage: row.academic_percentage,
            graduation_year: row.graduation_year,
            city: row.city,
            region: row.region,
            uploaded_at: row.uploaded_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_default_to_empty() {
        let record: CandidateRecord = serde_json::from_value(json!({"name": "Ada"})).unwrap();
        assert_eq!(record.name, "Ada");
        assert_eq!(record.email, "");
        assert!(record.skills.is_empty());
        assert!(record.education.is_empty());
        assert!(record.experience.is_empty());
        assert!(record.projects.is_empty());
        assert_eq!(record.location, Location::default());
    }

    #[test]
    fn test_numeric_year_becomes_string() {
        let entry: EducationEntry =
            serde_json::from_value(json!({"degree": "BSc", "year": 2021})).unwrap();
        assert_eq!(entry.year, "2021");
        assert_eq!(entry.institution, "");
    }

    #[test]
    fn test_string_entries_fill_leading_field() {
        let record: CandidateRecord = serde_json::from_value(json!({
            "education": ["B.Tech CGPA 8.5, IIT, 2020", {"degree": "M.Tech", "year": 2022}],
            "experience": ["Intern at Acme", 42, null],
            "projects": ["", {"title": "Shortlister", "technologies": "Rust"}, "Parser"]
        }))
        .unwrap();

        assert_eq!(record.education.len(), 2);
        assert_eq!(record.education[0].degree, "B.Tech CGPA 8.5, IIT, 2020");
        assert_eq!(record.education[0].year, "");
        assert_eq!(record.education[1].year, "2022");
        assert_eq!(
            record.experience,
            vec![ExperienceEntry {
                title: "Intern at Acme".to_string(),
                ..Default::default()
            }]
        );
        assert_eq!(record.projects.len(), 1);
        assert_eq!(record.projects[0].title, "Parser");
    }

    #[test]
    fn test_null_scalars_become_empty() {
        let record: CandidateRecord =
            serde_json::from_value(json!({"name": null, "skills": ["Rust", null, 5]})).unwrap();
        assert_eq!(record.name, "");
        assert_eq!(record.skills, vec!["Rust".to_string(), "5".to_string()]);
    }

    #[test]
    fn test_stored_skills_structured_column() {
        let skills = StoredSkills::from_column(r#"["Rust","SQL"]"#);
        assert_eq!(
            skills,
            StoredSkills::Structured(vec!["Rust".to_string(), "SQL".to_string()])
        );
        assert_eq!(skills.joined(), "Rust, SQL");
    }

    #[test]
    fn test_stored_skills_raw_column() {
        let skills = StoredSkills::from_column("Rust, SQL");
        assert_eq!(skills, StoredSkills::Raw("Rust, SQL".to_string()));
        assert_eq!(skills.search_text(), "Rust, SQL");
    }

    #[test]
    fn test_blank_location_stored_as_unknown() {
        assert_eq!(location_or_unknown("  "), "Unknown");
        assert_eq!(location_or_unknown("Pune"), "Pune");
    }
}
