//! Shortlist Filter Engine — multi-criteria selection over stored profiles.
//!
//! Criteria are ANDed. Two evaluation modes exist because the historical
//! behaviour stops early: in `Narrowing` mode the cgpa, percentage and skills
//! stages report which criterion emptied the pool, and exports turn that into
//! a "no match" error instead of an empty file.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{StoredCandidate, StoredSkills};
use crate::profile::scoring::SHORTLIST_THRESHOLD;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    #[default]
    Narrowing,
    Conjunctive,
}

#[derive(Debug, Error)]
#[error("unknown filter mode '{0}'")]
pub struct UnknownFilterMode(String);

impl FromStr for FilterMode {
    type Err = UnknownFilterMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "narrowing" => Ok(FilterMode::Narrowing),
            "conjunctive" => Ok(FilterMode::Conjunctive),
            other => Err(UnknownFilterMode(other.to_string())),
        }
    }
}

/// The stage that left no candidates in narrowing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Cgpa,
    Percentage,
    Skills,
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Criterion::Cgpa => "cgpa",
            Criterion::Percentage => "percentage",
            Criterion::Skills => "skills",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    Matched(Vec<StoredCandidate>),
    NoMatch { criterion: Criterion },
}

impl FilterOutcome {
    /// Candidates regardless of how an empty result was reached.
    pub fn into_candidates(self) -> Vec<StoredCandidate> {
        match self {
            FilterOutcome::Matched(candidates) => candidates,
            FilterOutcome::NoMatch { .. } => Vec::new(),
        }
    }
}

/// Parsed filter criteria; `None` / empty means no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub min_ats: Option<f64>,
    pub min_cgpa: Option<f64>,
    pub min_percentage: Option<f64>,
    pub min_graduation_year: Option<String>,
    /// Trimmed, lowercased, non-empty tokens.
    pub skills: Vec<String>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.min_ats.is_none()
            && self.min_cgpa.is_none()
            && self.min_percentage.is_none()
            && self.min_graduation_year.is_none()
            && self.skills.is_empty()
    }

    /// `ATS60_CGPA8_PCT75_YEAR2022_SKILLS`, omitting absent criteria.
    pub fn file_tag(&self) -> String {
        let mut parts = Vec::new();
        if let Some(v) = self.min_ats {
            parts.push(format!("ATS{v}"));
        }
        if let Some(v) = self.min_cgpa {
            parts.push(format!("CGPA{v}"));
        }
        if let Some(v) = self.min_percentage {
            parts.push(format!("PCT{v}"));
        }
        if let Some(v) = &self.min_graduation_year {
            parts.push(format!("YEAR{v}"));
        }
        if !self.skills.is_empty() {
            parts.push("SKILLS".to_string());
        }
        parts.join("_")
    }
}

/// Splits a comma-separated skills filter into lowercase tokens.
pub fn skill_tokens(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Raw filter input as it arrives from a form, query string or JSON body.
/// Numbers are accepted as JSON numbers or strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterForm {
    #[serde(default, deserialize_with = "loose_text")]
    pub min_ats_score: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub min_cgpa: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub min_percentage: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub min_graduation_year: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub skills_filter: Option<String>,
}

fn loose_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Text(String),
        Number(f64),
    }

    Ok(Option::<Loose>::deserialize(deserializer)?.map(|v| match v {
        Loose::Text(s) => s,
        Loose::Number(n) => n.to_string(),
    }))
}

impl FilterForm {
    /// Blank fields are absent. A numeric field that does not parse is
    /// ignored with a warning rather than rejecting the whole request.
    pub fn into_criteria(self) -> FilterCriteria {
        FilterCriteria {
            min_ats: numeric("min_ats_score", self.min_ats_score.as_deref()),
            min_cgpa: numeric("min_cgpa", self.min_cgpa.as_deref()),
            min_percentage: numeric("min_percentage", self.min_percentage.as_deref()),
            min_graduation_year: non_blank(self.min_graduation_year.as_deref()),
            skills: self.skills_filter.as_deref().map(skill_tokens).unwrap_or_default(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn numeric(field: &str, value: Option<&str>) -> Option<f64> {
    let value = non_blank(value)?;
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() => Some(n),
        _ => {
            warn!("Ignoring non-numeric {field} filter value '{value}'");
            None
        }
    }
}

/// Stored academic value as a number; blank or unparseable → `None`.
fn stored_number(value: Option<&str>) -> Option<f64> {
    value.map(str::trim).filter(|v| !v.is_empty())?.parse().ok()
}

fn meets_ats(candidate: &StoredCandidate, min: f64) -> bool {
    f64::from(candidate.ats_score) >= min
}

fn meets_cgpa(candidate: &StoredCandidate, min: f64) -> bool {
    stored_number(candidate.cgpa.as_deref()).is_some_and(|v| v >= min)
}

fn meets_percentage(candidate: &StoredCandidate, min: f64) -> bool {
    stored_number(candidate.academic_percentage.as_deref()).is_some_and(|v| v >= min)
}

fn meets_year(candidate: &StoredCandidate, min: &str) -> bool {
    candidate
        .graduation_year
        .as_deref()
        .is_some_and(|year| year >= min)
}

/// ANY requested skill: equal to a structured skill (case-insensitive) or a
/// substring of raw skills text.
fn has_any_skill(candidate: &StoredCandidate, wanted: &[String]) -> bool {
    match &candidate.skills {
        StoredSkills::Structured(list) => {
            let owned: Vec<String> = list.iter().map(|s| s.to_lowercase()).collect();
            wanted.iter().any(|w| owned.contains(w))
        }
        StoredSkills::Raw(text) => {
            let text = text.to_lowercase();
            wanted.iter().any(|w| text.contains(w.as_str()))
        }
    }
}

fn matches_all(candidate: &StoredCandidate, criteria: &FilterCriteria) -> bool {
    criteria.min_ats.map_or(true, |min| meets_ats(candidate, min))
        && criteria.min_cgpa.map_or(true, |min| meets_cgpa(candidate, min))
        && criteria
            .min_percentage
            .map_or(true, |min| meets_percentage(candidate, min))
        && criteria
            .min_graduation_year
            .as_deref()
            .map_or(true, |min| meets_year(candidate, min))
        && (criteria.skills.is_empty() || has_any_skill(candidate, &criteria.skills))
}

/// Selects candidates from `pool`, preserving its order.
pub fn filter_candidates(
    pool: Vec<StoredCandidate>,
    criteria: &FilterCriteria,
    mode: FilterMode,
) -> FilterOutcome {
    match mode {
        FilterMode::Conjunctive => FilterOutcome::Matched(
            pool.into_iter()
                .filter(|c| matches_all(c, criteria))
                .collect(),
        ),
        FilterMode::Narrowing => narrow(pool, criteria),
    }
}

fn narrow(mut pool: Vec<StoredCandidate>, criteria: &FilterCriteria) -> FilterOutcome {
    if let Some(min) = criteria.min_ats {
        pool.retain(|c| meets_ats(c, min));
    }

    if let Some(min) = criteria.min_cgpa {
        pool.retain(|c| meets_cgpa(c, min));
        if pool.is_empty() {
            debug!("No candidates left after cgpa >= {min}");
            return FilterOutcome::NoMatch {
                criterion: Criterion::Cgpa,
            };
        }
    }

    if let Some(min) = criteria.min_percentage {
        pool.retain(|c| meets_percentage(c, min));
        if pool.is_empty() {
            debug!("No candidates left after percentage >= {min}");
            return FilterOutcome::NoMatch {
                criterion: Criterion::Percentage,
            };
        }
    }

    if let Some(min) = criteria.min_graduation_year.as_deref() {
        pool.retain(|c| meets_year(c, min));
    }

    if !criteria.skills.is_empty() {
        pool.retain(|c| has_any_skill(c, &criteria.skills));
        if pool.is_empty() {
            debug!("No candidates left after skills filter");
            return FilterOutcome::NoMatch {
                criterion: Criterion::Skills,
            };
        }
    }

    FilterOutcome::Matched(pool)
}

/// Candidates at or above the default ATS threshold.
pub fn default_shortlist(pool: Vec<StoredCandidate>) -> Vec<StoredCandidate> {
    pool.into_iter()
        .filter(|c| c.ats_score >= SHORTLIST_THRESHOLD)
        .collect()
}
