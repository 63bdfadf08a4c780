//! Oracle-backed advice: résumé improvement tips and job recommendations.
//!
//! Both are best-effort enrichments. Bad oracle output is logged and degrades
//! to an empty list rather than failing the request.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{strip_json_fences, Oracle};
use crate::models::CandidateRecord;
use crate::profile::prompts::{IMPROVEMENTS_PROMPT, JOB_RECOMMENDATIONS_PROMPT};

const ADVICE_COUNT: usize = 5;

const DEFAULT_IMPROVEMENTS: [&str; ADVICE_COUNT] = [
    "Add more measurable achievements to your work experience",
    "Include specific versions of technical skills",
    "Add more details to your project descriptions",
    "Incorporate relevant industry keywords",
    "Quantify your achievements with metrics",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecommendation {
    pub title: String,
    pub match_percentage: f64,
    pub matching_skills: Vec<String>,
    pub recommended_skills: Vec<String>,
    pub description: String,
}

/// Exactly five improvement tips, or none when the oracle fails.
pub async fn suggest_improvements(record: &CandidateRecord, oracle: &dyn Oracle) -> Vec<String> {
    let prompt = IMPROVEMENTS_PROMPT
        .replace("{name}", &record.name)
        .replace("{skills}", &record.skills.join(", "))
        .replace("{education}", &to_json(&record.education))
        .replace("{experience}", &to_json(&record.experience))
        .replace("{projects}", &to_json(&record.projects));

    match oracle.complete(&prompt, JSON_ONLY_SYSTEM).await {
        Ok(raw) => normalize_improvements(&raw),
        Err(e) => {
            warn!("Improvement suggestions unavailable: {e}");
            Vec::new()
        }
    }
}

/// Truncates to five, pads from the defaults when shorter. Non-list or
/// unparseable output yields an empty list.
pub fn normalize_improvements(raw: &str) -> Vec<String> {
    let items = match serde_json::from_str::<Value>(strip_json_fences(raw)) {
        Ok(Value::Array(items)) => items,
        Ok(_) => {
            warn!("Improvements response is not a list");
            return Vec::new();
        }
        Err(e) => {
            warn!("Improvements response is not valid JSON: {e}");
            return Vec::new();
        }
    };

    let mut improvements: Vec<String> = items
        .into_iter()
        .take(ADVICE_COUNT)
        .map(|item| match item {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect();

    let have = improvements.len();
    improvements.extend(DEFAULT_IMPROVEMENTS[have..].iter().map(|s| s.to_string()));
    improvements
}

/// Up to five job recommendations for a skill list.
pub async fn recommend_jobs(skills: &[String], oracle: &dyn Oracle) -> Vec<JobRecommendation> {
    let prompt = JOB_RECOMMENDATIONS_PROMPT.replace("{skills}", &skills.join(", "));

    match oracle.complete(&prompt, JSON_ONLY_SYSTEM).await {
        Ok(raw) => normalize_recommendations(&raw),
        Err(e) => {
            warn!("Job recommendations unavailable: {e}");
            Vec::new()
        }
    }
}

/// Drops entries missing a required field, clamps the match percentage to
/// [0, 100] (non-numeric → 0), wraps scalar skill fields into lists and keeps
/// at most five.
pub fn normalize_recommendations(raw: &str) -> Vec<JobRecommendation> {
    let items = match serde_json::from_str::<Value>(strip_json_fences(raw)) {
        Ok(Value::Array(items)) => items,
        Ok(_) => {
            warn!("Job recommendations response is not a list");
            return Vec::new();
        }
        Err(e) => {
            warn!("Job recommendations response is not valid JSON: {e}");
            return Vec::new();
        }
    };

    items
        .iter()
        .filter_map(recommendation_from_value)
        .take(ADVICE_COUNT)
        .collect()
}

fn recommendation_from_value(item: &Value) -> Option<JobRecommendation> {
    let fields = item.as_object()?;
    let required = [
        "title",
        "match_percentage",
        "matching_skills",
        "recommended_skills",
        "description",
    ];
    if !required.iter().all(|key| fields.contains_key(*key)) {
        return None;
    }

    let match_percentage = match &fields["match_percentage"] {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().trim_end_matches('%').parse().unwrap_or(0.0),
        _ => 0.0,
    }
    .clamp(0.0, 100.0);

    Some(JobRecommendation {
        title: scalar(&fields["title"]),
        match_percentage,
        matching_skills: string_list(&fields["matching_skills"]),
        recommended_skills: string_list(&fields["recommended_skills"]),
        description: scalar(&fields["description"]),
    })
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(scalar).collect(),
        other => vec![scalar(other)],
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::CannedOracle;

    #[test]
    fn test_improvements_truncated_to_five() {
        let raw = r#"["a", "b", "c", "d", "e", "f", "g"]"#;
        assert_eq!(normalize_improvements(raw), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_improvements_padded_from_defaults() {
        let out = normalize_improvements("```json\n[\"Tighten the summary\", \"Add links\"]\n```");
        assert_eq!(out.len(), 5);
        assert_eq!(out[0], "Tighten the summary");
        assert_eq!(out[1], "Add links");
        assert_eq!(out[2], DEFAULT_IMPROVEMENTS[2]);
        assert_eq!(out[4], DEFAULT_IMPROVEMENTS[4]);
    }

    #[test]
    fn test_improvements_reject_non_list() {
        assert!(normalize_improvements(r#"{"tips": []}"#).is_empty());
        assert!(normalize_improvements("no json here").is_empty());
    }

    #[tokio::test]
    async fn test_improvements_empty_when_oracle_fails() {
        let oracle = CannedOracle::failing("down");
        assert!(suggest_improvements(&CandidateRecord::default(), &oracle)
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn test_improvements_prompt_carries_skills() {
        let oracle = CannedOracle::new(&["[]"]);
        let record = CandidateRecord {
            skills: vec!["Rust".to_string(), "Tokio".to_string()],
            ..Default::default()
        };
        let out = suggest_improvements(&record, &oracle).await;
        assert_eq!(out.len(), 5);
        assert!(oracle.prompts.lock().unwrap()[0].contains("Rust, Tokio"));
    }

    #[test]
    fn test_recommendations_are_normalized() {
        let raw = r#"[
            {"title": "Backend Engineer", "match_percentage": 140, "matching_skills": ["Rust"],
             "recommended_skills": "Kafka", "description": "APIs"},
            {"title": "Data Engineer", "match_percentage": "72%", "matching_skills": [],
             "recommended_skills": [], "description": "Pipelines"},
            {"title": "Missing fields"},
            {"title": "ML Engineer", "match_percentage": "high", "matching_skills": ["Python"],
             "recommended_skills": ["PyTorch"], "description": "Models"}
        ]"#;
        let recs = normalize_recommendations(raw);

        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].match_percentage, 100.0);
        assert_eq!(recs[0].recommended_skills, vec!["Kafka"]);
        assert_eq!(recs[1].match_percentage, 72.0);
        assert_eq!(recs[2].title, "ML Engineer");
        assert_eq!(recs[2].match_percentage, 0.0);
    }

    #[test]
    fn test_recommendations_capped_at_five() {
        let one = r#"{"title": "T", "match_percentage": 50, "matching_skills": [], "recommended_skills": [], "description": "D"}"#;
        let raw = format!("[{}]", vec![one; 7].join(","));
        assert_eq!(normalize_recommendations(&raw).len(), 5);
    }

    #[tokio::test]
    async fn test_recommendations_empty_on_bad_output() {
        let oracle = CannedOracle::new(&["{\"not\": \"a list\"}"]);
        assert!(recommend_jobs(&["Rust".to_string()], &oracle).await.is_empty());
    }
}
