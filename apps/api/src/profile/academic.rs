//! Academic Performance Parser — mines CGPA, percentage and graduation year
//! out of free-form education entries.
//!
//! Each field is driven by an ordered rule list evaluated short-circuit. The
//! first rule to match, scanning entries in order, sets the field and nothing
//! later can override it. A bare number followed by "%" next to a CGPA label
//! can satisfy both lists; that ambiguity is accepted.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::models::{AcademicPerformance, EducationEntry};

/// A named pattern. The value is capture group 1 when present, else the
/// whole match.
struct Rule {
    name: &'static str,
    pattern: Regex,
}

impl Rule {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("academic rule pattern compiles"),
        }
    }

    fn capture(&self, text: &str) -> Option<String> {
        let caps = self.pattern.captures(text)?;
        caps.get(1)
            .or_else(|| caps.get(0))
            .map(|m| m.as_str().to_string())
    }
}

const NUMBER: &str = r"([0-9]+\.?[0-9]*)";

static CGPA_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new("cgpa_label", &format!(r"cgpa[:\s]*{NUMBER}")),
        Rule::new("gpa_label", &format!(r"gpa[:\s]*{NUMBER}")),
        Rule::new("number_cgpa", &format!(r"{NUMBER}\s*cgpa")),
        Rule::new("number_gpa", &format!(r"{NUMBER}\s*gpa")),
        Rule::new("grade_label", &format!(r"grade[:\s]*{NUMBER}")),
        Rule::new("number_grade", &format!(r"{NUMBER}\s*grade")),
    ]
});

static PERCENTAGE_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new("percent_sign", &format!(r"{NUMBER}\s*%")),
        Rule::new("percentage_label", &format!(r"percentage[:\s]*{NUMBER}")),
        Rule::new("number_percent", &format!(r"{NUMBER}\s*percent")),
        Rule::new("score_label", &format!(r"score[:\s]*{NUMBER}")),
        Rule::new("number_score", &format!(r"{NUMBER}\s*score")),
    ]
});

static YEAR_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new("year_20xx", r"20[0-9]{2}"),
        Rule::new("year_19xx", r"19[0-9]{2}"),
        Rule::new("graduated_label", r"(?i)graduated[:\s]*([0-9]{4})"),
        Rule::new("completed_label", r"(?i)completed[:\s]*([0-9]{4})"),
    ]
});

/// First rule in `rules` that matches `text`.
fn first_match(rules: &[Rule], text: &str) -> Option<String> {
    rules.iter().find_map(|rule| {
        let value = rule.capture(text)?;
        debug!("academic rule '{}' matched '{}'", rule.name, value);
        Some(value)
    })
}

/// Scans education entries in order. Never fails; empty input yields all `None`.
pub fn extract_academic(entries: &[EducationEntry]) -> AcademicPerformance {
    let mut academic = AcademicPerformance::default();

    for entry in entries {
        let text = format!(
            "{} {}",
            entry.degree.to_lowercase(),
            entry.institution.to_lowercase()
        );

        if academic.cgpa.is_none() {
            academic.cgpa = first_match(&CGPA_RULES, &text);
        }
        if academic.percentage.is_none() {
            academic.percentage = first_match(&PERCENTAGE_RULES, &text);
        }
        if academic.graduation_year.is_none() {
            academic.graduation_year = first_match(&YEAR_RULES, &entry.year);
        }

        if academic.cgpa.is_some()
            && academic.percentage.is_some()
            && academic.graduation_year.is_some()
        {
            break;
        }
    }

    academic
}
