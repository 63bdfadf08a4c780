use serde_json::Value;

use crate::models::CandidateRecord;

const NAME_POINTS: u32 = 7;
const EMAIL_POINTS: u32 = 7;
const PHONE_POINTS: u32 = 6;
const POINTS_PER_SKILL: u32 = 3;
const SKILLS_CAP: u32 = 30;
const POINTS_PER_EDUCATION: u32 = 10;
const EDUCATION_CAP: u32 = 20;
const POINTS_PER_EXPERIENCE: u32 = 10;
const EXPERIENCE_CAP: u32 = 30;

/// Minimum ATS score for the default shortlist.
pub const SHORTLIST_THRESHOLD: i32 = 50;

/// Additive ATS score in [0, 100]:
/// contact fields 7/7/6, skills 3 each (cap 30), education 10 each (cap 20),
/// experience 10 each (cap 30). A contact field counts when it is non-empty,
/// whitespace included.
pub fn calculate_ats_score(record: &CandidateRecord) -> u8 {
    score_counts(
        !record.name.is_empty(),
        !record.email.is_empty(),
        !record.phone.is_empty(),
        record.skills.len(),
        record.education.len(),
        record.experience.len(),
    )
}

/// Scores loosely-shaped JSON (the standalone scoring endpoint). Fields that
/// are missing or of the wrong type contribute nothing; non-objects score 0.
pub fn calculate_ats_score_value(value: &Value) -> u8 {
    let Some(fields) = value.as_object() else {
        return 0;
    };
    let present = |key: &str| match fields.get(key) {
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Null) | None => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
    };
    let count = |key: &str| fields.get(key).and_then(Value::as_array).map_or(0, Vec::len);

    score_counts(
        present("name"),
        present("email"),
        present("phone"),
        count("skills"),
        count("education"),
        count("experience"),
    )
}

fn score_counts(
    has_name: bool,
    has_email: bool,
    has_phone: bool,
    skills: usize,
    education: usize,
    experience: usize,
) -> u8 {
    let mut score = 0u32;
    if has_name {
        score += NAME_POINTS;
    }
    if has_email {
        score += EMAIL_POINTS;
    }
    if has_phone {
        score += PHONE_POINTS;
    }
    score += capped(skills, POINTS_PER_SKILL, SKILLS_CAP);
    score += capped(education, POINTS_PER_EDUCATION, EDUCATION_CAP);
    score += capped(experience, POINTS_PER_EXPERIENCE, EXPERIENCE_CAP);

    score.min(100) as u8
}

fn capped(count: usize, per_item: u32, cap: u32) -> u32 {
    u32::try_from(count)
        .unwrap_or(u32::MAX)
        .saturating_mul(per_item)
        .min(cap)
}
