use std::collections::HashMap;

use serde::Serialize;

use crate::models::{StoredCandidate, StoredSkills};

const TOP_SKILLS: usize = 10;
const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Count {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ProfileStatistics {
    pub total_candidates: usize,
    pub cities: Vec<Count>,
    pub regions: Vec<Count>,
    pub degrees: Vec<Count>,
    pub top_skills: Vec<Count>,
}

/// Counts keyed by label, remembering first-seen order for ties.
#[derive(Default)]
struct Tally {
    index: HashMap<String, usize>,
    counts: Vec<Count>,
}

impl Tally {
    fn add(&mut self, label: &str) {
        let label = if label.trim().is_empty() { UNKNOWN } else { label };
        match self.index.get(label) {
            Some(&i) => self.counts[i].count += 1,
            None => {
                self.index.insert(label.to_string(), self.counts.len());
                self.counts.push(Count {
                    label: label.to_string(),
                    count: 1,
                });
            }
        }
    }

    /// Descending by count; ties keep first-seen order.
    fn sorted(mut self) -> Vec<Count> {
        self.counts.sort_by(|a, b| b.count.cmp(&a.count));
        self.counts
    }
}

pub fn compute_statistics(candidates: &[StoredCandidate]) -> ProfileStatistics {
    let mut cities = Tally::default();
    let mut regions = Tally::default();
    let mut degrees = Tally::default();
    let mut skills = Tally::default();

    for c in candidates {
        cities.add(&c.city);
        regions.add(&c.region);
        for edu in &c.education {
            degrees.add(&edu.degree);
        }
        match &c.skills {
            StoredSkills::Structured(list) => list.iter().for_each(|s| skills.add(s)),
            StoredSkills::Raw(text) => text
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .for_each(|s| skills.add(s)),
        }
    }

    let mut top_skills = skills.sorted();
    top_skills.truncate(TOP_SKILLS);

    ProfileStatistics {
        total_candidates: candidates.len(),
        cities: cities.sorted(),
        regions: regions.sorted(),
        degrees: degrees.sorted(),
        top_skills,
    }
}
