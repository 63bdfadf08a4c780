pub mod candidate;

pub use candidate::{
    AcademicPerformance, CandidateRecord, CandidateRow, EducationEntry, StoredCandidate,
    StoredSkills,
};
