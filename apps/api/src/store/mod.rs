//! Profile Store — durable candidate profiles keyed by email.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{AcademicPerformance, CandidateRecord, StoredCandidate};

#[cfg(test)]
pub mod memory;
pub mod postgres;
pub mod validation;

pub use postgres::PgProfileStore;

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Inserts or fully overwrites the profile with the record's email.
    /// Rejects records that fail `validation::validate_for_store`.
    async fn upsert(
        &self,
        record: &CandidateRecord,
        ats_score: u8,
        academic: &AcademicPerformance,
    ) -> Result<StoredCandidate, AppError>;

    /// Every profile in insertion order.
    async fn list(&self) -> Result<Vec<StoredCandidate>, AppError>;

    /// Returns false when no profile had this id.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Returns false when no profile has this email.
    async fn update_score(&self, email: &str, ats_score: u8) -> Result<bool, AppError>;
}
