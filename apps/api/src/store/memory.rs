//! In-memory `ProfileStore` for pipeline and router tests.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{AcademicPerformance, CandidateRecord, StoredCandidate};
use crate::store::validation::validate_for_store;
use crate::store::ProfileStore;

#[derive(Default)]
pub struct MemoryProfileStore {
    rows: Mutex<Vec<StoredCandidate>>,
}

impl MemoryProfileStore {
    pub fn with_candidates(rows: Vec<StoredCandidate>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }

    pub async fn snapshot(&self) -> Vec<StoredCandidate> {
        self.rows.lock().await.clone()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn upsert(
        &self,
        record: &CandidateRecord,
        ats_score: u8,
        academic: &AcademicPerformance,
    ) -> Result<StoredCandidate, AppError> {
        validate_for_store(record)?;

        let mut rows = self.rows.lock().await;
        let email = record.email.trim();
        let now = Utc::now();

        if let Some(existing) = rows.iter_mut().find(|row| row.email == email) {
            *existing = StoredCandidate::from_record(existing.id, record, ats_score, academic, now);
            return Ok(existing.clone());
        }

        let stored = StoredCandidate::from_record(Uuid::new_v4(), record, ats_score, academic, now);
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<StoredCandidate>, AppError> {
        Ok(self.rows.lock().await.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().await;
        let before = rows.len();
        rows.retain(|row| row.id != id);
        Ok(rows.len() != before)
    }

    async fn update_score(&self, email: &str, ats_score: u8) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().await;
        match rows.iter_mut().find(|row| row.email == email.trim()) {
            Some(row) => {
                row.ats_score = i32::from(ats_score);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(email: &str, name: &str) -> CandidateRecord {
        CandidateRecord {
            name: name.to_string(),
            email: email.to_string(),
            skills: vec!["Rust".to_string()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_upsert_overwrites_by_email() {
        let store = MemoryProfileStore::default();
        let first = store
            .upsert(&record("a@example.com", "First"), 40, &AcademicPerformance::default())
            .await
            .unwrap();
        let academic = AcademicPerformance {
            cgpa: Some("8.5".to_string()),
            ..Default::default()
        };
        let second = store
            .upsert(&record("a@example.com", "Second"), 70, &academic)
            .await
            .unwrap();

        let rows = store.list().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(first.id, second.id);
        assert_eq!(rows[0].name, "Second");
        assert_eq!(rows[0].ats_score, 70);
        assert_eq!(rows[0].cgpa.as_deref(), Some("8.5"));
        assert_eq!(rows[0].city, "Unknown");
    }

    #[tokio::test]
    async fn test_empty_email_is_rejected() {
        let store = MemoryProfileStore::default();
        let err = store
            .upsert(&record("", "Nobody"), 10, &AcademicPerformance::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StoreValidation(_)));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_and_update_score() {
        let store = MemoryProfileStore::default();
        let stored = store
            .upsert(&record("b@example.com", "B"), 20, &AcademicPerformance::default())
            .await
            .unwrap();

        assert!(store.update_score("b@example.com", 90).await.unwrap());
        assert!(!store.update_score("missing@example.com", 90).await.unwrap());
        assert_eq!(store.list().await.unwrap()[0].ats_score, 90);

        assert!(store.delete(stored.id).await.unwrap());
        assert!(!store.delete(stored.id).await.unwrap());
    }
}
