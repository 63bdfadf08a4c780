use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{AcademicPerformance, CandidateRecord, CandidateRow, StoredCandidate};
use crate::store::validation::validate_for_store;
use crate::store::ProfileStore;

/// `ProfileStore` over the `candidate_profiles` table.
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn upsert(
        &self,
        record: &CandidateRecord,
        ats_score: u8,
        academic: &AcademicPerformance,
    ) -> Result<StoredCandidate, AppError> {
        validate_for_store(record)?;
        let pending = StoredCandidate::from_record(Uuid::new_v4(), record, ats_score, academic, Utc::now());

        let skills = serde_json::to_string(&record.skills).context("Failed to encode skills")?;
        let education =
            serde_json::to_string(&record.education).context("Failed to encode education")?;
        let experience =
            serde_json::to_string(&record.experience).context("Failed to encode experience")?;
        let projects =
            serde_json::to_string(&record.projects).context("Failed to encode projects")?;

        let mut tx = self.pool.begin().await?;

        let row: CandidateRow = sqlx::query_as(
            r#"
            INSERT INTO candidate_profiles
                (id, email, name, phone, skills, education, experience, projects,
                 ats_score, city, region, cgpa, academic_percentage, graduation_year, uploaded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, NOW())
            ON CONFLICT (email) DO UPDATE SET
                name = EXCLUDED.name,
                phone = EXCLUDED.phone,
                skills = EXCLUDED.skills,
                education = EXCLUDED.education,
                experience = EXCLUDED.experience,
                projects = EXCLUDED.projects,
                ats_score = EXCLUDED.ats_score,
                city = EXCLUDED.city,
                region = EXCLUDED.region,
                cgpa = EXCLUDED.cgpa,
                academic_percentage = EXCLUDED.academic_percentage,
                graduation_year = EXCLUDED.graduation_year,
                uploaded_at = NOW()
            RETURNING *
            "#,
        )
        .bind(pending.id)
        .bind(&pending.email)
        .bind(&pending.name)
        .bind(&pending.phone)
        .bind(skills)
        .bind(education)
        .bind(experience)
        .bind(projects)
        .bind(pending.ats_score)
        .bind(&pending.city)
        .bind(&pending.region)
        .bind(&pending.cgpa)
        .bind(&pending.academic_percentage)
        .bind(&pending.graduation_year)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!("Stored profile {} ({})", row.id, row.email);
        Ok(row.into())
    }

    async fn list(&self) -> Result<Vec<StoredCandidate>, AppError> {
        let rows: Vec<CandidateRow> =
            sqlx::query_as("SELECT * FROM candidate_profiles ORDER BY created_at, id")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(StoredCandidate::from).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM candidate_profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_score(&self, email: &str, ats_score: u8) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE candidate_profiles SET ats_score = $1 WHERE email = $2")
            .bind(i32::from(ats_score))
            .bind(email.trim())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
