use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::{DocumentExtractor, Provenance, RawDocument};
use crate::llm_client::Oracle;
use crate::models::{AcademicPerformance, CandidateRecord};
use crate::profile::academic::extract_academic;
use crate::profile::advice::suggest_improvements;
use crate::profile::parser::parse_candidate;
use crate::profile::scoring::calculate_ats_score;
use crate::store::ProfileStore;

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub id: Uuid,
    pub parsed_data: CandidateRecord,
    pub ats_score: u8,
    pub academic_performance: AcademicPerformance,
    pub provenance: Provenance,
    pub improvements: Vec<String>,
}

/// Document → text → record → {academic, score} → store, then improvement tips.
///
/// Unsupported formats are rejected before any extraction work starts. Nothing
/// is stored unless every step up to the upsert succeeds.
pub async fn ingest_resume(
    document: RawDocument,
    extractor: &DocumentExtractor,
    oracle: &dyn Oracle,
    store: &dyn ProfileStore,
) -> Result<IngestResponse, AppError> {
    document.kind()?;

    let extractor = extractor.clone();
    let extracted = tokio::task::spawn_blocking(move || extractor.extract(&document))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Extraction task failed: {e}")))??;

    let record = parse_candidate(&extracted.text, oracle).await?;
    let ats_score = calculate_ats_score(&record);
    let academic = extract_academic(&record.education);

    let stored = store.upsert(&record, ats_score, &academic).await?;
    info!(
        "Ingested resume for {} (ats {}, {:?})",
        stored.email, ats_score, extracted.provenance
    );

    let improvements = suggest_improvements(&record, oracle).await;

    Ok(IngestResponse {
        id: stored.id,
        parsed_data: record,
        ats_score,
        academic_performance: academic,
        provenance: extracted.provenance,
        improvements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::testing::{docx_with_lines, stub_extractor};
    use crate::llm_client::testing::CannedOracle;
    use crate::store::memory::MemoryProfileStore;

    const PARSED: &str = r#"{
        "name": "Asha Rao",
        "email": "",
        "phone": "555-0100",
        "skills": ["Rust", "SQL", "Docker", "Kafka", "Go"],
        "education": [{"degree": "B.Tech, CGPA: 8.5", "institution": "IIT", "year": "2024"}],
        "experience": [{"title": "Intern", "company": "Acme", "duration": "6 months"}],
        "projects": [],
        "location": {"city": "Pune", "region": ""}
    }"#;

    const TIPS: &str = r#"["Add metrics", "Name the Rust crates you used"]"#;

    #[tokio::test]
    async fn test_full_pipeline_stores_profile() {
        let oracle = CannedOracle::new(&[PARSED, TIPS]);
        let store = MemoryProfileStore::default();
        let doc = RawDocument::new(
            docx_with_lines(&["Asha Rao", "asha.rao@example.com", "Rust developer"]),
            "docx",
        );

        let out = ingest_resume(doc, &stub_extractor(""), &oracle, &store)
            .await
            .unwrap();

        assert_eq!(out.provenance, Provenance::Direct);
        assert_eq!(out.parsed_data.email, "asha.rao@example.com");
        assert_eq!(out.ats_score, 7 + 7 + 6 + 15 + 10 + 10);
        assert_eq!(out.academic_performance.cgpa.as_deref(), Some("8.5"));
        assert_eq!(out.improvements.len(), 5);
        assert_eq!(out.improvements[0], "Add metrics");

        let rows = store.snapshot().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, out.id);
        assert_eq!(rows[0].city, "Pune");
        assert_eq!(rows[0].region, "Unknown");
        assert_eq!(rows[0].graduation_year.as_deref(), Some("2024"));
    }

    #[tokio::test]
    async fn test_unsupported_format_never_calls_oracle() {
        let oracle = CannedOracle::new(&[PARSED]);
        let store = MemoryProfileStore::default();
        let doc = RawDocument::new(b"plain text".to_vec(), "txt");

        let err = ingest_resume(doc, &stub_extractor(""), &oracle, &store)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UnsupportedFormat(_)));
        assert_eq!(oracle.call_count(), 0);
    }

    #[tokio::test]
    async fn test_extraction_failure_reason_is_kept() {
        let oracle = CannedOracle::new(&[PARSED]);
        let store = MemoryProfileStore::default();
        let doc = RawDocument::new(docx_with_lines(&[]), "docx");

        let err = ingest_resume(doc, &stub_extractor(""), &oracle, &store)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "DOCX OCR produced no text");
        assert_eq!(oracle.call_count(), 0);
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_email_is_not_stored() {
        let oracle = CannedOracle::new(&[r#"{"name": "No Contact"}"#]);
        let store = MemoryProfileStore::default();
        let doc = RawDocument::new(docx_with_lines(&["No Contact", "Rust"]), "docx");

        let err = ingest_resume(doc, &stub_extractor(""), &oracle, &store)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::StoreValidation(_)));
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_flattened_education_still_stores() {
        let oracle = CannedOracle::new(&[
            r#"{"email": "ravi@example.com", "education": ["B.Tech CGPA 8.5, IIT, 2020"]}"#,
            "[]",
        ]);
        let store = MemoryProfileStore::default();
        let doc = RawDocument::new(docx_with_lines(&["Ravi", "ravi@example.com"]), "docx");

        let out = ingest_resume(doc, &stub_extractor(""), &oracle, &store)
            .await
            .unwrap();

        assert_eq!(out.academic_performance.cgpa.as_deref(), Some("8.5"));
        let rows = store.snapshot().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].education[0].degree, "B.Tech CGPA 8.5, IIT, 2020");
    }

    #[tokio::test]
    async fn test_reingest_overwrites_derived_fields() {
        let store = MemoryProfileStore::default();
        let doc = || RawDocument::new(docx_with_lines(&["asha@example.com"]), "docx");

        let first = CannedOracle::new(&[
            r#"{"email": "asha@example.com", "education": [{"degree": "CGPA 7.0", "year": "2020"}]}"#,
            "[]",
        ]);
        ingest_resume(doc(), &stub_extractor(""), &first, &store)
            .await
            .unwrap();

        let second = CannedOracle::new(&[
            r#"{"email": "asha@example.com", "name": "Asha", "education": [{"degree": "B.Sc 91%"}]}"#,
            "[]",
        ]);
        ingest_resume(doc(), &stub_extractor(""), &second, &store)
            .await
            .unwrap();

        let rows = store.snapshot().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Asha");
        assert_eq!(rows[0].cgpa, None);
        assert_eq!(rows[0].academic_percentage.as_deref(), Some("91"));
        assert_eq!(rows[0].graduation_year, None);
    }
}
