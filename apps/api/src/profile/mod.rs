//! Résumé profiling: oracle-backed parsing, academic mining, ATS scoring and
//! the ingestion pipeline that ties them to the store.

pub mod academic;
pub mod advice;
pub mod handlers;
pub mod ingest;
pub mod parser;
pub mod prompts;
pub mod scoring;
