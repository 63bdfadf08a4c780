use anyhow::{Context, Result};

use crate::shortlist::FilterMode;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub filter_mode: FilterMode,
    pub pdftoppm_bin: String,
    pub tesseract_bin: String,
    pub ocr_lang: String,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: optional_env("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
            filter_mode: optional_env("SHORTLIST_FILTER_MODE", "narrowing")
                .parse()
                .context("SHORTLIST_FILTER_MODE must be 'narrowing' or 'conjunctive'")?,
            pdftoppm_bin: optional_env("PDFTOPPM_BIN", "pdftoppm"),
            tesseract_bin: optional_env("TESSERACT_BIN", "tesseract"),
            ocr_lang: optional_env("OCR_LANG", "eng"),
            max_upload_bytes: match std::env::var("MAX_UPLOAD_BYTES") {
                Ok(v) => v
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
            },
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
