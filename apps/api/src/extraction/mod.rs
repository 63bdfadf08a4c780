//! Document Text Extractor — turns an uploaded PDF or DOCX into plain text.
//!
//! The direct path reads the document's own text. When that comes back blank
//! the extractor falls back to OCR through the injected `PageRenderer` and
//! `OcrEngine`, and tags the result with `Provenance::Ocr`.
//!
//! Everything here is blocking. Callers on the async runtime go through
//! `tokio::task::spawn_blocking`.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub mod docx;
pub mod ocr;
pub mod pdf;

pub use ocr::{OcrEngine, PageRenderer, PdftoppmRenderer, TesseractOcr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Resolves a file extension (`"pdf"`, `".DOCX"`, ...) to a supported kind.
    pub fn from_extension(extension: &str) -> Result<Self, ExtractionError> {
        let ext = extension.trim().trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Ok(DocumentKind::Pdf),
            "docx" => Ok(DocumentKind::Docx),
            "doc" => Err(ExtractionError::LegacyDoc),
            _ => Err(ExtractionError::UnsupportedFormat(ext)),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Pdf => f.write_str("PDF"),
            DocumentKind::Docx => f.write_str("DOCX"),
        }
    }
}

/// Whether the text came straight from the document or from OCR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Direct,
    Ocr,
}

/// An uploaded document. Request-scoped; never persisted.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub bytes: Bytes,
    pub extension: String,
}

impl RawDocument {
    pub fn new(bytes: impl Into<Bytes>, extension: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            extension: extension.into(),
        }
    }

    /// Builds a document from an upload's file name, taking the text after the
    /// last dot as the extension.
    pub fn from_file_name(bytes: impl Into<Bytes>, file_name: &str) -> Self {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or_default();
        Self::new(bytes, extension)
    }

    pub fn kind(&self) -> Result<DocumentKind, ExtractionError> {
        DocumentKind::from_extension(&self.extension)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedText {
    pub text: String,
    pub provenance: Provenance,
}

/// Extraction failures. The `Display` strings reach the uploader unchanged,
/// so each failure class keeps its own wording.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type '{0}'. Please upload a PDF or DOCX file.")]
    UnsupportedFormat(String),

    #[error("DOC files are not supported. Please upload a DOCX or PDF file.")]
    LegacyDoc,

    #[error("{0} extraction error: {1}")]
    Format(DocumentKind, String),

    #[error("{0} OCR error: {1}")]
    Ocr(DocumentKind, String),

    #[error("{0} OCR produced no text")]
    NoTextAfterOcr(DocumentKind),
}

/// Direct extraction with an OCR fallback. Cheap to clone; the capabilities
/// are shared.
#[derive(Clone)]
pub struct DocumentExtractor {
    renderer: Arc<dyn PageRenderer>,
    ocr: Arc<dyn OcrEngine>,
}

impl DocumentExtractor {
    pub fn new(renderer: Arc<dyn PageRenderer>, ocr: Arc<dyn OcrEngine>) -> Self {
        Self { renderer, ocr }
    }

    pub fn extract(&self, document: &RawDocument) -> Result<ExtractedText, ExtractionError> {
        let kind = document.kind()?;
        let extracted = match kind {
            DocumentKind::Pdf => pdf::extract(
                &document.bytes,
                pdf::read_text_layer,
                self.renderer.as_ref(),
                self.ocr.as_ref(),
            )?,
            DocumentKind::Docx => docx::extract(&document.bytes, self.ocr.as_ref())?,
        };

        info!(
            "Extracted {} chars from {} ({:?})",
            extracted.text.len(),
            kind,
            extracted.provenance
        );
        Ok(extracted)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use image::{DynamicImage, RgbImage};

    use super::ocr::OcrError;
    use super::*;

    /// Renders a fixed number of blank pages and counts calls.
    #[derive(Default)]
    pub struct StubRenderer {
        pub pages: usize,
        pub calls: AtomicUsize,
        pub fail: bool,
    }

    impl PageRenderer for StubRenderer {
        fn render_pages(&self, _pdf: &[u8]) -> Result<Vec<DynamicImage>, OcrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(OcrError::Command {
                    program: "pdftoppm".to_string(),
                    status: "exit status: 1".to_string(),
                    stderr: "render failed".to_string(),
                });
            }
            Ok((0..self.pages)
                .map(|_| DynamicImage::ImageRgb8(RgbImage::new(2, 2)))
                .collect())
        }
    }

    /// Returns the same text for every image and counts calls.
    #[derive(Default)]
    pub struct StubOcr {
        pub text: String,
        pub calls: AtomicUsize,
    }

    impl StubOcr {
        pub fn with_text(text: &str) -> Self {
            Self {
                text: text.to_string(),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl OcrEngine for StubOcr {
        fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.text.clone())
        }
    }

    /// A DOCX package with one paragraph per line.
    pub fn docx_with_lines(lines: &[&str]) -> Vec<u8> {
        use docx_rs::{Docx, Paragraph, Run};

        let docx = lines.iter().fold(Docx::new(), |docx, line| {
            docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*line)))
        });
        let mut cursor = std::io::Cursor::new(Vec::new());
        docx.build().pack(&mut cursor).unwrap();
        cursor.into_inner()
    }

    /// An extractor whose capabilities never touch external binaries.
    pub fn stub_extractor(ocr_text: &str) -> DocumentExtractor {
        DocumentExtractor::new(
            Arc::new(StubRenderer::default()),
            Arc::new(StubOcr::with_text(ocr_text)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{StubOcr, StubRenderer};
    use super::*;

    #[test]
    fn test_extension_resolution() {
        assert_eq!(DocumentKind::from_extension("pdf").unwrap(), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_extension(".DOCX").unwrap(), DocumentKind::Docx);
        assert!(matches!(
            DocumentKind::from_extension("doc"),
            Err(ExtractionError::LegacyDoc)
        ));
        assert!(matches!(
            DocumentKind::from_extension("png"),
            Err(ExtractionError::UnsupportedFormat(ext)) if ext == "png"
        ));
    }

    #[test]
    fn test_unsupported_format_attempts_nothing() {
        let renderer = Arc::new(StubRenderer::default());
        let ocr = Arc::new(StubOcr::with_text("never"));
        let extractor = DocumentExtractor::new(renderer.clone(), ocr.clone());

        let doc = RawDocument::from_file_name(b"plain text".to_vec(), "resume.txt");
        let err = extractor.extract(&doc).unwrap_err();

        assert!(matches!(err, ExtractionError::UnsupportedFormat(_)));
        assert_eq!(ocr.call_count(), 0);
        assert_eq!(
            renderer.calls.load(std::sync::atomic::Ordering::SeqCst),
            0
        );
    }

    #[test]
    fn test_file_name_without_extension_is_unsupported() {
        let doc = RawDocument::from_file_name(Vec::new(), "resume");
        assert!(matches!(doc.kind(), Err(ExtractionError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_failure_strings_are_distinct() {
        let format = ExtractionError::Format(DocumentKind::Pdf, "bad xref".into()).to_string();
        let ocr = ExtractionError::Ocr(DocumentKind::Pdf, "tesseract missing".into()).to_string();
        let empty = ExtractionError::NoTextAfterOcr(DocumentKind::Docx).to_string();
        assert_eq!(format, "PDF extraction error: bad xref");
        assert_eq!(ocr, "PDF OCR error: tesseract missing");
        assert_eq!(empty, "DOCX OCR produced no text");
    }
}
