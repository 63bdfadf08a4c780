//! OCR capabilities used by the extraction fallback paths.
//!
//! Both traits are injected into `DocumentExtractor`. The production
//! implementations shell out to poppler's `pdftoppm` and to `tesseract`,
//! working inside a temp dir that is removed on drop.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use image::DynamicImage;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{program} failed ({status}): {stderr}")]
    Command {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Rasterises every page of a PDF, in page order.
pub trait PageRenderer: Send + Sync {
    fn render_pages(&self, pdf: &[u8]) -> Result<Vec<DynamicImage>, OcrError>;
}

/// Recognises the text in a single image.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

// ────────────────────────────────────────────────────────────────────────────
// pdftoppm
// ────────────────────────────────────────────────────────────────────────────

pub struct PdftoppmRenderer {
    program: String,
    dpi: u32,
}

impl PdftoppmRenderer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            dpi: 300,
        }
    }
}

impl PageRenderer for PdftoppmRenderer {
    fn render_pages(&self, pdf: &[u8]) -> Result<Vec<DynamicImage>, OcrError> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("document.pdf");
        std::fs::write(&input, pdf)?;

        let output = Command::new(&self.program)
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-png")
            .arg(&input)
            .arg(dir.path().join("page"))
            .output()?;
        check_status(&self.program, &output)?;

        let mut pages: Vec<PathBuf> = std::fs::read_dir(dir.path())?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "png"))
            .collect();
        pages.sort_by_key(|path| page_number(path));
        debug!("{} rendered {} page(s)", self.program, pages.len());

        pages
            .iter()
            .map(|path| image::open(path).map_err(OcrError::from))
            .collect()
    }
}

/// `page-7.png` / `page-07.png` → 7. Unnumbered files sort last.
fn page_number(path: &Path) -> u32 {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.rsplit('-').next())
        .and_then(|n| n.parse().ok())
        .unwrap_or(u32::MAX)
}

// ────────────────────────────────────────────────────────────────────────────
// tesseract
// ────────────────────────────────────────────────────────────────────────────

pub struct TesseractOcr {
    program: String,
    language: String,
}

impl TesseractOcr {
    pub fn new(program: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            language: language.into(),
        }
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("image.png");
        image.save(&input)?;

        let output = Command::new(&self.program)
            .arg(&input)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()?;
        check_status(&self.program, &output)?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn check_status(program: &str, output: &Output) -> Result<(), OcrError> {
    if output.status.success() {
        return Ok(());
    }
    Err(OcrError::Command {
        program: program.to_string(),
        status: output.status.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_number_handles_zero_padding() {
        assert_eq!(page_number(Path::new("/tmp/x/page-1.png")), 1);
        assert_eq!(page_number(Path::new("/tmp/x/page-012.png")), 12);
        assert_eq!(page_number(Path::new("/tmp/x/cover.png")), u32::MAX);
    }

    #[test]
    fn test_page_order_is_numeric() {
        let mut pages = vec![
            PathBuf::from("page-10.png"),
            PathBuf::from("page-2.png"),
            PathBuf::from("page-1.png"),
        ];
        pages.sort_by_key(|p| page_number(p));
        assert_eq!(
            pages,
            vec![
                PathBuf::from("page-1.png"),
                PathBuf::from("page-2.png"),
                PathBuf::from("page-10.png"),
            ]
        );
    }

    #[test]
    fn test_missing_binary_is_an_io_error() {
        let renderer = PdftoppmRenderer::new("definitely-not-a-real-pdftoppm-binary");
        let err = renderer.render_pages(b"%PDF-1.4").unwrap_err();
        assert!(matches!(err, OcrError::Io(_)));
    }
}
