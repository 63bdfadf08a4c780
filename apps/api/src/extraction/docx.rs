use std::io::{Cursor, Read};

use docx_rs::{DocumentChild, ParagraphChild, RunChild};
use tracing::{debug, warn};

use super::{DocumentKind, ExtractedText, ExtractionError, OcrEngine, Provenance};

const MEDIA_PREFIX: &str = "word/media/";

/// Paragraph text first; OCR over embedded images when the body has no text.
pub(crate) fn extract(bytes: &[u8], ocr: &dyn OcrEngine) -> Result<ExtractedText, ExtractionError> {
    let text = read_paragraphs(bytes)?;
    if !text.is_empty() {
        return Ok(ExtractedText {
            text,
            provenance: Provenance::Direct,
        });
    }

    warn!("DOCX has no paragraph text, scanning embedded images for OCR");
    let mut recognized = String::new();
    for (name, data) in embedded_media(bytes)? {
        let image = match image::load_from_memory(&data) {
            Ok(image) => image,
            Err(e) => {
                warn!("Skipping undecodable DOCX image {name}: {e}");
                continue;
            }
        };
        match ocr.recognize(&image) {
            Ok(page_text) => {
                debug!("OCR {name}: {} chars", page_text.len());
                recognized.push_str(&page_text);
            }
            Err(e) => warn!("OCR failed for DOCX image {name}: {e}"),
        }
    }

    let recognized = recognized.trim();
    if recognized.is_empty() {
        return Err(ExtractionError::NoTextAfterOcr(DocumentKind::Docx));
    }

    Ok(ExtractedText {
        text: recognized.to_string(),
        provenance: Provenance::Ocr,
    })
}

/// Top-level body paragraphs, one per line, trimmed as a whole.
fn read_paragraphs(bytes: &[u8]) -> Result<String, ExtractionError> {
    let docx = docx_rs::read_docx(bytes)
        .map_err(|e| ExtractionError::Format(DocumentKind::Docx, e.to_string()))?;

    let mut lines = Vec::new();
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(paragraph) = child {
            let mut line = String::new();
            push_paragraph_text(&paragraph.children, &mut line);
            lines.push(line);
        }
    }

    Ok(lines.join("\n").trim().to_string())
}

/// Run text including runs nested in hyperlinks. Tabs and breaks are kept as
/// `\t` and `\n`.
fn push_paragraph_text(children: &[ParagraphChild], line: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for run_child in &run.children {
                    match run_child {
                        RunChild::Text(t) => line.push_str(&t.text),
                        RunChild::Tab(_) => line.push('\t'),
                        RunChild::Break(_) => line.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => push_paragraph_text(&link.children, line),
            _ => {}
        }
    }
}

/// Raw bytes of every file under `word/media/`, in archive order.
fn embedded_media(bytes: &[u8]) -> Result<Vec<(String, Vec<u8>)>, ExtractionError> {
    let zip_error = |e: zip::result::ZipError| ExtractionError::Ocr(DocumentKind::Docx, e.to_string());

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(zip_error)?;
    let mut media = Vec::new();
    for index in 0..archive.len() {
        let mut file = archive.by_index(index).map_err(zip_error)?;
        if !file.name().starts_with(MEDIA_PREFIX) || file.is_dir() {
            continue;
        }
        let name = file.name().to_string();
        let mut data = Vec::new();
        file.read_to_end(&mut data)
            .map_err(|e| ExtractionError::Ocr(DocumentKind::Docx, e.to_string()))?;
        media.push((name, data));
    }
    Ok(media)
}
