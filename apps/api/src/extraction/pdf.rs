use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error, warn};

use super::{DocumentKind, ExtractedText, ExtractionError, OcrEngine, PageRenderer, Provenance};

/// Reads the embedded text layer of every page, concatenated in page order.
pub fn read_text_layer(bytes: &[u8]) -> Result<String, ExtractionError> {
    contain_panic(|| {
        pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ExtractionError::Format(DocumentKind::Pdf, e.to_string()))
    })
}

/// pdf-extract panics on some malformed fonts; report that as a format error.
fn contain_panic<F>(read: F) -> Result<String, ExtractionError>
where
    F: FnOnce() -> Result<String, ExtractionError>,
{
    panic::catch_unwind(AssertUnwindSafe(read)).unwrap_or_else(|payload| {
        let reason = panic_message(payload.as_ref());
        error!("PDF text extraction panicked: {reason}");
        Err(ExtractionError::Format(DocumentKind::Pdf, reason))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "text extraction panicked".to_string())
}

/// Direct text first; OCR over rendered pages only when the text layer is blank.
pub(crate) fn extract<F>(
    bytes: &[u8],
    text_layer: F,
    renderer: &dyn PageRenderer,
    ocr: &dyn OcrEngine,
) -> Result<ExtractedText, ExtractionError>
where
    F: Fn(&[u8]) -> Result<String, ExtractionError>,
{
    let text = text_layer(bytes)?;
    if !text.trim().is_empty() {
        return Ok(ExtractedText {
            text: text.trim().to_string(),
            provenance: Provenance::Direct,
        });
    }

    warn!("PDF has no text layer, falling back to OCR");
    let pages = renderer
        .render_pages(bytes)
        .map_err(|e| ExtractionError::Ocr(DocumentKind::Pdf, e.to_string()))?;

    let mut recognized = String::new();
    for (index, page) in pages.iter().enumerate() {
        let page_text = ocr
            .recognize(page)
            .map_err(|e| ExtractionError::Ocr(DocumentKind::Pdf, e.to_string()))?;
        debug!("OCR page {}: {} chars", index + 1, page_text.len());
        recognized.push_str(&page_text);
    }

    let recognized = recognized.trim();
    if recognized.is_empty() {
        return Err(ExtractionError::NoTextAfterOcr(DocumentKind::Pdf));
    }

    Ok(ExtractedText {
        text: recognized.to_string(),
        provenance: Provenance::Ocr,
    })
}
