use tracing::info;

/// Text pulled out of an uploaded PDF, bounded to a maximum page count.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub text: String,
    /// Page count of the source file, before any page cap was applied.
    pub page_count: usize,
    pub truncated: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("corrupted PDF: {0}")]
    Corrupted(String),
    #[error("PDF is password protected")]
    PasswordProtected,
    #[error("could not read file: {0}")]
    Unreadable(String),
}

/// Extract plain text from in-memory PDF bytes, keeping at most
/// `max_pages` pages. `truncated` reports whether pages were dropped.
pub fn extract_text(bytes: &[u8], max_pages: usize) -> Result<ExtractedDocument, ExtractionError> {
    if !bytes.starts_with(b"%PDF-") {
        return Err(ExtractionError::Unreadable("not a PDF file".into()));
    }

    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(classify)?;
    let page_count = pages.len();
    let truncated = page_count > max_pages;
    let kept = if truncated {
        &pages[..max_pages]
    } else {
        &pages[..]
    };
    let text = kept.join("\n").trim().to_string();

    info!(page_count, truncated, chars = text.len(), "extracted PDF text");
    Ok(ExtractedDocument {
        text,
        page_count,
        truncated,
    })
}

fn classify(err: pdf_extract::OutputError) -> ExtractionError {
    let msg = err.to_string();
    let lower = msg.to_lowercase();
    if lower.contains("encrypt") || lower.contains("password") || lower.contains("decrypt") {
        ExtractionError::PasswordProtected
    } else {
        ExtractionError::Corrupted(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_pdf_payload() {
        let err = extract_text(b"GIF89a not a pdf", 20).unwrap_err();
        assert!(matches!(err, ExtractionError::Unreadable(_)));
    }

    #[test]
    fn test_rejects_empty_payload() {
        let err = extract_text(b"", 20).unwrap_err();
        assert!(matches!(err, ExtractionError::Unreadable(_)));
    }

    #[test]
    fn test_garbage_after_header_is_corrupted() {
        let err = extract_text(b"%PDF-1.7\nnot actually a pdf body", 20).unwrap_err();
        assert!(matches!(err, ExtractionError::Corrupted(_)));
    }
}
