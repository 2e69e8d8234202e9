//! Ordered extraction strategies per document format.
//!
//! Each strategy is a pure function over the uploaded bytes. Strategies
//! for a format are tried in sequence until one yields text or all fail;
//! the last failure is what the caller sees.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::{IngestError, Result};

/// Default upload size limit (50 MiB).
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// A supported upload format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Portable Document Format.
    Pdf,
    /// Plain UTF-8 (or near-UTF-8) text.
    Text,
    /// Markdown, treated as plain text for retrieval purposes.
    Markdown,
}

impl DocumentFormat {
    /// Detect the format from the filename extension, falling back to the
    /// declared mime type.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::UnsupportedFormat`] when neither is recognized.
    pub fn detect(filename: &str, declared_mime: &str) -> Result<Self> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("pdf") => return Ok(Self::Pdf),
            Some("txt") => return Ok(Self::Text),
            Some("md" | "markdown") => return Ok(Self::Markdown),
            _ => {}
        }

        match declared_mime {
            "application/pdf" => Ok(Self::Pdf),
            "text/plain" => Ok(Self::Text),
            "text/markdown" => Ok(Self::Markdown),
            _ => Err(IngestError::UnsupportedFormat(format!(
                "{filename} ({declared_mime})"
            ))),
        }
    }

    /// Short lowercase label used in errors and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Text => "text",
            Self::Markdown => "markdown",
        }
    }

    /// The ordered strategy chain for this format.
    fn strategies(&self) -> &'static [&'static dyn Extractor] {
        static PDF_CHAIN: [&dyn Extractor; 2] = [&PdfExtract, &LopdfFallback];
        static TEXT_CHAIN: [&dyn Extractor; 1] = [&PlainText];
        match self {
            Self::Pdf => &PDF_CHAIN,
            Self::Text | Self::Markdown => &TEXT_CHAIN,
        }
    }
}

/// One extraction strategy: uploaded bytes in, raw text out.
pub trait Extractor: Send + Sync {
    /// Strategy name for logs.
    fn name(&self) -> &'static str;

    /// Extract text from the raw bytes.
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

/// Primary PDF strategy using the `pdf-extract` crate's layout-aware
/// text reconstruction.
struct PdfExtract;

impl Extractor for PdfExtract {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    fn extract(&self, bytes: &[u8]) -> Result<String> {
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| IngestError::ExtractionFailed {
            format: "pdf".into(),
            message: e.to_string(),
        })
    }
}

/// Fallback PDF strategy: walk the page tree with `lopdf` and pull text
/// objects directly. Cruder than `pdf-extract` but survives documents
/// whose layout analysis fails.
struct LopdfFallback;

impl Extractor for LopdfFallback {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let failed = |message: String| IngestError::ExtractionFailed {
            format: "pdf".into(),
            message,
        };

        let document = lopdf::Document::load_mem(bytes).map_err(|e| failed(e.to_string()))?;
        let pages: Vec<u32> = document.get_pages().keys().copied().collect();
        if pages.is_empty() {
            return Err(failed("PDF contains no pages".into()));
        }

        document.extract_text(&pages).map_err(|e| failed(e.to_string()))
    }
}

/// Strategy for plain text and markdown: UTF-8 with lossy fallback for
/// legacy encodings.
struct PlainText;

impl Extractor for PlainText {
    fn name(&self) -> &'static str {
        "utf8"
    }

    fn extract(&self, bytes: &[u8]) -> Result<String> {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Run the format's strategy chain over the uploaded bytes.
///
/// The first succeeding strategy wins. When all fail, the error carries
/// the last strategy's failure.
///
/// # Errors
///
/// - [`IngestError::TooLarge`] when the upload exceeds `max_bytes`.
/// - [`IngestError::ExtractionFailed`] when every strategy fails.
pub fn extract_text(format: DocumentFormat, bytes: &[u8], max_bytes: usize) -> Result<String> {
    if bytes.len() > max_bytes {
        return Err(IngestError::TooLarge { size: bytes.len(), limit: max_bytes });
    }

    let mut last_error = None;
    for strategy in format.strategies() {
        match strategy.extract(bytes) {
            Ok(text) => {
                debug!(strategy = strategy.name(), format = format.label(), "extraction succeeded");
                return Ok(text);
            }
            Err(e) => {
                warn!(strategy = strategy.name(), error = %e, "extraction strategy failed");
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| IngestError::ExtractionFailed {
        format: format.label().into(),
        message: "no extraction strategy available".into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_formats_by_extension() {
        assert_eq!(DocumentFormat::detect("a.PDF", "").unwrap(), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::detect("notes.txt", "").unwrap(), DocumentFormat::Text);
        assert_eq!(DocumentFormat::detect("readme.md", "").unwrap(), DocumentFormat::Markdown);
    }

    #[test]
    fn falls_back_to_declared_mime() {
        assert_eq!(
            DocumentFormat::detect("upload", "application/pdf").unwrap(),
            DocumentFormat::Pdf
        );
    }

    #[test]
    fn unknown_format_is_rejected() {
        let err = DocumentFormat::detect("slides.pptx", "application/octet-stream");
        assert!(matches!(err, Err(IngestError::UnsupportedFormat(_))));
    }

    #[test]
    fn plain_text_extracts_verbatim() {
        let text = extract_text(DocumentFormat::Text, b"hello world", MAX_UPLOAD_BYTES).unwrap();
        assert_eq!(text, "hello world");
    }

    #[test]
    fn invalid_utf8_is_extracted_lossily() {
        let text = extract_text(DocumentFormat::Text, &[0x68, 0x69, 0xFF], MAX_UPLOAD_BYTES)
            .unwrap();
        assert!(text.starts_with("hi"));
    }

    #[test]
    fn oversized_upload_is_rejected() {
        let err = extract_text(DocumentFormat::Text, b"abcdef", 3);
        assert!(matches!(err, Err(IngestError::TooLarge { size: 6, limit: 3 })));
    }

    #[test]
    fn garbage_pdf_fails_through_the_whole_chain() {
        let err = extract_text(DocumentFormat::Pdf, b"not a pdf at all", MAX_UPLOAD_BYTES);
        assert!(matches!(err, Err(IngestError::ExtractionFailed { .. })));
    }
}
