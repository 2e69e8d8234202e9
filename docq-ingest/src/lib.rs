//! # docq-ingest
//!
//! Upload intake for docq: format detection, an ordered chain of
//! extraction strategies per format (primary and fallback PDF parsers,
//! lossy UTF-8 for text and markdown), and normalization of the
//! extracted text into clean whitespace-delimited words ready for
//! chunking.
//!
//! Extraction is CPU-bound and synchronous; async callers should wrap
//! [`extract_text`] in `tokio::task::spawn_blocking` for large uploads.

pub mod error;
pub mod extract;
pub mod normalize;

pub use error::{IngestError, Result};
pub use extract::{DocumentFormat, Extractor, MAX_UPLOAD_BYTES, extract_text};
pub use normalize::normalize;

/// Detect, extract, and normalize in one call.
///
/// This is the whole intake path short of chunking: sniff the format from
/// filename and declared mime, run the extraction chain, normalize the
/// result, and reject documents that come out empty.
///
/// # Errors
///
/// [`IngestError::UnsupportedFormat`], [`IngestError::TooLarge`],
/// [`IngestError::ExtractionFailed`], or [`IngestError::EmptyDocument`]
/// when normalization leaves no text.
pub fn extract_normalized(bytes: &[u8], filename: &str, declared_mime: &str) -> Result<String> {
    let format = DocumentFormat::detect(filename, declared_mime)?;
    let raw = extract_text(format, bytes, MAX_UPLOAD_BYTES)?;
    let text = normalize(&raw);
    if text.is_empty() {
        return Err(IngestError::EmptyDocument);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_upload_round_trips() {
        let text = extract_normalized(b"The capital  of France\nis Paris.", "fact.txt", "")
            .unwrap();
        assert_eq!(text, "The capital of France is Paris.");
    }

    #[test]
    fn whitespace_only_upload_is_an_empty_document() {
        let err = extract_normalized(b"  \n\t  ", "blank.txt", "text/plain");
        assert!(matches!(err, Err(IngestError::EmptyDocument)));
    }

    #[test]
    fn unsupported_extension_is_reported_with_the_filename() {
        let err = extract_normalized(b"...", "archive.zip", "application/zip");
        match err {
            Err(IngestError::UnsupportedFormat(msg)) => assert!(msg.contains("archive.zip")),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }
}
