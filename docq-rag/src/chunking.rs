//! Word-window chunking of extracted document text.

use crate::error::{RagError, Result};

/// Splits normalized text into bounded, overlapping word-count windows.
///
/// Windows hold at most `max_words` words and advance by
/// `max_words - overlap_words` per step, so the tail of one chunk
/// reappears at the head of the next. The duplication is bounded and
/// positional, not semantic; it keeps sentences that straddle a boundary
/// retrievable from both sides.
///
/// # Example
///
/// ```rust,ignore
/// use docq_rag::WordChunker;
///
/// let chunker = WordChunker::new(1000, 50)?;
/// let chunks = chunker.chunk(&extracted_text)?;
/// ```
#[derive(Debug, Clone)]
pub struct WordChunker {
    max_words: usize,
    overlap_words: usize,
}

impl WordChunker {
    /// Create a new `WordChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if `max_words` is zero or
    /// `overlap_words >= max_words` (the window would never advance).
    pub fn new(max_words: usize, overlap_words: usize) -> Result<Self> {
        if max_words == 0 {
            return Err(RagError::Config("max_words must be greater than zero".to_string()));
        }
        if overlap_words >= max_words {
            return Err(RagError::Config(format!(
                "overlap_words ({overlap_words}) must be less than max_words ({max_words})"
            )));
        }
        Ok(Self { max_words, overlap_words })
    }

    /// Maximum number of words per chunk.
    pub fn max_words(&self) -> usize {
        self.max_words
    }

    /// Number of words shared between consecutive chunks.
    pub fn overlap_words(&self) -> usize {
        self.overlap_words
    }

    /// Split text into overlapping word windows.
    ///
    /// The final chunk may be shorter than `max_words`. Words are
    /// whitespace-delimited; runs of whitespace collapse to single spaces
    /// in the output.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyInput`] if the text contains no words.
    pub fn chunk(&self, text: &str) -> Result<Vec<String>> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return Err(RagError::EmptyInput);
        }

        let step = self.max_words - self.overlap_words;
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < words.len() {
            let end = (start + self.max_words).min(words.len());
            chunks.push(words[start..end].join(" "));
            if end == words.len() {
                break;
            }
            start += step;
        }

        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word_text(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn empty_text_is_rejected() {
        let chunker = WordChunker::new(10, 2).unwrap();
        assert!(matches!(chunker.chunk("   \n\t "), Err(RagError::EmptyInput)));
    }

    #[test]
    fn short_text_yields_single_chunk() {
        let chunker = WordChunker::new(10, 2).unwrap();
        let chunks = chunker.chunk("one two three").unwrap();
        assert_eq!(chunks, vec!["one two three"]);
    }

    #[test]
    fn windows_are_bounded_and_overlap() {
        let chunker = WordChunker::new(5, 2).unwrap();
        let chunks = chunker.chunk(&word_text(12)).unwrap();

        for chunk in &chunks {
            assert!(chunk.split_whitespace().count() <= 5);
        }
        // Tail of chunk 0 reappears at the head of chunk 1.
        let tail: Vec<&str> = chunks[0].split_whitespace().rev().take(2).collect();
        let head: Vec<&str> = chunks[1].split_whitespace().take(2).collect();
        assert_eq!(tail.into_iter().rev().collect::<Vec<_>>(), head);
    }

    #[test]
    fn dropping_overlaps_reconstructs_word_sequence() {
        let chunker = WordChunker::new(7, 3).unwrap();
        let text = word_text(25);
        let chunks = chunker.chunk(&text).unwrap();

        let mut rebuilt: Vec<String> = Vec::new();
        for (i, chunk) in chunks.iter().enumerate() {
            let skip = if i == 0 { 0 } else { chunker.overlap_words() };
            rebuilt.extend(chunk.split_whitespace().skip(skip).map(String::from));
        }
        assert_eq!(rebuilt.join(" "), text);
    }

    #[test]
    fn no_trailing_pure_overlap_chunk() {
        // 10 words, window 5, overlap 2: final window must not consist
        // solely of words already emitted.
        let chunker = WordChunker::new(5, 2).unwrap();
        let chunks = chunker.chunk(&word_text(10)).unwrap();
        let last = chunks.last().unwrap();
        assert!(last.split_whitespace().count() > chunker.overlap_words());
    }

    #[test]
    fn overlap_equal_to_window_is_a_config_error() {
        assert!(matches!(WordChunker::new(5, 5), Err(RagError::Config(_))));
    }
}
