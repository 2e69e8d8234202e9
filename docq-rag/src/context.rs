//! Fusing document and web evidence into one budgeted, attributed context.

use std::collections::{HashMap, HashSet};

use docq_core::{ChunkRef, DocumentId, DocumentMeta, Source};
use tracing::debug;

use crate::config::RagConfig;
use crate::websearch::WebHit;

/// A vector search hit joined with its chunk text.
///
/// The index returns bare [`ChunkRef`]s; the caller resolves text from
/// the chunk store before assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorHit {
    /// The retrieved chunk.
    pub chunk: ChunkRef,
    /// Cosine similarity to the query.
    pub score: f32,
    /// The chunk's text.
    pub text: String,
}

/// The assembled evidence for one generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledContext {
    /// Evidence text for the prompt; empty when nothing grounded the query.
    pub text: String,
    /// Provenance for the answer, deduplicated per document.
    pub sources: Vec<Source>,
    /// Whether evidence was dropped to fit the word budget.
    pub truncated: bool,
}

impl AssembledContext {
    /// True when no evidence survived filtering and budgeting. The caller
    /// must then answer from general knowledge and flag it as ungrounded.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.sources.is_empty()
    }
}

/// Merges top-k vector hits and web snippets into one ranked evidence
/// list with deduplicated source attribution, subject to a word budget.
///
/// Document evidence leads when it is relevant (top score at or above the
/// configured threshold); otherwise web evidence fills the gap first.
/// Budgeting drops lowest-ranked whole items, never splitting a chunk.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    relevance_threshold: f32,
    budget_words: usize,
}

enum Evidence<'a> {
    Doc(&'a VectorHit),
    Web(&'a WebHit),
}

impl Evidence<'_> {
    fn cost_words(&self) -> usize {
        match self {
            Evidence::Doc(hit) => hit.text.split_whitespace().count(),
            Evidence::Web(hit) => {
                hit.title.split_whitespace().count() + hit.snippet.split_whitespace().count()
            }
        }
    }
}

impl ContextAssembler {
    /// Create an assembler with an explicit threshold and word budget.
    pub fn new(relevance_threshold: f32, budget_words: usize) -> Self {
        Self { relevance_threshold, budget_words }
    }

    /// Create an assembler from pipeline configuration.
    pub fn from_config(config: &RagConfig) -> Self {
        Self::new(config.relevance_threshold, config.context_budget_words)
    }

    /// Merge vector hits and web hits into context text plus sources.
    ///
    /// `documents` is the session's registry; hits owned by unknown or
    /// inactive documents are dropped before ranking. With both inputs
    /// empty (or everything filtered out) the result is empty and the
    /// caller falls back to ungrounded generation.
    pub fn assemble(
        &self,
        vector_hits: &[VectorHit],
        web_hits: &[WebHit],
        documents: &[DocumentMeta],
    ) -> AssembledContext {
        let active: HashMap<DocumentId, &DocumentMeta> =
            documents.iter().filter(|d| d.is_active).map(|d| (d.id, d)).collect();

        let doc_hits: Vec<&VectorHit> = vector_hits
            .iter()
            .filter(|h| active.contains_key(&h.chunk.document_id))
            .collect();

        // Document evidence leads only when it is actually relevant;
        // hits arrive ranked, so the first one carries the top score.
        let docs_lead = doc_hits.first().is_some_and(|h| h.score >= self.relevance_threshold);

        let mut ranked: Vec<Evidence<'_>> = Vec::with_capacity(doc_hits.len() + web_hits.len());
        if docs_lead {
            ranked.extend(doc_hits.iter().copied().map(Evidence::Doc));
            ranked.extend(web_hits.iter().map(Evidence::Web));
        } else {
            ranked.extend(web_hits.iter().map(Evidence::Web));
            ranked.extend(doc_hits.iter().copied().map(Evidence::Doc));
        }

        // Budget walk: admit whole items from the top until the next one
        // would overflow.
        let mut used = 0usize;
        let mut truncated = false;
        let mut taken: Vec<Evidence<'_>> = Vec::new();
        for item in ranked {
            let cost = item.cost_words();
            if used + cost > self.budget_words {
                truncated = true;
                break;
            }
            used += cost;
            taken.push(item);
        }

        let mut doc_texts: Vec<&str> = Vec::new();
        let mut web_lines: Vec<String> = Vec::new();
        let mut doc_sources: Vec<Source> = Vec::new();
        let mut web_sources: Vec<Source> = Vec::new();
        let mut seen_docs: HashSet<DocumentId> = HashSet::new();

        for item in &taken {
            match item {
                Evidence::Doc(hit) => {
                    doc_texts.push(&hit.text);
                    // One document-kind source per distinct document, no
                    // matter how many of its chunks contributed.
                    if seen_docs.insert(hit.chunk.document_id) {
                        let meta = active[&hit.chunk.document_id];
                        doc_sources.push(Source::Document {
                            document_id: meta.id,
                            title: meta.filename.clone(),
                        });
                    }
                }
                Evidence::Web(hit) => {
                    let mut line = format!("- {}: {}", hit.title, hit.snippet);
                    if !hit.url.is_empty() {
                        line.push_str(&format!(" ({})", hit.url));
                    }
                    web_lines.push(line);
                    web_sources.push(Source::Web {
                        title: hit.title.clone(),
                        url: hit.url.clone(),
                    });
                }
            }
        }

        let doc_section = if doc_texts.is_empty() {
            None
        } else {
            Some(format!("Document content:\n{}", doc_texts.join("\n\n")))
        };
        let web_section = if web_lines.is_empty() {
            None
        } else {
            Some(format!("Web results:\n{}", web_lines.join("\n")))
        };

        let sections: Vec<String> = if docs_lead {
            [doc_section, web_section].into_iter().flatten().collect()
        } else {
            [web_section, doc_section].into_iter().flatten().collect()
        };
        let sources: Vec<Source> = if docs_lead {
            doc_sources.into_iter().chain(web_sources).collect()
        } else {
            web_sources.into_iter().chain(doc_sources).collect()
        };

        debug!(
            words = used,
            sources = sources.len(),
            truncated,
            docs_lead,
            "context assembled"
        );

        AssembledContext { text: sections.join("\n\n"), sources, truncated }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use docq_core::SessionId;

    use super::*;

    fn meta(id: DocumentId, filename: &str, is_active: bool) -> DocumentMeta {
        DocumentMeta {
            id,
            session_id: SessionId::from_string("s"),
            filename: filename.to_string(),
            chunk_count: 1,
            file_size: 100,
            is_active,
            uploaded_at: Utc::now(),
        }
    }

    fn hit(doc: DocumentId, ordinal: usize, score: f32, text: &str) -> VectorHit {
        VectorHit { chunk: ChunkRef::new(doc, ordinal), score, text: text.to_string() }
    }

    fn web(title: &str, snippet: &str) -> WebHit {
        WebHit { title: title.into(), url: format!("https://example.org/{title}"), snippet: snippet.into() }
    }

    #[test]
    fn empty_inputs_produce_empty_context() {
        let assembler = ContextAssembler::new(0.7, 100);
        let out = assembler.assemble(&[], &[], &[]);
        assert!(out.is_empty());
        assert!(!out.truncated);
    }

    #[test]
    fn chunks_of_one_document_dedup_to_one_source() {
        let doc = DocumentId::generate();
        let docs = vec![meta(doc, "notes.pdf", true)];
        let hits = vec![
            hit(doc, 0, 0.9, "alpha"),
            hit(doc, 1, 0.85, "beta"),
            hit(doc, 2, 0.8, "gamma"),
        ];

        let out = ContextAssembler::new(0.7, 100).assemble(&hits, &[], &docs);

        let doc_sources: Vec<_> =
            out.sources.iter().filter(|s| s.document_id().is_some()).collect();
        assert_eq!(doc_sources.len(), 1);
        assert!(out.text.contains("alpha") && out.text.contains("gamma"));
    }

    #[test]
    fn inactive_documents_are_excluded() {
        let shown = DocumentId::generate();
        let hidden = DocumentId::generate();
        let docs = vec![meta(shown, "a.pdf", true), meta(hidden, "b.pdf", false)];
        let hits = vec![hit(hidden, 0, 0.99, "secret"), hit(shown, 0, 0.9, "visible")];

        let out = ContextAssembler::new(0.7, 100).assemble(&hits, &[], &docs);

        assert!(!out.text.contains("secret"));
        assert!(out.text.contains("visible"));
        assert_eq!(out.sources.len(), 1);
        assert_eq!(out.sources[0].document_id(), Some(shown));
    }

    #[test]
    fn relevant_documents_lead_web_evidence() {
        let doc = DocumentId::generate();
        let docs = vec![meta(doc, "a.pdf", true)];
        let hits = vec![hit(doc, 0, 0.9, "from the document")];
        let webs = vec![web("Example", "from the web")];

        let out = ContextAssembler::new(0.7, 100).assemble(&hits, &webs, &docs);

        let doc_pos = out.text.find("Document content:").unwrap();
        let web_pos = out.text.find("Web results:").unwrap();
        assert!(doc_pos < web_pos);
        assert!(matches!(out.sources[0], Source::Document { .. }));
    }

    #[test]
    fn weak_document_evidence_yields_to_web() {
        let doc = DocumentId::generate();
        let docs = vec![meta(doc, "a.pdf", true)];
        let hits = vec![hit(doc, 0, 0.2, "barely related")];
        let webs = vec![web("Example", "solid answer")];

        let out = ContextAssembler::new(0.7, 100).assemble(&hits, &webs, &docs);

        let web_pos = out.text.find("Web results:").unwrap();
        let doc_pos = out.text.find("Document content:").unwrap();
        assert!(web_pos < doc_pos);
        assert!(matches!(out.sources[0], Source::Web { .. }));
    }

    #[test]
    fn budget_drops_whole_chunks_from_the_bottom() {
        let doc = DocumentId::generate();
        let docs = vec![meta(doc, "a.pdf", true)];
        // Each chunk is 4 words; budget 10 admits two whole chunks.
        let hits = vec![
            hit(doc, 0, 0.95, "one two three four"),
            hit(doc, 1, 0.90, "five six seven eight"),
            hit(doc, 2, 0.85, "nine ten eleven twelve"),
        ];

        let out = ContextAssembler::new(0.7, 10).assemble(&hits, &[], &docs);

        assert!(out.truncated);
        assert!(out.text.contains("one two three four"));
        assert!(out.text.contains("five six seven eight"));
        assert!(!out.text.contains("nine"));
    }

    #[test]
    fn web_only_fallback_when_index_returns_nothing() {
        let webs = vec![web("Example", "the only evidence")];
        let out = ContextAssembler::new(0.7, 100).assemble(&[], &webs, &[]);

        assert!(out.text.starts_with("Web results:"));
        assert_eq!(out.sources.len(), 1);
    }
}
