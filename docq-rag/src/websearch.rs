//! Web search client backed by the DuckDuckGo Instant Answer API.
//!
//! Web evidence is supplementary: this client fails open, returning an
//! empty result set on any provider error, timeout, or decode failure so
//! the document-only answer path is never blocked. Provider-side rate
//! limiting is likewise absorbed as empty results rather than retried.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

/// The default Instant Answer endpoint. No API key required.
const DEFAULT_ENDPOINT: &str = "https://api.duckduckgo.com/";

/// The default timeout for search requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Snippets longer than this are cut at a character boundary.
const SNIPPET_MAX_CHARS: usize = 300;

/// One ranked search result.
#[derive(Debug, Clone, PartialEq)]
pub struct WebHit {
    /// Result title as reported by the provider.
    pub title: String,
    /// Result URL; may be empty for abstract-only answers.
    pub url: String,
    /// Short text snippet, at most 300 characters.
    pub snippet: String,
}

/// A client for the DuckDuckGo Instant Answer API.
///
/// # Example
///
/// ```rust,ignore
/// use docq_rag::WebSearchClient;
///
/// let client = WebSearchClient::new();
/// let hits = client.search("rust borrow checker", 3).await;
/// ```
pub struct WebSearchClient {
    client: reqwest::Client,
    endpoint: String,
}

impl Default for WebSearchClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WebSearchClient {
    /// Create a client with the default endpoint and a 10 s timeout.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit request timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client, endpoint: DEFAULT_ENDPOINT.into() }
    }

    /// Override the endpoint (for proxies and test servers).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Search the web, returning up to `max_results` ranked hits.
    ///
    /// Never fails: any transport, status, or decode error is logged and
    /// yields an empty result set.
    pub async fn search(&self, query: &str, max_results: usize) -> Vec<WebHit> {
        if max_results == 0 || query.trim().is_empty() {
            return Vec::new();
        }

        match self.try_search(query, max_results).await {
            Ok(hits) => {
                debug!(query, hits = hits.len(), "web search completed");
                hits
            }
            Err(e) => {
                warn!(query, error = %e, "web search failed, continuing without web results");
                Vec::new()
            }
        }
    }

    async fn try_search(&self, query: &str, max_results: usize) -> reqwest::Result<Vec<WebHit>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_redirect", "1"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let answer: InstantAnswer = response.json().await?;
        Ok(answer.into_hits(max_results))
    }
}

// ── Instant Answer response types ──────────────────────────────────

#[derive(Debug, Deserialize)]
struct InstantAnswer {
    #[serde(default, rename = "Abstract")]
    abstract_text: String,
    #[serde(default, rename = "AbstractSource")]
    abstract_source: String,
    #[serde(default, rename = "AbstractURL")]
    abstract_url: String,
    #[serde(default, rename = "RelatedTopics")]
    related_topics: Vec<RelatedTopic>,
}

/// Related topics are either direct results or nested category groups.
///
/// The required `Text`/`Topics` fields drive untagged variant selection;
/// anything the provider ships that matches neither is kept as `Other`
/// and skipped.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RelatedTopic {
    Result {
        #[serde(rename = "Text")]
        text: String,
        #[serde(default, rename = "FirstURL")]
        first_url: String,
    },
    Group {
        #[serde(rename = "Topics")]
        topics: Vec<RelatedTopic>,
    },
    Other(serde_json::Value),
}

impl InstantAnswer {
    /// Flatten the answer into ranked hits: the abstract (a direct answer)
    /// first, then related topics in provider order.
    fn into_hits(self, max_results: usize) -> Vec<WebHit> {
        let mut hits = Vec::new();

        if !self.abstract_text.is_empty() {
            let title = if self.abstract_source.is_empty() {
                "DuckDuckGo".to_string()
            } else {
                self.abstract_source
            };
            hits.push(WebHit {
                title,
                url: self.abstract_url,
                snippet: truncate_snippet(&self.abstract_text),
            });
        }

        let mut stack = self.related_topics;
        while hits.len() < max_results {
            let Some(topic) = pop_front(&mut stack) else { break };
            match topic {
                RelatedTopic::Result { text, first_url } => {
                    if text.is_empty() {
                        continue;
                    }
                    hits.push(WebHit {
                        title: "Related topic".to_string(),
                        url: first_url,
                        snippet: truncate_snippet(&text),
                    });
                }
                RelatedTopic::Group { mut topics } => {
                    // Keep provider order: group members come before
                    // whatever follows the group.
                    topics.extend(stack);
                    stack = topics;
                }
                RelatedTopic::Other(_) => {}
            }
        }

        hits.truncate(max_results);
        hits
    }
}

fn pop_front(topics: &mut Vec<RelatedTopic>) -> Option<RelatedTopic> {
    if topics.is_empty() { None } else { Some(topics.remove(0)) }
}

/// Cut a snippet at a character boundary, appending an ellipsis when cut.
fn truncate_snippet(text: &str) -> String {
    if text.chars().count() <= SNIPPET_MAX_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(SNIPPET_MAX_CHARS).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abstract_becomes_first_hit() {
        let answer: InstantAnswer = serde_json::from_str(
            r#"{
                "Abstract": "Paris is the capital of France.",
                "AbstractSource": "Wikipedia",
                "AbstractURL": "https://en.wikipedia.org/wiki/Paris",
                "RelatedTopics": [
                    {"Text": "France - country in Europe", "FirstURL": "https://duckduckgo.com/France"}
                ]
            }"#,
        )
        .unwrap();

        let hits = answer.into_hits(3);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Wikipedia");
        assert_eq!(hits[0].snippet, "Paris is the capital of France.");
        assert_eq!(hits[1].url, "https://duckduckgo.com/France");
    }

    #[test]
    fn nested_topic_groups_are_flattened_in_order() {
        let answer: InstantAnswer = serde_json::from_str(
            r#"{
                "RelatedTopics": [
                    {"Topics": [
                        {"Text": "first", "FirstURL": "https://a"},
                        {"Text": "second", "FirstURL": "https://b"}
                    ]},
                    {"Text": "third", "FirstURL": "https://c"}
                ]
            }"#,
        )
        .unwrap();

        let hits = answer.into_hits(10);
        let snippets: Vec<&str> = hits.iter().map(|h| h.snippet.as_str()).collect();
        assert_eq!(snippets, vec!["first", "second", "third"]);
    }

    #[test]
    fn results_are_capped_at_max() {
        let answer: InstantAnswer = serde_json::from_str(
            r#"{
                "Abstract": "abstract",
                "RelatedTopics": [
                    {"Text": "one", "FirstURL": ""},
                    {"Text": "two", "FirstURL": ""}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(answer.into_hits(2).len(), 2);
    }

    #[test]
    fn long_snippets_are_cut_with_ellipsis() {
        let long = "x".repeat(400);
        let snippet = truncate_snippet(&long);
        assert_eq!(snippet.chars().count(), SNIPPET_MAX_CHARS + 3);
        assert!(snippet.ends_with("..."));
    }

    #[tokio::test]
    async fn unreachable_endpoint_fails_open() {
        let client = WebSearchClient::with_timeout(Duration::from_millis(200))
            .with_endpoint("http://127.0.0.1:1/");
        let hits = client.search("anything", 3).await;
        assert!(hits.is_empty());
    }
}
