use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use nw_core::{Error, RankedDoc, Reranker, Result};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

const DEFAULT_ENDPOINT: &str = "https://api.cohere.com/v1/rerank";
const RERANK_MODEL: &str = "rerank-multilingual-v3.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Hard cap on how many ranked documents a rerank call may return;
/// documents beyond it are discarded from further processing.
pub const MAX_RANKED: usize = 20;

#[derive(Debug, Deserialize)]
struct RerankResponse {
    results: Vec<RankedDoc>,
}

/// Client for the Cohere rerank API.
pub struct CohereClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl fmt::Debug for CohereClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CohereClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl CohereClient {
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_endpoint(api_key, DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(api_key: &str, endpoint: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl Reranker for CohereClient {
    async fn rerank(&self, query: &str, docs: &[String], top_n: usize) -> Result<Vec<RankedDoc>> {
        // Blank documents are dropped before the call; their original
        // indices are restored on the way back.
        let kept: Vec<(usize, &str)> = docs
            .iter()
            .enumerate()
            .filter(|(_, d)| !d.trim().is_empty())
            .map(|(i, d)| (i, d.as_str()))
            .collect();
        if kept.is_empty() {
            return Ok(Vec::new());
        }

        let top_n = top_n.min(MAX_RANKED).min(kept.len());
        let documents: Vec<&str> = kept.iter().map(|(_, d)| *d).collect();

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": RERANK_MODEL,
                "query": query,
                "documents": documents,
                "top_n": top_n,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Rerank(format!(
                "Cohere rerank returned status {}",
                status
            )));
        }

        let parsed: RerankResponse = response.json().await?;
        debug!(query, returned = parsed.results.len(), "Rerank completed");

        parsed
            .results
            .into_iter()
            .take(top_n)
            .map(|r| {
                let (index, _) = *kept.get(r.index).ok_or_else(|| {
                    Error::Rerank(format!("Rerank returned out-of-range index {}", r.index))
                })?;
                Ok(RankedDoc {
                    index,
                    relevance_score: r.relevance_score,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blank_input_short_circuits() {
        // An unroutable endpoint proves no network call is made.
        let client = CohereClient::with_endpoint("test-key", "http://127.0.0.1:1/rerank").unwrap();
        let docs = vec!["".to_string(), "   ".to_string()];
        let ranked = client.rerank("query", &docs, 20).await.unwrap();
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_parse_rerank_response() {
        let raw = r#"{"results": [{"index": 2, "relevance_score": 0.91},
                                   {"index": 0, "relevance_score": 0.40}]}"#;
        let parsed: RerankResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.results.len(), 2);
        assert_eq!(parsed.results[0].index, 2);
        assert!(parsed.results[0].relevance_score > parsed.results[1].relevance_score);
    }
}
