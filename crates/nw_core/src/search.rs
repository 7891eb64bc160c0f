use async_trait::async_trait;

use crate::types::{Candidate, RankedDoc};
use crate::Result;

/// External article search. One call per topic per discovery run.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Fetches candidate articles for a query. A non-success response from
    /// the provider fails the whole call.
    async fn search(&self, query: &str) -> Result<Vec<Candidate>>;
}

/// Semantic relevance ranking of documents against a query.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Returns at most `min(docs.len(), top_n)` entries sorted by
    /// descending relevance. Indices refer to `docs`. An input with no
    /// non-blank documents yields an empty result without a network call.
    async fn rerank(&self, query: &str, docs: &[String], top_n: usize) -> Result<Vec<RankedDoc>>;
}

/// Readable-body extraction from an article URL.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<String>;
}
