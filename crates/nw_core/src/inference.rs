use async_trait::async_trait;

use crate::types::{ArticleSummary, Topic};
use crate::Result;

/// Per-article structured summarization.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarizes one article body in the topic's prompt context. A
    /// response that does not satisfy the [`ArticleSummary`] schema is an
    /// error, never partial data.
    async fn summarize(&self, topic: &Topic, body: &str) -> Result<ArticleSummary>;
}

/// Per-topic narrative synthesis over concatenated summaries.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Produces the 3-6 paragraph watchlist narrative for a topic from the
    /// concatenated daily summaries.
    async fn synthesize(&self, topic: &Topic, combined: &str) -> Result<String>;
}
