use async_trait::async_trait;
use chrono::NaiveDate;

use crate::types::{
    ArticleRecord, DailySummary, Digest, Enrichment, NewArticle, PendingArticle, Topic,
};
use crate::Result;

/// The persistent store: one article table per topic plus one shared
/// digest table keyed by (topic, day).
///
/// Stages hold records only for the duration of one call; the store owns
/// them. Single inserts and updates are atomic.
#[async_trait]
pub trait WatchStore: Send + Sync {
    /// Ensures the topic's article table exists.
    async fn init_topic(&self, topic: &Topic) -> Result<()>;

    /// Inserts a discovery batch. Purely additive: never updates or
    /// deletes pre-existing rows. Returns the inserted records with their
    /// assigned ids, enrichment unset.
    async fn insert_candidates(
        &self,
        topic: &Topic,
        articles: &[NewArticle],
    ) -> Result<Vec<ArticleRecord>>;

    /// Fetches one record by id.
    async fn article(&self, topic: &Topic, id: i64) -> Result<Option<ArticleRecord>>;

    /// Records whose enrichment group is still null, in insertion order.
    async fn pending_articles(&self, topic: &Topic) -> Result<Vec<PendingArticle>>;

    /// Writes the full enrichment group to one record in a single update.
    async fn apply_enrichment(&self, topic: &Topic, id: i64, enrichment: &Enrichment)
        -> Result<()>;

    /// Enriched records added on `day`, deduplicated by URL (first
    /// occurrence wins), in insertion order.
    async fn summaries_for_day(&self, topic: &Topic, day: NaiveDate) -> Result<Vec<DailySummary>>;

    /// Inserts or replaces the digest for its (topic, day) key.
    async fn upsert_digest(&self, digest: &Digest) -> Result<()>;

    async fn digest_for(&self, topic: &Topic, day: NaiveDate) -> Result<Option<Digest>>;
}
