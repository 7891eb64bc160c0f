use futures::stream::{self, StreamExt};
use nw_core::{Enrichment, Extractor, PendingArticle, Result, Summarizer, Topic, WatchStore};
use tracing::{info, warn};

/// Bound on simultaneous extraction/summarization tasks per topic, sized
/// to the external services' tolerance rather than the pending backlog.
pub const MAX_IN_FLIGHT: usize = 8;

/// Enriches every pending record of a topic. Returns how many records
/// were enriched.
///
/// Per-record failures are logged and isolated: the failing record keeps a
/// null enrichment group and stays in the pending set for a future run,
/// and sibling tasks are unaffected. Records already enriched never enter
/// the input set, so re-running is a no-op for them.
pub async fn summarize_topic(
    extractor: &dyn Extractor,
    summarizer: &dyn Summarizer,
    store: &dyn WatchStore,
    topic: &Topic,
) -> Result<usize> {
    let pending = store.pending_articles(topic).await?;
    if pending.is_empty() {
        info!(topic = %topic.name, "No pending articles to summarize");
        return Ok(0);
    }
    info!(topic = %topic.name, pending = pending.len(), "Summarizing pending articles");

    let outcomes: Vec<bool> = stream::iter(pending)
        .map(|article| async move {
            match enrich_article(extractor, summarizer, store, topic, &article).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(
                        topic = %topic.name,
                        id = article.id,
                        url = %article.url,
                        error = %e,
                        "Failed to enrich article; record left pending for retry"
                    );
                    false
                }
            }
        })
        .buffer_unordered(MAX_IN_FLIGHT)
        .collect()
        .await;

    let enriched = outcomes.iter().filter(|ok| **ok).count();
    info!(topic = %topic.name, enriched, "Summarization completed");
    Ok(enriched)
}

/// Full text, structured summary, then one atomic write of the whole
/// enrichment group. Any failure before the write leaves the record
/// exactly as it was.
async fn enrich_article(
    extractor: &dyn Extractor,
    summarizer: &dyn Summarizer,
    store: &dyn WatchStore,
    topic: &Topic,
    article: &PendingArticle,
) -> Result<()> {
    let body = extractor.extract(&article.url).await?;
    let summary = summarizer.summarize(topic, &body).await?;
    let enrichment = Enrichment {
        body,
        short_title: summary.short_title_en,
        summary: summary.summary_en,
        sentiment: summary.sentiment,
    };
    store.apply_enrichment(topic, article.id, &enrichment).await
}
