use chrono::NaiveDate;
use nw_core::{
    ArticleRecord, Error, NewArticle, Reranker, Result, SearchProvider, Topic, WatchStore,
};
use tracing::info;

use crate::dedup;

/// At most this many ranked candidates are persisted per discovery run.
pub const MAX_SELECTED: usize = 20;

/// Fetches, deduplicates, ranks and persists candidates for one topic.
///
/// Purely additive: existing records are never touched, so re-running on
/// the same day can insert duplicate URLs. Aggregation deduplicates by URL
/// on read.
pub async fn discover(
    search: &dyn SearchProvider,
    reranker: &dyn Reranker,
    store: &dyn WatchStore,
    topic: &Topic,
    day: NaiveDate,
) -> Result<Vec<ArticleRecord>> {
    let raw = search.search(&topic.query).await?;
    let fetched = raw.len();

    let unique = dedup::filter_candidates(raw);
    info!(
        topic = %topic.name,
        fetched,
        dropped = fetched - unique.len(),
        "Deduplicated candidate titles"
    );

    let titles: Vec<String> = unique.iter().map(|c| c.title.clone()).collect();
    let ranked = reranker.rerank(&topic.query, &titles, MAX_SELECTED).await?;

    let selected = ranked
        .iter()
        .take(MAX_SELECTED)
        .map(|r| {
            let candidate = unique.get(r.index).cloned().ok_or_else(|| {
                Error::Rerank(format!("Ranked index {} out of range", r.index))
            })?;
            Ok(NewArticle {
                candidate,
                relevance_score: r.relevance_score,
                date_added: day,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    store.init_topic(topic).await?;
    let inserted = store.insert_candidates(topic, &selected).await?;
    info!(topic = %topic.name, inserted = inserted.len(), "Discovery completed");
    Ok(inserted)
}
