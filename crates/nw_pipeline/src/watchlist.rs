use chrono::NaiveDate;
use nw_core::{Digest, Error, Result, Synthesizer, Topic, WatchStore};
use tracing::info;

/// Rolls one day's article summaries for a topic into a single narrative
/// digest and upserts it under the (topic, day) key.
///
/// A day without enriched records yields [`Error::NoSummaries`] and no
/// store write; a failed or unparseable synthesis call likewise leaves the
/// store untouched.
pub async fn aggregate_topic(
    synthesizer: &dyn Synthesizer,
    store: &dyn WatchStore,
    topic: &Topic,
    day: NaiveDate,
) -> Result<Digest> {
    let summaries = store.summaries_for_day(topic, day).await?;
    if summaries.is_empty() {
        return Err(Error::NoSummaries {
            topic: topic.name.clone(),
            day,
        });
    }

    let combined = summaries
        .iter()
        .map(|s| s.summary.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let urls: Vec<String> = summaries.iter().map(|s| s.url.clone()).collect();

    let narrative = synthesizer.synthesize(topic, &combined).await?;

    let digest = Digest {
        topic: topic.name.clone(),
        day,
        watchlist: narrative,
        urls,
    };
    store.upsert_digest(&digest).await?;
    info!(
        topic = %topic.name,
        %day,
        sources = digest.urls.len(),
        "Digest stored"
    );
    Ok(digest)
}
