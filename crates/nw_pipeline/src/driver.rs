use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;
use nw_core::{
    Error, Extractor, Reranker, SearchProvider, Summarizer, Synthesizer, Topic, WatchStore,
};
use tracing::{error, info, warn};

use crate::{discovery, summarize, watchlist};

/// What one topic's pipeline run produced.
#[derive(Debug, Clone)]
pub struct TopicReport {
    pub topic: String,
    pub discovered: usize,
    pub enriched: usize,
    pub digest_written: bool,
}

/// Wires the three stages to their collaborators and fans runs out across
/// topics.
pub struct Pipeline {
    search: Arc<dyn SearchProvider>,
    reranker: Arc<dyn Reranker>,
    extractor: Arc<dyn Extractor>,
    summarizer: Arc<dyn Summarizer>,
    synthesizer: Arc<dyn Synthesizer>,
    store: Arc<dyn WatchStore>,
}

impl Pipeline {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        reranker: Arc<dyn Reranker>,
        extractor: Arc<dyn Extractor>,
        summarizer: Arc<dyn Summarizer>,
        synthesizer: Arc<dyn Synthesizer>,
        store: Arc<dyn WatchStore>,
    ) -> Self {
        Self {
            search,
            reranker,
            extractor,
            summarizer,
            synthesizer,
            store,
        }
    }

    /// Discovery, summarization and aggregation for one topic and day.
    ///
    /// Each stage's failure is logged and the next stage still runs: the
    /// stages are independently re-runnable and a failed later stage never
    /// corrupts earlier output. This function never returns an error, so a
    /// topic can never cancel its siblings in [`Pipeline::run`].
    pub async fn run_topic(&self, topic: &Topic, day: NaiveDate) -> TopicReport {
        info!(topic = %topic.name, %day, "Pipeline run starting");

        let discovered = match discovery::discover(
            self.search.as_ref(),
            self.reranker.as_ref(),
            self.store.as_ref(),
            topic,
            day,
        )
        .await
        {
            Ok(records) => records.len(),
            Err(e) => {
                error!(topic = %topic.name, error = %e, "Discovery failed");
                0
            }
        };

        let enriched = match summarize::summarize_topic(
            self.extractor.as_ref(),
            self.summarizer.as_ref(),
            self.store.as_ref(),
            topic,
        )
        .await
        {
            Ok(count) => count,
            Err(e) => {
                error!(topic = %topic.name, error = %e, "Summarization stage failed");
                0
            }
        };

        let digest_written = match watchlist::aggregate_topic(
            self.synthesizer.as_ref(),
            self.store.as_ref(),
            topic,
            day,
        )
        .await
        {
            Ok(_) => true,
            Err(Error::NoSummaries { .. }) => {
                warn!(topic = %topic.name, %day, "No summaries today; digest skipped");
                false
            }
            Err(e) => {
                error!(topic = %topic.name, error = %e, "Aggregation failed");
                false
            }
        };

        info!(
            topic = %topic.name,
            discovered,
            enriched,
            digest_written,
            "Pipeline run finished"
        );
        TopicReport {
            topic: topic.name.clone(),
            discovered,
            enriched,
            digest_written,
        }
    }

    /// Runs all topics concurrently. Topic failures are contained inside
    /// [`Pipeline::run_topic`], so the joint wait always completes.
    pub async fn run(&self, topics: &[Topic], day: NaiveDate) -> Vec<TopicReport> {
        join_all(topics.iter().map(|topic| self.run_topic(topic, day))).await
    }
}
