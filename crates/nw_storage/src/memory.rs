use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use nw_core::{
    ArticleRecord, DailySummary, Digest, Enrichment, Error, NewArticle, PendingArticle, Result,
    Topic, WatchStore,
};
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    tables: HashMap<String, Vec<ArticleRecord>>,
    digests: HashMap<(String, NaiveDate), Digest>,
    next_id: i64,
}

/// In-memory [`WatchStore`] with the same visible semantics as the SQLite
/// store. Used in pipeline tests.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WatchStore for MemoryStore {
    async fn init_topic(&self, topic: &Topic) -> Result<()> {
        let table = topic.table_ident()?.to_string();
        self.inner.write().await.tables.entry(table).or_default();
        Ok(())
    }

    async fn insert_candidates(
        &self,
        topic: &Topic,
        articles: &[NewArticle],
    ) -> Result<Vec<ArticleRecord>> {
        let table = topic.table_ident()?.to_string();
        let mut inner = self.inner.write().await;

        let mut inserted = Vec::with_capacity(articles.len());
        for article in articles {
            inner.next_id += 1;
            let c = &article.candidate;
            inserted.push(ArticleRecord {
                id: inner.next_id,
                url: c.url.clone(),
                title: c.title.clone(),
                content: c.content.clone(),
                seendate: c.seendate.clone(),
                domain: c.domain.clone(),
                language: c.language.clone(),
                sourcecountry: c.sourcecountry.clone(),
                relevance_score: article.relevance_score,
                date_added: article.date_added,
                enrichment: None,
            });
        }
        inner
            .tables
            .entry(table)
            .or_default()
            .extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn article(&self, topic: &Topic, id: i64) -> Result<Option<ArticleRecord>> {
        let table = topic.table_ident()?.to_string();
        let inner = self.inner.read().await;
        Ok(inner
            .tables
            .get(&table)
            .and_then(|rows| rows.iter().find(|r| r.id == id).cloned()))
    }

    async fn pending_articles(&self, topic: &Topic) -> Result<Vec<PendingArticle>> {
        let table = topic.table_ident()?.to_string();
        let inner = self.inner.read().await;
        Ok(inner
            .tables
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .filter(|r| r.enrichment.is_none())
                    .map(|r| PendingArticle {
                        id: r.id,
                        url: r.url.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn apply_enrichment(
        &self,
        topic: &Topic,
        id: i64,
        enrichment: &Enrichment,
    ) -> Result<()> {
        let table = topic.table_ident()?.to_string();
        let mut inner = self.inner.write().await;
        let record = inner
            .tables
            .get_mut(&table)
            .and_then(|rows| rows.iter_mut().find(|r| r.id == id))
            .ok_or_else(|| Error::Storage(format!("No article with id {}", id)))?;
        record.enrichment = Some(enrichment.clone());
        Ok(())
    }

    async fn summaries_for_day(&self, topic: &Topic, day: NaiveDate) -> Result<Vec<DailySummary>> {
        let table = topic.table_ident()?.to_string();
        let inner = self.inner.read().await;
        let mut seen = std::collections::HashSet::new();
        Ok(inner
            .tables
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .filter(|r| r.date_added == day)
                    .filter_map(|r| {
                        r.enrichment.as_ref().map(|e| DailySummary {
                            id: r.id,
                            url: r.url.clone(),
                            summary: e.summary.clone(),
                        })
                    })
                    .filter(|s| seen.insert(s.url.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn upsert_digest(&self, digest: &Digest) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner
            .digests
            .insert((digest.topic.clone(), digest.day), digest.clone());
        Ok(())
    }

    async fn digest_for(&self, topic: &Topic, day: NaiveDate) -> Result<Option<Digest>> {
        let inner = self.inner.read().await;
        Ok(inner.digests.get(&(topic.name.clone(), day)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nw_core::{Candidate, Sentiment};

    fn topic() -> Topic {
        Topic {
            name: "UK".to_string(),
            display_name: "United Kingdom".to_string(),
            query: "uk".to_string(),
            prompt_context: "UK news".to_string(),
        }
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        let uk = topic();
        let day = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();

        store.init_topic(&uk).await.unwrap();
        let inserted = store
            .insert_candidates(
                &uk,
                &[NewArticle {
                    candidate: Candidate {
                        url: "https://e.com/1".to_string(),
                        title: "One".to_string(),
                        content: String::new(),
                        seendate: String::new(),
                        domain: String::new(),
                        language: String::new(),
                        sourcecountry: String::new(),
                    },
                    relevance_score: 0.5,
                    date_added: day,
                }],
            )
            .await
            .unwrap();
        let id = inserted[0].id;

        assert_eq!(store.pending_articles(&uk).await.unwrap().len(), 1);

        store
            .apply_enrichment(
                &uk,
                id,
                &Enrichment {
                    body: "body".to_string(),
                    short_title: "t".to_string(),
                    summary: "s".to_string(),
                    sentiment: Sentiment::Positive,
                },
            )
            .await
            .unwrap();

        assert!(store.pending_articles(&uk).await.unwrap().is_empty());
        assert_eq!(store.summaries_for_day(&uk, day).await.unwrap().len(), 1);
    }
}
