use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use nw_core::{
    ArticleRecord, DailySummary, Digest, Enrichment, Error, NewArticle, PendingArticle, Result,
    Sentiment, Topic, WatchStore,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::info;

const MIGRATIONS: &[&str] = &[
    // One shared digest table; the (country, date_added) key makes
    // INSERT OR REPLACE a true upsert.
    r#"
    CREATE TABLE IF NOT EXISTS watchlist (
        country TEXT NOT NULL,
        date_added TEXT NOT NULL,
        watchlist TEXT NOT NULL,
        urls_used TEXT NOT NULL,
        PRIMARY KEY (country, date_added)
    )
    "#,
];

/// SQLite-backed [`WatchStore`]. Article records live in one table per
/// topic; table names come only from validated topic identifiers.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| Error::Storage(format!("Failed to open database: {}", e)))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Storage(format!("Failed to run migration {}: {}", i, e)))?;
        }

        info!(path = %db_path.display(), "Opened watch store");
        Ok(Self { pool })
    }

    fn row_to_record(row: &SqliteRow) -> Result<ArticleRecord> {
        let date_added: String = row.get("date_added");
        let date_added = NaiveDate::from_str(&date_added)
            .map_err(|e| Error::Storage(format!("Bad date_added value: {}", e)))?;

        let body: Option<String> = row.get("news_body");
        let short_title: Option<String> = row.get("short_title_en");
        let summary: Option<String> = row.get("summary_en");
        let sentiment: Option<String> = row.get("sentiment");
        let enrichment = match (body, short_title, summary, sentiment) {
            (Some(body), Some(short_title), Some(summary), Some(sentiment)) => Some(Enrichment {
                body,
                short_title,
                summary,
                sentiment: Sentiment::from_str(&sentiment)
                    .map_err(|e| Error::Storage(format!("Bad sentiment value: {}", e)))?,
            }),
            _ => None,
        };

        Ok(ArticleRecord {
            id: row.get("id"),
            url: row.get("url"),
            title: row.get("title"),
            content: row.get("content"),
            seendate: row.get("seendate"),
            domain: row.get("domain"),
            language: row.get("language"),
            sourcecountry: row.get("sourcecountry"),
            relevance_score: row.get("relevance_score"),
            date_added,
            enrichment,
        })
    }
}

#[async_trait]
impl WatchStore for SqliteStore {
    async fn init_topic(&self, topic: &Topic) -> Result<()> {
        let table = topic.table_ident()?;
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                url TEXT NOT NULL,
                title TEXT NOT NULL,
                content TEXT,
                seendate TEXT,
                domain TEXT,
                language TEXT,
                sourcecountry TEXT,
                relevance_score REAL,
                date_added TEXT NOT NULL,
                news_body TEXT,
                short_title_en TEXT,
                summary_en TEXT,
                sentiment TEXT
            )
            "#
        );
        sqlx::query(&ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Storage(format!("Failed to create table {}: {}", table, e)))?;
        Ok(())
    }

    async fn insert_candidates(
        &self,
        topic: &Topic,
        articles: &[NewArticle],
    ) -> Result<Vec<ArticleRecord>> {
        let table = topic.table_ident()?;
        let sql = format!(
            r#"
            INSERT INTO {table}
            (url, title, content, seendate, domain, language, sourcecountry,
             relevance_score, date_added)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#
        );

        let mut inserted = Vec::with_capacity(articles.len());
        for article in articles {
            let c = &article.candidate;
            let result = sqlx::query(&sql)
                .bind(&c.url)
                .bind(&c.title)
                .bind(&c.content)
                .bind(&c.seendate)
                .bind(&c.domain)
                .bind(&c.language)
                .bind(&c.sourcecountry)
                .bind(article.relevance_score)
                .bind(article.date_added.to_string())
                .execute(&self.pool)
                .await
                .map_err(|e| Error::Storage(format!("Failed to insert article: {}", e)))?;

            inserted.push(ArticleRecord {
                id: result.last_insert_rowid(),
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
        Ok(inserted)
    }

    async fn article(&self, topic: &Topic, id: i64) -> Result<Option<ArticleRecord>> {
        let table = topic.table_ident()?;
        let sql = format!("SELECT * FROM {table} WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::Storage(format!("Failed to fetch article {}: {}", id, e)))?;
        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn pending_articles(&self, topic: &Topic) -> Result<Vec<PendingArticle>> {
        let table = topic.table_ident()?;
        let sql = format!("SELECT id, url FROM {table} WHERE news_body IS NULL ORDER BY id");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::Storage(format!("Failed to list pending articles: {}", e)))?;

        Ok(rows
            .iter()
            .map(|row| PendingArticle {
                id: row.get("id"),
                url: row.get("url"),
            })
            .collect())
    }

    async fn apply_enrichment(
        &self,
        topic: &Topic,
        id: i64,
        enrichment: &Enrichment,
    ) -> Result<()> {
        let table = topic.table_ident()?;
        let sql = format!(
            r#"
            UPDATE {table}
            SET news_body = ?,
                short_title_en = ?,
                summary_en = ?,
                sentiment = ?
            WHERE id = ?
            "#
        );
        sqlx::query(&sql)
            .bind(&enrichment.body)
            .bind(&enrichment.short_title)
            .bind(&enrichment.summary)
            .bind(enrichment.sentiment.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Storage(format!("Failed to enrich article {}: {}", id, e)))?;
        Ok(())
    }

    async fn summaries_for_day(&self, topic: &Topic, day: NaiveDate) -> Result<Vec<DailySummary>> {
        let table = topic.table_ident()?;
        // MIN(id) per URL keeps the first-inserted row for duplicates.
        let sql = format!(
            r#"
            SELECT MIN(id) AS id, url, summary_en
            FROM {table}
            WHERE date_added = ? AND summary_en IS NOT NULL
            GROUP BY url
            ORDER BY id
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(day.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::Storage(format!("Failed to list summaries: {}", e)))?;

        Ok(rows
            .iter()
            .map(|row| DailySummary {
                id: row.get("id"),
                url: row.get("url"),
                summary: row.get("summary_en"),
            })
            .collect())
    }

    async fn upsert_digest(&self, digest: &Digest) -> Result<()> {
        let urls = serde_json::to_string(&digest.urls)?;
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO watchlist (country, date_added, watchlist, urls_used)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&digest.topic)
        .bind(digest.day.to_string())
        .bind(&digest.watchlist)
        .bind(&urls)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Storage(format!("Failed to upsert digest: {}", e)))?;
        Ok(())
    }

    async fn digest_for(&self, topic: &Topic, day: NaiveDate) -> Result<Option<Digest>> {
        let row = sqlx::query(
            r#"
            SELECT watchlist, urls_used FROM watchlist
            WHERE country = ? AND date_added = ?
            "#,
        )
        .bind(&topic.name)
        .bind(day.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Storage(format!("Failed to fetch digest: {}", e)))?;

        row.map(|row| {
            let urls: Vec<String> = serde_json::from_str(row.get("urls_used"))?;
            Ok(Digest {
                topic: topic.name.clone(),
                day,
                watchlist: row.get("watchlist"),
                urls,
            })
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nw_core::Candidate;
    use tempfile::tempdir;

    fn topic(name: &str) -> Topic {
        Topic {
            name: name.to_string(),
            display_name: name.to_string(),
            query: "test".to_string(),
            prompt_context: "test".to_string(),
        }
    }

    fn new_article(url: &str, title: &str, day: NaiveDate) -> NewArticle {
        NewArticle {
            candidate: Candidate {
                url: url.to_string(),
                title: title.to_string(),
                content: String::new(),
                seendate: String::new(),
                domain: "example.com".to_string(),
                language: "English".to_string(),
                sourcecountry: "UK".to_string(),
            },
            relevance_score: 0.9,
            date_added: day,
        }
    }

    fn enrichment(summary: &str) -> Enrichment {
        Enrichment {
            body: "full body text".to_string(),
            short_title: "short".to_string(),
            summary: summary.to_string(),
            sentiment: Sentiment::Neutral,
        }
    }

    async fn open_store(dir: &tempfile::TempDir) -> SqliteStore {
        SqliteStore::open(&dir.path().join("test.db")).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_pending_round_trip() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir).await;
        let uk = topic("UK");
        let day = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();

        store.init_topic(&uk).await.unwrap();
        let inserted = store
            .insert_candidates(
                &uk,
                &[
                    new_article("https://e.com/1", "One", day),
                    new_article("https://e.com/2", "Two", day),
                ],
            )
            .await
            .unwrap();
        assert_eq!(inserted.len(), 2);
        assert!(inserted.iter().all(|r| r.enrichment.is_none()));

        let pending = store.pending_articles(&uk).await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].url, "https://e.com/1");
    }

    #[tokio::test]
    async fn test_enrichment_is_all_or_nothing_and_idempotent_input_set() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir).await;
        let uk = topic("UK");
        let day = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();

        store.init_topic(&uk).await.unwrap();
        let inserted = store
            .insert_candidates(&uk, &[new_article("https://e.com/1", "One", day)])
            .await
            .unwrap();
        let id = inserted[0].id;

        let before = store.article(&uk, id).await.unwrap().unwrap();
        assert!(before.enrichment.is_none());

        store
            .apply_enrichment(&uk, id, &enrichment("summary text"))
            .await
            .unwrap();

        let after = store.article(&uk, id).await.unwrap().unwrap();
        let enriched = after.enrichment.expect("all enrichment fields set");
        assert_eq!(enriched.summary, "summary text");
        assert_eq!(enriched.sentiment, Sentiment::Neutral);

        // Enriched records leave the pending set, so a second
        // summarization run has nothing to mutate.
        assert!(store.pending_articles(&uk).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_summaries_for_day_dedups_urls_in_order() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir).await;
        let uk = topic("UK");
        let day = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let other_day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        store.init_topic(&uk).await.unwrap();
        let inserted = store
            .insert_candidates(
                &uk,
                &[
                    new_article("https://e.com/1", "One", day),
                    new_article("https://e.com/2", "Two", day),
                    new_article("https://e.com/1", "One again", day),
                    new_article("https://e.com/3", "Old", other_day),
                ],
            )
            .await
            .unwrap();
        for (i, record) in inserted.iter().enumerate() {
            store
                .apply_enrichment(&uk, record.id, &enrichment(&format!("s{}", i)))
                .await
                .unwrap();
        }

        let summaries = store.summaries_for_day(&uk, day).await.unwrap();
        let urls: Vec<&str> = summaries.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls, vec!["https://e.com/1", "https://e.com/2"]);
        // First occurrence of the duplicated URL wins.
        assert_eq!(summaries[0].summary, "s0");
    }

    #[tokio::test]
    async fn test_digest_upsert_replaces_prior_row() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir).await;
        let uk = topic("UK");
        let day = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();

        let first = Digest {
            topic: "UK".to_string(),
            day,
            watchlist: "first narrative".to_string(),
            urls: vec!["https://e.com/1".to_string()],
        };
        store.upsert_digest(&first).await.unwrap();

        let second = Digest {
            watchlist: "second narrative".to_string(),
            urls: vec!["https://e.com/1".to_string(), "https://e.com/2".to_string()],
            ..first.clone()
        };
        store.upsert_digest(&second).await.unwrap();

        let stored = store.digest_for(&uk, day).await.unwrap().unwrap();
        assert_eq!(stored.watchlist, "second narrative");
        assert_eq!(stored.urls.len(), 2);

        // A different day is a different key.
        let other_day = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
        assert!(store.digest_for(&uk, other_day).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_topic_name_is_rejected() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir).await;
        let bad = topic("UK; DROP TABLE watchlist");
        assert!(matches!(
            store.init_topic(&bad).await,
            Err(Error::Config(_))
        ));
    }
}
