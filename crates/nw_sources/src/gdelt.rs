use std::time::Duration;

use async_trait::async_trait;
use nw_core::{Candidate, Error, Result, SearchProvider};
use serde::Deserialize;
use tracing::{debug, info};

const DEFAULT_ENDPOINT: &str = "https://api.gdeltproject.org/api/v2/doc/doc";
const MAX_RECORDS: u32 = 75;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Article-list item as returned by the GDELT Doc API. Everything except
/// the title is optional on the wire.
#[derive(Debug, Deserialize)]
struct GdeltArticle {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    seendate: String,
    #[serde(default)]
    domain: String,
    #[serde(default)]
    language: String,
    #[serde(default)]
    sourcecountry: String,
}

#[derive(Debug, Deserialize)]
struct GdeltResponse {
    #[serde(default)]
    articles: Vec<GdeltArticle>,
}

/// Client for the GDELT Doc API article search.
#[derive(Debug, Clone)]
pub struct GdeltClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GdeltClient {
    pub fn new() -> Result<Self> {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl SearchProvider for GdeltClient {
    async fn search(&self, query: &str) -> Result<Vec<Candidate>> {
        let max_records = MAX_RECORDS.to_string();
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("query", query),
                ("mode", "artlist"),
                ("format", "json"),
                ("sort", "hybridrel"),
                ("maxrecords", max_records.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Search(format!(
                "GDELT returned status {} for query '{}'",
                status, query
            )));
        }

        let parsed: GdeltResponse = response.json().await?;
        debug!(count = parsed.articles.len(), "Fetched GDELT article list");

        // Items without a title are invalid candidates and dropped here.
        let candidates: Vec<Candidate> = parsed
            .articles
            .into_iter()
            .filter(|a| !a.title.trim().is_empty())
            .map(|a| Candidate {
                url: a.url,
                title: a.title,
                content: a.content,
                seendate: a.seendate,
                domain: a.domain,
                language: a.language,
                sourcecountry: a.sourcecountry,
            })
            .collect();

        info!(query, count = candidates.len(), "GDELT search completed");
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_article_list() {
        let raw = r#"{
            "articles": [
                {"url": "https://a.example/1", "title": "Summit opens",
                 "seendate": "20250101T120000Z", "domain": "a.example",
                 "language": "English", "sourcecountry": "UK"},
                {"url": "https://a.example/2", "title": ""},
                {"url": "https://a.example/3"}
            ]
        }"#;
        let parsed: GdeltResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.articles.len(), 3);

        let titled: Vec<_> = parsed
            .articles
            .iter()
            .filter(|a| !a.title.trim().is_empty())
            .collect();
        assert_eq!(titled.len(), 1);
        assert_eq!(titled[0].domain, "a.example");
    }

    #[test]
    fn test_parse_empty_response() {
        let parsed: GdeltResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.articles.is_empty());
    }
}
