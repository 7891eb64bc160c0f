use std::time::Duration;

use async_trait::async_trait;
use nw_core::{Error, Extractor, Result};
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Paragraphs shorter than this are boilerplate (bylines, captions,
/// cookie banners) and skipped.
const MIN_PARAGRAPH_CHARS: usize = 40;

/// Extracted bodies shorter than this are treated as a failed extraction
/// so the record stays eligible for retry.
const MIN_BODY_CHARS: usize = 200;

/// Fetches an article page and extracts its readable body text.
///
/// Paragraphs inside `<article>` are preferred; pages without an article
/// element fall back to all `<p>` elements.
#[derive(Debug, Clone)]
pub struct PageExtractor {
    http: reqwest::Client,
}

impl PageExtractor {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http })
    }

    fn readable_text(html: &str) -> String {
        let document = Html::parse_document(html);
        let in_article = Selector::parse("article p").unwrap();
        let any_p = Selector::parse("p").unwrap();

        let mut paragraphs: Vec<String> = document
            .select(&in_article)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|p| p.len() >= MIN_PARAGRAPH_CHARS)
            .collect();

        if paragraphs.is_empty() {
            paragraphs = document
                .select(&any_p)
                .map(|el| el.text().collect::<String>().trim().to_string())
                .filter(|p| p.len() >= MIN_PARAGRAPH_CHARS)
                .collect();
        }

        paragraphs.join("\n\n")
    }
}

#[async_trait]
impl Extractor for PageExtractor {
    async fn extract(&self, url: &str) -> Result<String> {
        Url::parse(url).map_err(|e| Error::Extraction(format!("Invalid URL '{}': {}", url, e)))?;

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Extraction(format!(
                "Fetch of {} returned status {}",
                url, status
            )));
        }
        let html = response.text().await?;

        let body = Self::readable_text(&html);
        if body.len() < MIN_BODY_CHARS {
            return Err(Error::Extraction(format!(
                "No readable body found at {}",
                url
            )));
        }

        debug!(url, chars = body.len(), "Extracted article body");
        Ok(body)
    }
}
