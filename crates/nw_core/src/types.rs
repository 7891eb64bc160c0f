use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A named subject of interest driving discovery and summarization.
///
/// Topics are defined by static configuration and read-only at runtime.
/// `name` doubles as the per-topic table identifier in storage, so it is
/// restricted to `[A-Za-z][A-Za-z0-9_]*`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    pub display_name: String,
    /// Query string sent to the search provider.
    pub query: String,
    /// Context prepended to per-article summarization prompts.
    pub prompt_context: String,
}

impl Topic {
    /// Returns the topic name if it is safe to use as a storage identifier.
    pub fn table_ident(&self) -> Result<&str> {
        let mut chars = self.name.chars();
        let valid = match chars.next() {
            Some(c) if c.is_ascii_alphabetic() => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        };
        if valid {
            Ok(&self.name)
        } else {
            Err(Error::Config(format!(
                "Topic name '{}' is not a valid identifier",
                self.name
            )))
        }
    }
}

/// A raw item returned by the search provider, before persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub seendate: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub sourcecountry: String,
}

/// Sentiment label attached to a generated summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl std::str::FromStr for Sentiment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            other => Err(Error::Inference(format!(
                "Unknown sentiment label: {}",
                other
            ))),
        }
    }
}

/// Structured output of the per-article summarizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub short_title_en: String,
    pub summary_en: String,
    pub sentiment: Sentiment,
}

/// The all-or-nothing group of derived fields added after discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrichment {
    pub body: String,
    pub short_title: String,
    pub summary: String,
    pub sentiment: Sentiment,
}

/// A persisted unit of work: one discovered item plus its enrichment.
///
/// The enrichment group is a single `Option`, so a record is either fully
/// enriched or not at all. A record is pending summarization exactly when
/// `enrichment` is `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub content: String,
    pub seendate: String,
    pub domain: String,
    pub language: String,
    pub sourcecountry: String,
    pub relevance_score: f64,
    pub date_added: NaiveDate,
    pub enrichment: Option<Enrichment>,
}

/// A record as produced by Discovery, before the store assigns an id.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub candidate: Candidate,
    pub relevance_score: f64,
    pub date_added: NaiveDate,
}

/// An article awaiting summarization: identity and where to fetch it from.
#[derive(Debug, Clone)]
pub struct PendingArticle {
    pub id: i64,
    pub url: String,
}

/// One enriched article as seen by Aggregation.
#[derive(Debug, Clone)]
pub struct DailySummary {
    pub id: i64,
    pub url: String,
    pub summary: String,
}

/// One (index, score) entry from the semantic reranker. `index` refers to
/// the caller's document list.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RankedDoc {
    pub index: usize,
    pub relevance_score: f64,
}

/// The per-topic, per-day narrative synthesized from article summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Digest {
    pub topic: String,
    pub day: NaiveDate,
    pub watchlist: String,
    /// Source URLs the narrative was built from, in summary order.
    pub urls: Vec<String>,
}
