pub mod config;
pub mod error;
pub mod inference;
pub mod search;
pub mod storage;
pub mod types;

pub use config::{ApiConfig, TopicSet};
pub use error::Error;
pub use inference::{Summarizer, Synthesizer};
pub use search::{Extractor, Reranker, SearchProvider};
pub use storage::WatchStore;
pub use types::{
    ArticleRecord, ArticleSummary, Candidate, DailySummary, Digest, Enrichment, NewArticle,
    PendingArticle, RankedDoc, Sentiment, Topic,
};

pub type Result<T> = std::result::Result<T, Error>;
