use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Search provider error: {0}")]
    Search(String),

    #[error("Rerank error: {0}")]
    Rerank(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No summaries for topic '{topic}' on {day}")]
    NoSummaries {
        topic: String,
        day: chrono::NaiveDate,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
