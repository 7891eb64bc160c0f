pub mod cohere;
pub mod openai;

pub use cohere::CohereClient;
pub use openai::OpenAiClient;

pub mod prelude {
    pub use super::{CohereClient, OpenAiClient};
    pub use nw_core::{ArticleSummary, Error, Result, Sentiment};
}
