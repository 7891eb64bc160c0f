use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use nw_core::{ArticleSummary, Error, Result, Summarizer, Synthesizer, Topic};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const MODEL: &str = "gpt-4o-mini";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const SUMMARY_MAX_TOKENS: u32 = 700;
const SUMMARY_TEMPERATURE: f64 = 0.7;
const WATCHLIST_MAX_TOKENS: u32 = 6000;
const WATCHLIST_TEMPERATURE: f64 = 0.45;

#[derive(Debug, Deserialize)]
struct WatchlistArgs {
    watchlist: String,
}

/// OpenAI chat-completions client used for both per-article summarization
/// and per-topic watchlist synthesis. Structured output is requested
/// through a function-calling tool schema; anything that does not come
/// back as a well-formed tool call is an inference error.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl OpenAiClient {
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_endpoint(api_key, DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(api_key: &str, endpoint: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
            endpoint: endpoint.to_string(),
        })
    }

    async fn call_tool(&self, payload: Value) -> Result<String> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Inference(format!(
                "Completion request returned status {}",
                status
            )));
        }

        let body: Value = response.json().await?;
        let arguments = body
            .pointer("/choices/0/message/tool_calls/0/function/arguments")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::Inference("Completion response carries no tool call".to_string())
            })?;
        Ok(arguments.to_string())
    }

    /// Parses tool-call arguments into the expected shape. The upstream
    /// model occasionally returns `{"error": ...}` in place of the schema;
    /// that is rejected here so it can never reach the store.
    fn parse_arguments<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| Error::Inference(format!("Tool arguments are not JSON: {}", e)))?;
        if let Some(err) = value.get("error") {
            return Err(Error::Inference(format!(
                "Model returned error payload: {}",
                err
            )));
        }
        serde_json::from_value(value)
            .map_err(|e| Error::Inference(format!("Tool arguments do not match schema: {}", e)))
    }

    fn summary_payload(topic: &Topic, body: &str) -> Value {
        json!({
            "model": MODEL,
            "max_tokens": SUMMARY_MAX_TOKENS,
            "temperature": SUMMARY_TEMPERATURE,
            "messages": [{
                "role": "user",
                "content": format!(
                    "You receive news articles. They are centered around the {}. Your task is to summarise: {}",
                    topic.prompt_context, body
                ),
            }],
            "tools": [{
                "type": "function",
                "function": {
                    "name": "Summarizer",
                    "description": "You are a news summariser in english. Your summaries should directly address the key points of the news article. Just write the summary. No need for intro sentences like 'this article talks about...'. You are summarising as if you write that news article. Not as a third person.",
                    "parameters": {
                        "type": "object",
                        "properties": {
                            "short_title_en": {"type": "string", "description": "short title in english"},
                            "summary_en": {"type": "string", "description": "4-5 sentence summary in english"},
                            "sentiment": {"type": "string", "description": "sentiment of the news summary (positive, negative, or neutral)"}
                        },
                        "required": ["short_title_en", "summary_en", "sentiment"]
                    }
                }
            }],
        })
    }

    fn watchlist_payload(topic: &Topic, combined: &str) -> Value {
        json!({
            "model": MODEL,
            "max_tokens": WATCHLIST_MAX_TOKENS,
            "temperature": WATCHLIST_TEMPERATURE,
            "messages": [{
                "role": "user",
                "content": format!(
                    "Summarize the key points from these news summaries about {}: {}",
                    topic.display_name, combined
                ),
            }],
            "tools": [{
                "type": "function",
                "function": {
                    "name": "WatchlistGenerator",
                    "description": "Generate BBC news monitoring style executive summary of the major and most important points from multiple news summaries.",
                    "parameters": {
                        "type": "object",
                        "properties": {
                            "watchlist": {"type": "string", "description": "1-2 pager (3-6 paragraphs) well structured, not markdown, no lists, no numbered points, just a narrative flow executive summary. Priority order:Geopolitical, economic, and military points, local politics."}
                        },
                        "required": ["watchlist"]
                    }
                }
            }],
        })
    }
}

#[async_trait]
impl Summarizer for OpenAiClient {
    async fn summarize(&self, topic: &Topic, body: &str) -> Result<ArticleSummary> {
        let raw = self.call_tool(Self::summary_payload(topic, body)).await?;
        let summary: ArticleSummary = Self::parse_arguments(&raw)?;
        debug!(topic = %topic.name, title = %summary.short_title_en, "Article summarized");
        Ok(summary)
    }
}

#[async_trait]
impl Synthesizer for OpenAiClient {
    async fn synthesize(&self, topic: &Topic, combined: &str) -> Result<String> {
        let raw = self
            .call_tool(Self::watchlist_payload(topic, combined))
            .await?;
        let args: WatchlistArgs = Self::parse_arguments(&raw)?;
        debug!(topic = %topic.name, chars = args.watchlist.len(), "Watchlist synthesized");
        Ok(args.watchlist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nw_core::Sentiment;

    #[test]
    fn test_parse_summary_arguments() {
        let raw = r#"{"short_title_en": "Talks resume",
                      "summary_en": "Negotiators met again today.",
                      "sentiment": "neutral"}"#;
        let summary: ArticleSummary = OpenAiClient::parse_arguments(raw).unwrap();
        assert_eq!(summary.short_title_en, "Talks resume");
        assert_eq!(summary.sentiment, Sentiment::Neutral);
    }

    #[test]
    fn test_error_payload_is_rejected() {
        let raw = r#"{"error": "Invalid JSON response from upstream"}"#;
        let result: Result<ArticleSummary> = OpenAiClient::parse_arguments(raw);
        assert!(matches!(result, Err(Error::Inference(_))));
    }

    #[test]
    fn test_malformed_arguments_are_rejected() {
        let result: Result<WatchlistArgs> = OpenAiClient::parse_arguments("{\"watchlist\": 3}");
        assert!(result.is_err());
        let result: Result<WatchlistArgs> = OpenAiClient::parse_arguments("not json");
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let raw = r#"{"short_title_en": "t", "summary_en": "s"}"#;
        let result: Result<ArticleSummary> = OpenAiClient::parse_arguments(raw);
        assert!(matches!(result, Err(Error::Inference(_))));
    }
}
