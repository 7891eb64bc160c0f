use std::path::Path;

use serde::Deserialize;

use crate::types::Topic;
use crate::{Error, Result};

/// The configured topic set, loaded from a JSON file of the shape
/// `{"topics": [{"name": ..., "display_name": ..., "query": ...,
/// "prompt_context": ...}]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct TopicSet {
    pub topics: Vec<Topic>,
}

impl TopicSet {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let set: TopicSet = serde_json::from_str(&raw)?;
        for topic in &set.topics {
            topic.table_ident()?;
        }
        Ok(set)
    }

    /// Looks up a topic by name. An unknown name is a configuration
    /// mistake and surfaces as a hard error.
    pub fn get(&self, name: &str) -> Result<&Topic> {
        self.topics
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| Error::Config(format!("Topic '{}' not found in configuration", name)))
    }
}

/// Credentials for the external services, passed explicitly into client
/// constructors rather than read as ambient globals.
#[derive(Clone)]
pub struct ApiConfig {
    pub cohere_api_key: String,
    pub openai_api_key: String,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("cohere_api_key", &"<redacted>")
            .field("openai_api_key", &"<redacted>")
            .finish()
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            cohere_api_key: require_env("COHERE_API_KEY")?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
        })
    }
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| Error::Config(format!("Environment variable {} is not set", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_topics(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_and_lookup() {
        let file = write_topics(
            r#"{"topics": [{"name": "UK", "display_name": "United Kingdom",
                "query": "uk politics", "prompt_context": "UK news"}]}"#,
        );
        let set = TopicSet::load(file.path()).unwrap();
        assert_eq!(set.get("UK").unwrap().query, "uk politics");
        assert!(set.get("France").is_err());
    }

    #[test]
    fn test_load_rejects_invalid_topic_name() {
        let file = write_topics(
            r#"{"topics": [{"name": "bad name", "display_name": "x",
                "query": "x", "prompt_context": "x"}]}"#,
        );
        assert!(TopicSet::load(file.path()).is_err());
    }
}
