use std::env;
use std::path::PathBuf;

use crate::{Error, Result};

/// Application configuration loaded from environment variables.
///
/// Provider keys are optional: adapters are only constructed for the
/// credentials present. The AI gateway key is checked with
/// [`Config::require_gateway_key`] before any enrichment/analysis call so a
/// missing credential fails fast instead of surfacing as an auth error.
#[derive(Debug, Clone, Default)]
pub struct Config {
    // AI gateway
    pub openrouter_api_key: Option<String>,
    pub openrouter_model: String,

    // Search providers
    pub newsapi_key: Option<String>,
    pub gnews_key: Option<String>,
    pub mediastack_key: Option<String>,
    pub gopher_key: Option<String>,
    pub mastodon_base_url: Option<String>,
    pub rss_feeds: Vec<String>,

    // Web server
    pub web_host: String,
    pub web_port: u16,

    /// Directory for persisted dashboard layouts; in-memory when unset.
    pub data_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let web_port = env::var("WEB_PORT").unwrap_or_else(|_| "3000".to_string());
        let web_port = web_port
            .parse()
            .map_err(|_| Error::Config("WEB_PORT must be a number".to_string()))?;

        Ok(Self {
            openrouter_api_key: optional_env("OPENROUTER_API_KEY"),
            openrouter_model: env::var("OPENROUTER_MODEL")
                .unwrap_or_else(|_| "openai/gpt-4o-mini".to_string()),
            newsapi_key: optional_env("NEWSAPI_KEY"),
            gnews_key: optional_env("GNEWS_KEY"),
            mediastack_key: optional_env("MEDIASTACK_KEY"),
            gopher_key: optional_env("GOPHER_KEY"),
            mastodon_base_url: optional_env("MASTODON_BASE_URL"),
            rss_feeds: optional_env("RSS_FEEDS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port,
            data_dir: optional_env("DATA_DIR").map(PathBuf::from),
        })
    }

    /// The gateway credential, or a fail-fast configuration error.
    pub fn require_gateway_key(&self) -> Result<&str> {
        self.openrouter_api_key
            .as_deref()
            .ok_or_else(|| Error::Config("OPENROUTER_API_KEY environment variable is required".to_string()))
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_gateway_key_is_a_config_error() {
        let config = Config::default();
        let err = config.require_gateway_key().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn gateway_key_round_trips() {
        let config = Config {
            openrouter_api_key: Some("sk-or-test".to_string()),
            ..Config::default()
        };
        assert_eq!(config.require_gateway_key().unwrap(), "sk-or-test");
    }
}
