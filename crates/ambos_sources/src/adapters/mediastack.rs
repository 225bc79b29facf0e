use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use ambos_core::{Article, ArticleSource, Error, Result};

use super::{utils, SearchQuery, SourceAdapter, SourceInfo, SourceKind};

const BASE_URL: &str = "http://api.mediastack.com/v1";

pub struct MediastackAdapter {
    access_key: String,
    http: reqwest::Client,
    base_url: String,
}

impl MediastackAdapter {
    pub fn new(access_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            http: reqwest::Client::new(),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediastackResponse {
    #[serde(default)]
    pub error: Option<MediastackError>,
    #[serde(default)]
    pub data: Vec<MediastackArticle>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediastackError {
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediastackArticle {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

pub fn map_response(response: &MediastackResponse) -> Vec<Article> {
    response
        .data
        .iter()
        .map(|raw| Article {
            title: raw.title.clone().unwrap_or_default(),
            description: raw.description.clone().unwrap_or_default(),
            // Mediastack carries no article body; the description is the
            // closest thing to content the provider exposes.
            content: raw.description.clone().unwrap_or_default(),
            url: raw.url.clone(),
            published_at: raw.published_at.unwrap_or_else(Utc::now),
            source: ArticleSource {
                name: raw.source.clone().unwrap_or_else(|| "Mediastack".to_string()),
                id: None,
                platform: None,
                country: raw.country.clone(),
            },
            author: raw.author.clone(),
            osint: None,
        })
        .collect()
}

#[async_trait]
impl SourceAdapter for MediastackAdapter {
    fn info(&self) -> SourceInfo {
        SourceInfo {
            name: "Mediastack",
            kind: SourceKind::Press,
            cli_name: "mediastack",
        }
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<Article>> {
        let limit = query.limit.to_string();
        let response = self
            .http
            .get(format!("{}/news", self.base_url))
            .query(&[
                ("access_key", self.access_key.as_str()),
                ("keywords", query.query.as_str()),
                ("languages", query.language.as_str()),
                ("limit", limit.as_str()),
                ("sort", "published_desc"),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "Mediastack error ({status}): {body}"
            )));
        }

        let payload: MediastackResponse = response.json().await?;

        // Mediastack returns errors in a 200 body.
        if let Some(error) = &payload.error {
            return match error.code.as_str() {
                "rate_limit_reached" | "usage_limit_reached" => Err(Error::RateLimited),
                code => Err(Error::Upstream(format!(
                    "Mediastack error {}: {}",
                    code,
                    error.message.clone().unwrap_or_default()
                ))),
            };
        }

        let mut articles = map_response(&payload);
        utils::apply_filter(&mut articles, query.filter.as_deref());
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "pagination": {"limit": 25, "offset": 0, "count": 1, "total": 1},
        "data": [
            {
                "author": null,
                "title": "Port strike enters second week",
                "description": "Dockworkers continue their walkout.",
                "url": "https://example.com/strike",
                "source": "example-wire",
                "category": "general",
                "language": "en",
                "country": "pt",
                "published_at": "2026-01-20T06:15:00+00:00"
            }
        ]
    }"#;

    #[test]
    fn maps_provider_fields_onto_articles() {
        let payload: MediastackResponse = serde_json::from_str(FIXTURE).unwrap();
        let articles = map_response(&payload);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].source.name, "example-wire");
        assert_eq!(articles[0].source.country.as_deref(), Some("pt"));
        assert_eq!(articles[0].content, articles[0].description);
    }

    #[test]
    fn rate_limit_marker_in_200_body_deserializes() {
        let payload: MediastackResponse = serde_json::from_str(
            r#"{"error": {"code": "rate_limit_reached", "message": "monthly quota"}}"#,
        )
        .unwrap();
        assert_eq!(payload.error.unwrap().code, "rate_limit_reached");
        assert!(payload.data.is_empty());
    }

    #[test]
    fn mapping_is_idempotent() {
        let payload: MediastackResponse = serde_json::from_str(FIXTURE).unwrap();
        assert_eq!(map_response(&payload), map_response(&payload));
    }
}
