use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use ambos_core::{Article, ArticleSource, Error, Result};

use super::{utils, SearchQuery, SourceAdapter, SourceInfo, SourceKind};

const BASE_URL: &str = "https://gnews.io/api/v4";

pub struct GNewsAdapter {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
}

impl GNewsAdapter {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
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
pub struct GNewsResponse {
    #[serde(default)]
    pub articles: Vec<GNewsArticle>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GNewsArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    pub url: String,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<DateTime<Utc>>,
    pub source: GNewsSourceRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GNewsSourceRef {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

pub fn map_response(response: &GNewsResponse) -> Vec<Article> {
    response
        .articles
        .iter()
        .map(|raw| Article {
            title: raw.title.clone().unwrap_or_default(),
            description: raw.description.clone().unwrap_or_default(),
            content: raw.content.clone().unwrap_or_default(),
            url: raw.url.clone(),
            published_at: raw.published_at.unwrap_or_else(Utc::now),
            source: ArticleSource {
                name: raw.source.name.clone(),
                id: raw.source.url.clone(),
                platform: None,
                country: None,
            },
            author: None,
            osint: None,
        })
        .collect()
}

#[async_trait]
impl SourceAdapter for GNewsAdapter {
    fn info(&self) -> SourceInfo {
        SourceInfo {
            name: "GNews",
            kind: SourceKind::Press,
            cli_name: "gnews",
        }
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<Article>> {
        let max = query.limit.to_string();
        let response = self
            .http
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("q", query.query.as_str()),
                ("lang", query.language.as_str()),
                ("max", max.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        // GNews signals quota exhaustion with 403 as well as 429.
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(Error::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!("GNews error ({status}): {body}")));
        }

        let payload: GNewsResponse = response.json().await?;
        let mut articles = map_response(&payload);
        utils::apply_filter(&mut articles, query.filter.as_deref());
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "totalArticles": 1,
        "articles": [
            {
                "title": "Flood warnings issued",
                "description": "Rivers rising in the north.",
                "content": "Body text...",
                "url": "https://example.com/flood",
                "image": "https://example.com/flood.jpg",
                "publishedAt": "2026-02-10T08:30:00Z",
                "source": {"name": "Example Times", "url": "https://example.com"}
            }
        ]
    }"#;

    #[test]
    fn maps_provider_fields_onto_articles() {
        let payload: GNewsResponse = serde_json::from_str(FIXTURE).unwrap();
        let articles = map_response(&payload);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].source.name, "Example Times");
        assert_eq!(articles[0].title, "Flood warnings issued");
        assert!(articles[0].osint.is_none());
    }

    #[test]
    fn mapping_is_idempotent() {
        let payload: GNewsResponse = serde_json::from_str(FIXTURE).unwrap();
        assert_eq!(map_response(&payload), map_response(&payload));
    }
}
