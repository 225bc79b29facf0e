use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use ambos_core::{Article, ArticleSource, Error, Result};

use super::{utils, SearchQuery, SourceAdapter, SourceInfo, SourceKind};

const BASE_URL: &str = "https://newsapi.org/v2";

pub struct NewsApiAdapter {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
}

impl NewsApiAdapter {
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
pub struct NewsApiResponse {
    pub status: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsApiArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    pub url: String,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub author: Option<String>,
    pub source: NewsApiSourceRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsApiSourceRef {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

/// Pure mapping from a NewsAPI payload onto canonical articles.
pub fn map_response(response: &NewsApiResponse) -> Vec<Article> {
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
                id: raw.source.id.clone(),
                platform: None,
                country: None,
            },
            author: raw.author.clone(),
            osint: None,
        })
        .collect()
}

#[async_trait]
impl SourceAdapter for NewsApiAdapter {
    fn info(&self) -> SourceInfo {
        SourceInfo {
            name: "NewsAPI",
            kind: SourceKind::Press,
            cli_name: "newsapi",
        }
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<Article>> {
        let page_size = query.limit.to_string();
        let response = self
            .http
            .get(format!("{}/everything", self.base_url))
            .query(&[
                ("q", query.query.as_str()),
                ("language", query.language.as_str()),
                ("pageSize", page_size.as_str()),
                ("sortBy", "publishedAt"),
            ])
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!("NewsAPI error ({status}): {body}")));
        }

        let payload: NewsApiResponse = response.json().await?;

        // NewsAPI reports some failures inside a 200 body.
        if payload.status == "error" {
            return match payload.code.as_deref() {
                Some("rateLimited") => Err(Error::RateLimited),
                _ => Err(Error::Upstream(format!(
                    "NewsAPI error: {}",
                    payload.message.unwrap_or_default()
                ))),
            };
        }

        let mut articles = map_response(&payload);
        utils::apply_filter(&mut articles, query.filter.as_deref());
        Ok(articles)
    }
}
