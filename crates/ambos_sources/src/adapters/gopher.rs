use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use ambos_core::{
    credibility, Article, ArticleSource, Engagement, Error, OsintMetadata, Platform, PostSignals,
    Result,
};

use super::{utils, SearchQuery, SourceAdapter, SourceInfo, SourceKind};

const BASE_URL: &str = "https://data.gopher-ai.com/api/v1";

/// Twitter/X search through the Gopher data gateway.
pub struct GopherAdapter {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
}

impl GopherAdapter {
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
pub struct GopherResponse {
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
}

/// The Gopher gateway is loose about optional metadata; every field except
/// the tweet body tolerates absence.
#[derive(Debug, Clone, Deserialize)]
pub struct GopherTweet {
    #[serde(rename = "ID", alias = "id")]
    pub id: String,
    #[serde(rename = "Content", alias = "Text", alias = "content")]
    pub content: String,
    #[serde(rename = "Metadata", alias = "metadata", default)]
    pub metadata: Option<GopherTweetMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GopherTweetMetadata {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub public_metrics: GopherPublicMetrics,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GopherPublicMetrics {
    #[serde(rename = "LikeCount", alias = "like_count", default)]
    pub like_count: u32,
    #[serde(rename = "RetweetCount", alias = "retweet_count", default)]
    pub retweet_count: u32,
    #[serde(rename = "ReplyCount", alias = "reply_count", default)]
    pub reply_count: u32,
}

pub fn map_tweet(raw: &serde_json::Value, now: DateTime<Utc>) -> Option<Article> {
    let tweet: GopherTweet = serde_json::from_value(raw.clone()).ok()?;
    let metadata = tweet.metadata.clone().unwrap_or_default();
    let metrics = metadata.public_metrics.clone();

    let signals = PostSignals {
        likes: metrics.like_count,
        reposts: metrics.retweet_count,
        replies: metrics.reply_count,
        verified: metadata.verified,
        has_profile_bio: false,
        account_age_days: None,
        text_chars: tweet.content.chars().count(),
    };
    let (credibility_score, credibility_factors) = credibility::score(&signals);

    let username = metadata.username.clone().unwrap_or_else(|| "i".to_string());
    let url = format!("https://twitter.com/{}/status/{}", username, tweet.id);

    Some(Article {
        title: utils::truncate_chars(&tweet.content, 80).to_string(),
        description: tweet.content.clone(),
        content: tweet.content.clone(),
        url,
        published_at: metadata.created_at.unwrap_or(now),
        source: ArticleSource {
            name: "Twitter".to_string(),
            id: metadata.username.clone(),
            platform: Some(Platform::Twitter.as_str().to_string()),
            country: None,
        },
        author: Some(metadata.username.unwrap_or_else(|| "Unknown".to_string())),
        osint: Some(OsintMetadata {
            platform: Platform::Twitter,
            credibility_score,
            credibility_factors,
            engagement: Engagement {
                likes: metrics.like_count,
                reposts: metrics.retweet_count,
                replies: metrics.reply_count,
            },
            verified: metadata.verified,
            original_post: Some(raw.clone()),
        }),
    })
}

pub fn map_response(response: &GopherResponse, now: DateTime<Utc>) -> Vec<Article> {
    response
        .data
        .iter()
        .filter_map(|raw| {
            let article = map_tweet(raw, now);
            if article.is_none() {
                warn!("skipping malformed Gopher tweet payload");
            }
            article
        })
        .collect()
}

#[async_trait]
impl SourceAdapter for GopherAdapter {
    fn info(&self) -> SourceInfo {
        SourceInfo {
            name: "Twitter (Gopher)",
            kind: SourceKind::Social,
            cli_name: "twitter",
        }
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<Article>> {
        let body = json!({
            "type": "twitter",
            "arguments": {
                "query": query.query,
                "max_results": query.limit,
            }
        });

        let response = self
            .http
            .post(format!("{}/search/live/twitter", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited);
        }
        if status == reqwest::StatusCode::PAYMENT_REQUIRED {
            return Err(Error::PaymentRequired);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!("Gopher error ({status}): {body}")));
        }

        let payload: GopherResponse = response.json().await?;
        let mut articles = map_response(&payload, Utc::now());
        utils::apply_filter(&mut articles, query.filter.as_deref());
        Ok(articles)
    }
}
