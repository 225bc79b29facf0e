use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use ambos_core::{
    credibility, Article, ArticleSource, Engagement, Error, OsintMetadata, Platform, PostSignals,
    Result,
};

use super::{utils, SearchQuery, SourceAdapter, SourceInfo, SourceKind};

const DEFAULT_INSTANCE: &str = "https://mastodon.social";

pub struct MastodonAdapter {
    http: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl MastodonAdapter {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_INSTANCE.to_string()),
            access_token: None,
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MastodonSearchResponse {
    #[serde(default)]
    pub statuses: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MastodonStatus {
    pub url: Option<String>,
    pub uri: String,
    /// Status body, as HTML.
    #[serde(default)]
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub favourites_count: u32,
    #[serde(default)]
    pub reblogs_count: u32,
    #[serde(default)]
    pub replies_count: u32,
    pub account: MastodonAccount,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MastodonAccount {
    pub acct: String,
    #[serde(default)]
    pub display_name: String,
    /// Profile bio, as HTML.
    #[serde(default)]
    pub note: String,
    pub created_at: Option<DateTime<Utc>>,
}

pub fn map_status(raw: &serde_json::Value, now: DateTime<Utc>) -> Option<Article> {
    let status: MastodonStatus = serde_json::from_value(raw.clone()).ok()?;

    let text = utils::strip_html(&status.content);
    let signals = PostSignals {
        likes: status.favourites_count,
        reposts: status.reblogs_count,
        replies: status.replies_count,
        verified: false,
        has_profile_bio: !utils::strip_html(&status.account.note).trim().is_empty(),
        account_age_days: status
            .account
            .created_at
            .map(|created| (now - created).num_days()),
        text_chars: text.chars().count(),
    };
    let (credibility_score, credibility_factors) = credibility::score(&signals);

    let author_name = if status.account.display_name.trim().is_empty() {
        status.account.acct.clone()
    } else {
        status.account.display_name.clone()
    };

    Some(Article {
        title: utils::truncate_chars(&text, 80).to_string(),
        description: text.clone(),
        content: text,
        url: status.url.clone().unwrap_or_else(|| status.uri.clone()),
        published_at: status.created_at.unwrap_or(now),
        source: ArticleSource {
            name: "Mastodon".to_string(),
            id: Some(status.account.acct.clone()),
            platform: Some(Platform::Mastodon.as_str().to_string()),
            country: None,
        },
        author: Some(author_name),
        osint: Some(OsintMetadata {
            platform: Platform::Mastodon,
            credibility_score,
            credibility_factors,
            engagement: Engagement {
                likes: status.favourites_count,
                reposts: status.reblogs_count,
                replies: status.replies_count,
            },
            verified: false,
            original_post: Some(raw.clone()),
        }),
    })
}

pub fn map_response(response: &MastodonSearchResponse, now: DateTime<Utc>) -> Vec<Article> {
    response
        .statuses
        .iter()
        .filter_map(|raw| {
            let article = map_status(raw, now);
            if article.is_none() {
                warn!("skipping malformed Mastodon status payload");
            }
            article
        })
        .collect()
}

#[async_trait]
impl SourceAdapter for MastodonAdapter {
    fn info(&self) -> SourceInfo {
        SourceInfo {
            name: "Mastodon",
            kind: SourceKind::Social,
            cli_name: "mastodon",
        }
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<Article>> {
        let limit = query.limit.to_string();
        let mut request = self
            .http
            .get(format!("{}/api/v2/search", self.base_url))
            .query(&[
                ("q", query.query.as_str()),
                ("type", "statuses"),
                ("limit", limit.as_str()),
            ]);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "Mastodon error ({status}): {body}"
            )));
        }

        let payload: MastodonSearchResponse = response.json().await?;
        let mut articles = map_response(&payload, Utc::now());
        utils::apply_filter(&mut articles, query.filter.as_deref());
        Ok(articles)
    }
}
