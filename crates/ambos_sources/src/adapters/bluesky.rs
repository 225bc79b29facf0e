use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use ambos_core::{
    credibility, Article, ArticleSource, Engagement, Error, OsintMetadata, Platform, PostSignals,
    Result,
};

use super::{utils, SearchQuery, SourceAdapter, SourceInfo, SourceKind};

const BASE_URL: &str = "https://public.api.bsky.app";

pub struct BlueskyAdapter {
    http: reqwest::Client,
    base_url: String,
}

impl BlueskyAdapter {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

impl Default for BlueskyAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchPostsResponse {
    #[serde(default)]
    pub posts: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlueskyPost {
    pub uri: String,
    pub author: BlueskyAuthor,
    pub record: BlueskyRecord,
    #[serde(rename = "likeCount", default)]
    pub like_count: u32,
    #[serde(rename = "repostCount", default)]
    pub repost_count: u32,
    #[serde(rename = "replyCount", default)]
    pub reply_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlueskyAuthor {
    pub handle: String,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlueskyRecord {
    #[serde(default)]
    pub text: String,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Rewrite an `at://` record URI into a public post URL.
fn post_url(uri: &str, handle: &str) -> String {
    match uri.rsplit('/').next() {
        Some(rkey) if !rkey.is_empty() => {
            format!("https://bsky.app/profile/{handle}/post/{rkey}")
        }
        _ => uri.to_string(),
    }
}

/// Map one raw post value onto an Article, preserving the raw payload.
/// Returns `None` for payloads that do not carry the expected record shape.
pub fn map_post(raw: &serde_json::Value, now: DateTime<Utc>) -> Option<Article> {
    let post: BlueskyPost = serde_json::from_value(raw.clone()).ok()?;

    let signals = PostSignals {
        likes: post.like_count,
        reposts: post.repost_count,
        replies: post.reply_count,
        // BlueSky has no verification badge; bio presence is the proxy.
        verified: false,
        has_profile_bio: post
            .author
            .description
            .as_deref()
            .map(|d| !d.trim().is_empty())
            .unwrap_or(false),
        account_age_days: post
            .author
            .created_at
            .map(|created| (now - created).num_days()),
        text_chars: post.record.text.chars().count(),
    };
    let (credibility_score, credibility_factors) = credibility::score(&signals);

    let text = post.record.text.clone();
    let author_name = post
        .author
        .display_name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| post.author.handle.clone());

    Some(Article {
        title: utils::truncate_chars(&text, 80).to_string(),
        description: text.clone(),
        content: text,
        url: post_url(&post.uri, &post.author.handle),
        published_at: post.record.created_at.unwrap_or(now),
        source: ArticleSource {
            name: "BlueSky".to_string(),
            id: Some(post.author.handle.clone()),
            platform: Some(Platform::Bluesky.as_str().to_string()),
            country: None,
        },
        author: Some(author_name),
        osint: Some(OsintMetadata {
            platform: Platform::Bluesky,
            credibility_score,
            credibility_factors,
            engagement: Engagement {
                likes: post.like_count,
                reposts: post.repost_count,
                replies: post.reply_count,
            },
            verified: false,
            original_post: Some(raw.clone()),
        }),
    })
}

pub fn map_response(response: &SearchPostsResponse, now: DateTime<Utc>) -> Vec<Article> {
    response
        .posts
        .iter()
        .filter_map(|raw| {
            let article = map_post(raw, now);
            if article.is_none() {
                warn!("skipping malformed BlueSky post payload");
            }
            article
        })
        .collect()
}

#[async_trait]
impl SourceAdapter for BlueskyAdapter {
    fn info(&self) -> SourceInfo {
        SourceInfo {
            name: "BlueSky",
            kind: SourceKind::Social,
            cli_name: "bluesky",
        }
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<Article>> {
        let limit = query.limit.to_string();
        let response = self
            .http
            .get(format!(
                "{}/xrpc/app.bsky.feed.searchPosts",
                self.base_url
            ))
            .query(&[
                ("q", query.query.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!("BlueSky error ({status}): {body}")));
        }

        let payload: SearchPostsResponse = response.json().await?;
        let mut articles = map_response(&payload, Utc::now());
        utils::apply_filter(&mut articles, query.filter.as_deref());
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const FIXTURE: &str = r#"{
        "posts": [
            {
                "uri": "at://did:plc:abc123/app.bsky.feed.post/3kxyz",
                "cid": "bafy...",
                "author": {
                    "did": "did:plc:abc123",
                    "handle": "observer.bsky.social",
                    "displayName": "The Observer",
                    "description": "Weather and infrastructure watcher.",
                    "createdAt": "2023-05-01T00:00:00Z"
                },
                "record": {
                    "text": "Major outage reported across the southern grid, crews dispatched. Situation developing, follow the thread for updates as they come in from field reports.",
                    "createdAt": "2026-03-02T10:00:00Z"
                },
                "likeCount": 120,
                "repostCount": 40,
                "replyCount": 12
            }
        ]
    }"#;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap()
    }

    #[test]
    fn social_posts_get_fully_populated_osint_metadata() {
        let payload: SearchPostsResponse = serde_json::from_str(FIXTURE).unwrap();
        let articles = map_response(&payload, now());
        assert_eq!(articles.len(), 1);

        let osint = articles[0].osint.as_ref().unwrap();
        assert_eq!(osint.platform, Platform::Bluesky);
        assert_eq!(osint.engagement.likes, 120);
        assert!(osint.original_post.is_some());
        // 50 base + 25 engagement (>100) + 10 bio + 10 age + 10 length
        assert_eq!(osint.credibility_score, 100.min(50 + 25 + 10 + 10 + 10));
        assert!((50..=100).contains(&osint.credibility_score));
    }

    #[test]
    fn at_uri_becomes_public_url() {
        let payload: SearchPostsResponse = serde_json::from_str(FIXTURE).unwrap();
        let articles = map_response(&payload, now());
        assert_eq!(
            articles[0].url,
            "https://bsky.app/profile/observer.bsky.social/post/3kxyz"
        );
    }

    #[test]
    fn author_falls_back_to_handle() {
        let raw = serde_json::json!({
            "uri": "at://did:plc:x/app.bsky.feed.post/1",
            "author": {"handle": "anon.bsky.social"},
            "record": {"text": "hi", "createdAt": "2026-01-01T00:00:00Z"}
        });
        let article = map_post(&raw, now()).unwrap();
        assert_eq!(article.author.as_deref(), Some("anon.bsky.social"));
    }

    #[test]
    fn malformed_posts_are_skipped_not_fatal() {
        let payload = SearchPostsResponse {
            posts: vec![serde_json::json!({"unexpected": true})],
        };
        assert!(map_response(&payload, now()).is_empty());
    }

    #[test]
    fn mapping_is_idempotent() {
        let payload: SearchPostsResponse = serde_json::from_str(FIXTURE).unwrap();
        assert_eq!(map_response(&payload, now()), map_response(&payload, now()));
    }
}
