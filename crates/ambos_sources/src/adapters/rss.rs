use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::warn;

use ambos_core::{Article, ArticleSource, Error, Result};

use super::{utils, SearchQuery, SourceAdapter, SourceInfo, SourceKind};

/// Aggregates a configured list of RSS/Atom feeds. Individual feed failures
/// degrade to zero contributed items; they never abort the other feeds.
pub struct RssAdapter {
    feeds: Vec<String>,
    http: reqwest::Client,
}

impl RssAdapter {
    pub fn new(feeds: Vec<String>) -> Self {
        Self {
            feeds,
            http: reqwest::Client::new(),
        }
    }

    async fn fetch_feed(&self, feed_url: &str) -> Result<Vec<Article>> {
        let response = self.http.get(feed_url).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited);
        }
        if !status.is_success() {
            return Err(Error::Upstream(format!(
                "feed {feed_url} returned {status}"
            )));
        }
        let bytes = response.bytes().await?;
        let feed = feed_rs::parser::parse(bytes.as_ref())
            .map_err(|e| Error::Upstream(format!("feed {feed_url} parse error: {e}")))?;
        Ok(map_feed(&feed, feed_url, Utc::now()))
    }
}

/// Map a parsed feed onto canonical articles. Items missing both title and
/// link are dropped (they cannot be rendered or deduplicated); missing
/// publish dates default to `now`.
pub fn map_feed(feed: &feed_rs::model::Feed, feed_url: &str, now: DateTime<Utc>) -> Vec<Article> {
    let source_name = feed
        .title
        .as_ref()
        .map(|t| t.content.clone())
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| feed_url.to_string());

    feed.entries
        .iter()
        .filter_map(|entry| {
            let title = entry
                .title
                .as_ref()
                .map(|t| utils::strip_html(&t.content))
                .unwrap_or_default();
            let link = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .unwrap_or_default();
            if title.trim().is_empty() && link.trim().is_empty() {
                return None;
            }

            let description = entry
                .summary
                .as_ref()
                .map(|t| utils::strip_html(&t.content))
                .unwrap_or_default();
            let content = entry
                .content
                .as_ref()
                .and_then(|c| c.body.as_deref())
                .map(utils::strip_html)
                .unwrap_or_default();

            Some(Article {
                title,
                description,
                content,
                url: link,
                published_at: entry.published.or(entry.updated).unwrap_or(now),
                source: ArticleSource {
                    name: source_name.clone(),
                    id: Some(feed_url.to_string()),
                    platform: None,
                    country: None,
                },
                author: entry
                    .authors
                    .first()
                    .map(|p| p.name.clone())
                    .filter(|n| !n.trim().is_empty()),
                osint: None,
            })
        })
        .collect()
}

#[async_trait]
impl SourceAdapter for RssAdapter {
    fn info(&self) -> SourceInfo {
        SourceInfo {
            name: "RSS Feeds",
            kind: SourceKind::Feed,
            cli_name: "rss",
        }
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<Article>> {
        let fetches = self.feeds.iter().map(|feed_url| async move {
            match self.fetch_feed(feed_url).await {
                Ok(articles) => articles,
                Err(e) => {
                    warn!(feed = %feed_url, "feed fetch failed: {e}");
                    Vec::new()
                }
            }
        });

        let mut articles: Vec<Article> = join_all(fetches).await.into_iter().flatten().collect();

        // Feeds are not query-aware; the search terms act as the filter.
        let filter = query.filter.as_deref().unwrap_or(query.query.as_str());
        articles.retain(|a| utils::matches_query(a, filter));
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const FIXTURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example Feed</title>
    <link>https://example.com</link>
    <item>
      <title>Storm damage closes coastal road</title>
      <link>https://example.com/storm</link>
      <description>&lt;p&gt;Cleanup crews &lt;b&gt;on site&lt;/b&gt; since dawn.&lt;/p&gt;</description>
      <pubDate>Mon, 02 Mar 2026 07:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Kept despite empty description</title>
      <link>https://example.com/second</link>
      <description></description>
    </item>
    <item>
      <description>orphan item with neither title nor link</description>
    </item>
  </channel>
</rss>"#;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap()
    }

    fn parse_fixture() -> feed_rs::model::Feed {
        feed_rs::parser::parse(FIXTURE.as_bytes()).unwrap()
    }

    #[test]
    fn drops_items_missing_both_title_and_link() {
        let feed = parse_fixture();
        let articles = map_feed(&feed, "https://example.com/rss", now());
        assert_eq!(articles.len(), 2);
        assert!(articles.iter().all(|a| !a.url.is_empty() || !a.title.is_empty()));
    }

    #[test]
    fn keeps_items_with_empty_description() {
        let feed = parse_fixture();
        let articles = map_feed(&feed, "https://example.com/rss", now());
        let second = articles
            .iter()
            .find(|a| a.url == "https://example.com/second")
            .unwrap();
        assert_eq!(second.description, "");
    }

    #[test]
    fn strips_html_from_descriptions() {
        let feed = parse_fixture();
        let articles = map_feed(&feed, "https://example.com/rss", now());
        let first = articles
            .iter()
            .find(|a| a.url == "https://example.com/storm")
            .unwrap();
        assert_eq!(first.description, "Cleanup crews on site since dawn.");
    }

    #[test]
    fn missing_dates_default_to_now() {
        let feed = parse_fixture();
        let articles = map_feed(&feed, "https://example.com/rss", now());
        let second = articles
            .iter()
            .find(|a| a.url == "https://example.com/second")
            .unwrap();
        assert_eq!(second.published_at, now());
    }

    #[test]
    fn feed_title_becomes_source_name() {
        let feed = parse_fixture();
        let articles = map_feed(&feed, "https://example.com/rss", now());
        assert!(articles.iter().all(|a| a.source.name == "Example Feed"));
        assert!(articles.iter().all(|a| a.osint.is_none()));
    }
}
