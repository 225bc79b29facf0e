use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use ambos_core::{Article, Config, Error, Result};

use crate::adapters::{
    BlueskyAdapter, GNewsAdapter, GopherAdapter, MastodonAdapter, MediastackAdapter,
    NewsApiAdapter, RssAdapter, SearchQuery, SourceAdapter, SourceInfo,
};

type BoxedAdapter = Arc<dyn SourceAdapter>;

/// Fans a search out over the configured adapters in parallel, merges the
/// results, and sorts them newest-first. A failing adapter contributes zero
/// results instead of aborting the batch.
pub struct SourceManager {
    adapters: Vec<BoxedAdapter>,
}

impl SourceManager {
    pub fn new() -> Self {
        Self {
            adapters: Vec::new(),
        }
    }

    /// Build a manager from environment configuration; adapters are only
    /// constructed for the credentials present.
    pub fn from_config(config: &Config) -> Self {
        let mut manager = Self::new();
        if let Some(key) = &config.newsapi_key {
            manager.add_adapter(Arc::new(NewsApiAdapter::new(key.clone())));
        }
        if let Some(key) = &config.gnews_key {
            manager.add_adapter(Arc::new(GNewsAdapter::new(key.clone())));
        }
        if let Some(key) = &config.mediastack_key {
            manager.add_adapter(Arc::new(MediastackAdapter::new(key.clone())));
        }
        if let Some(key) = &config.gopher_key {
            manager.add_adapter(Arc::new(GopherAdapter::new(key.clone())));
        }
        // BlueSky search is a public endpoint; Mastodon defaults to a public
        // instance.
        manager.add_adapter(Arc::new(BlueskyAdapter::new()));
        manager.add_adapter(Arc::new(MastodonAdapter::new(
            config.mastodon_base_url.clone(),
        )));
        if !config.rss_feeds.is_empty() {
            manager.add_adapter(Arc::new(RssAdapter::new(config.rss_feeds.clone())));
        }
        manager
    }

    pub fn add_adapter(&mut self, adapter: BoxedAdapter) {
        self.adapters.push(adapter);
    }

    pub fn list(&self) -> Vec<SourceInfo> {
        self.adapters.iter().map(|a| a.info()).collect()
    }

    /// Fetch from a single named adapter. Errors propagate so the caller can
    /// tell "no results" apart from "request failed" (and rate limits from
    /// generic failures).
    pub async fn fetch_one(&self, name: &str, query: &SearchQuery) -> Result<Vec<Article>> {
        let adapter = self
            .adapters
            .iter()
            .find(|a| a.info().cli_name == name)
            .ok_or_else(|| Error::Config(format!("unknown source: {name}")))?;
        let mut articles = adapter.fetch(query).await?;
        sort_by_published_desc(&mut articles);
        Ok(articles)
    }

    /// Parallel multi-source search with per-branch failure isolation.
    pub async fn search(&self, query: &SearchQuery, selector: Option<&[String]>) -> Vec<Article> {
        let targets: Vec<&BoxedAdapter> = self
            .adapters
            .iter()
            .filter(|a| match selector {
                Some(names) => names.iter().any(|n| n == a.info().cli_name),
                None => true,
            })
            .collect();

        let fetches = targets.iter().map(|adapter| {
            let info = adapter.info();
            async move {
                match adapter.fetch(query).await {
                    Ok(articles) => {
                        info!("✨ {} contributed {} articles", info.name, articles.len());
                        articles
                    }
                    Err(e) => {
                        warn!("⚠️ {} failed, contributing zero results: {}", info.name, e);
                        Vec::new()
                    }
                }
            }
        });

        let mut merged: Vec<Article> = join_all(fetches).await.into_iter().flatten().collect();
        sort_by_published_desc(&mut merged);
        merged
    }
}

impl Default for SourceManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Newest-first ordering. `sort_by` is stable, so articles with identical
/// timestamps keep their encounter order.
pub fn sort_by_published_desc(articles: &mut [Article]) {
    articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
}

#[cfg(test)]
mod tests {
    use super::*;
    use ambos_core::ArticleSource;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    fn article(url: &str, hour: u32) -> Article {
        Article {
            title: format!("article {url}"),
            description: String::new(),
            content: String::new(),
            url: url.to_string(),
            published_at: Utc.with_ymd_and_hms(2026, 3, 2, hour, 0, 0).unwrap(),
            source: ArticleSource::default(),
            author: None,
            osint: None,
        }
    }

    struct FixedAdapter {
        name: &'static str,
        articles: Vec<Article>,
    }

    #[async_trait]
    impl SourceAdapter for FixedAdapter {
        fn info(&self) -> SourceInfo {
            SourceInfo {
                name: self.name,
                kind: crate::adapters::SourceKind::Press,
                cli_name: self.name,
            }
        }

        async fn fetch(&self, _query: &SearchQuery) -> Result<Vec<Article>> {
            Ok(self.articles.clone())
        }
    }

    struct FailingAdapter;

    #[async_trait]
    impl SourceAdapter for FailingAdapter {
        fn info(&self) -> SourceInfo {
            SourceInfo {
                name: "failing",
                kind: crate::adapters::SourceKind::Press,
                cli_name: "failing",
            }
        }

        async fn fetch(&self, _query: &SearchQuery) -> Result<Vec<Article>> {
            Err(Error::RateLimited)
        }
    }

    #[tokio::test]
    async fn one_failing_branch_does_not_abort_the_batch() {
        let mut manager = SourceManager::new();
        manager.add_adapter(Arc::new(FixedAdapter {
            name: "a",
            articles: vec![article("a1", 10), article("a2", 8)],
        }));
        manager.add_adapter(Arc::new(FailingAdapter));
        manager.add_adapter(Arc::new(FixedAdapter {
            name: "b",
            articles: vec![article("b1", 9)],
        }));

        let merged = manager
            .search(&SearchQuery::new("anything", "en"), None)
            .await;

        // Merged length equals the sum of the successful branches.
        assert_eq!(merged.len(), 3);
        let urls: Vec<&str> = merged.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls, vec!["a1", "b1", "a2"]);
    }

    #[tokio::test]
    async fn sort_is_stable_under_duplicate_timestamps() {
        let mut articles = vec![
            article("first", 9),
            article("second", 9),
            article("newer", 11),
            article("third", 9),
        ];
        sort_by_published_desc(&mut articles);
        let urls: Vec<&str> = articles.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls, vec!["newer", "first", "second", "third"]);
    }

    #[tokio::test]
    async fn fetch_one_propagates_rate_limit() {
        let mut manager = SourceManager::new();
        manager.add_adapter(Arc::new(FailingAdapter));

        let err = manager
            .fetch_one("failing", &SearchQuery::new("q", "en"))
            .await
            .unwrap_err();
        assert!(err.is_rate_limit());
    }

    #[tokio::test]
    async fn fetch_one_rejects_unknown_source() {
        let manager = SourceManager::new();
        let err = manager
            .fetch_one("nope", &SearchQuery::new("q", "en"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn selector_restricts_the_fan_out() {
        let mut manager = SourceManager::new();
        manager.add_adapter(Arc::new(FixedAdapter {
            name: "a",
            articles: vec![article("a1", 10)],
        }));
        manager.add_adapter(Arc::new(FixedAdapter {
            name: "b",
            articles: vec![article("b1", 9)],
        }));

        let merged = manager
            .search(
                &SearchQuery::new("anything", "en"),
                Some(&["b".to_string()]),
            )
            .await;
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].url, "b1");
    }
}
