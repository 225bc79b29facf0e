use async_trait::async_trait;
use ambos_core::{Article, Result};

pub mod bluesky;
pub mod gnews;
pub mod gopher;
pub mod mastodon;
pub mod mediastack;
pub mod newsapi;
pub mod rss;

pub use bluesky::BlueskyAdapter;
pub use gnews::GNewsAdapter;
pub use gopher::GopherAdapter;
pub use mastodon::MastodonAdapter;
pub use mediastack::MediastackAdapter;
pub use newsapi::NewsApiAdapter;
pub use rss::RssAdapter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Press,
    Social,
    Feed,
}

#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub name: &'static str,
    pub kind: SourceKind,
    /// Shorthand used in CLI flags and API source selectors.
    pub cli_name: &'static str,
}

#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub query: String,
    pub language: String,
    pub limit: usize,
    /// Optional combined filter applied after mapping: case-insensitive OR
    /// across whitespace-split terms, over title+description+content.
    pub filter: Option<String>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            language: language.into(),
            limit: 25,
            filter: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

/// One adapter per external news/social API. Adapters map provider payloads
/// onto the canonical [`Article`] shape and must surface rate-limit
/// conditions distinctly from generic failures, never as an empty list.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn info(&self) -> SourceInfo;

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<Article>>;
}

pub(crate) mod utils {
    use ambos_core::Article;

    /// Case-insensitive OR match across the query's whitespace-split terms,
    /// against the concatenation of title+description+content.
    pub fn matches_query(article: &Article, query: &str) -> bool {
        let terms: Vec<String> = query
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect();
        if terms.is_empty() {
            return true;
        }
        let haystack = format!(
            "{} {} {}",
            article.title, article.description, article.content
        )
        .to_lowercase();
        terms.iter().any(|t| haystack.contains(t.as_str()))
    }

    pub fn apply_filter(articles: &mut Vec<Article>, filter: Option<&str>) {
        if let Some(filter) = filter {
            articles.retain(|a| matches_query(a, filter));
        }
    }

    /// Strip HTML markup, collapsing whitespace between text nodes.
    pub fn strip_html(input: &str) -> String {
        let fragment = scraper::Html::parse_fragment(input);
        let text: Vec<&str> = fragment.root_element().text().collect();
        text.join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Truncate to at most `max_chars` characters, on a char boundary.
    pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
        match s.char_indices().nth(max_chars) {
            Some((idx, _)) => &s[..idx],
            None => s,
        }
    }

}
