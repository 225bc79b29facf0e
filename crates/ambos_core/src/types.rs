use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::credibility::CredibilityFactors;

/// Social platform a post originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Mastodon,
    Bluesky,
    Twitter,
    Web,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Mastodon => "mastodon",
            Platform::Bluesky => "bluesky",
            Platform::Twitter => "twitter",
            Platform::Web => "web",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a request targets press/news APIs or social-media search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    News,
    Osint,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub likes: u32,
    pub reposts: u32,
    pub replies: u32,
}

/// Present only for social-media-origin articles, and always fully populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OsintMetadata {
    pub platform: Platform,
    pub credibility_score: u8,
    pub credibility_factors: CredibilityFactors,
    pub engagement: Engagement,
    pub verified: bool,
    /// Raw provider payload, kept for downstream AI context construction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_post: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSource {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Canonical article record every provider adapter maps into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub content: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub source: ArticleSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub osint: Option<OsintMetadata>,
}

/// Request-scoped result of AI query enrichment. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedQuery {
    pub original_query: String,
    pub enriched_query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub statement: String,
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizon: Option<String>,
}

/// The two analysis personas produce structurally different sentiment
/// records; they are modeled as explicit variants, never optional fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Sentiment {
    Community {
        community_mood: String,
        divergences: Vec<String>,
        convergences: Vec<String>,
    },
    Press {
        public: String,
        experts: String,
    },
}

/// Produced fresh per analysis call; on failure the orchestrator returns an
/// error rather than a partial object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub entities: Vec<Entity>,
    pub summary: String,
    pub predictions: Vec<Prediction>,
    pub sentiment: Sentiment,
    pub weak_signals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelPlacement {
    pub id: String,
    pub kind: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Dashboard panel layout, persisted through the injected `LayoutStore`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardLayout {
    pub panels: Vec<PanelPlacement>,
    pub updated_at: DateTime<Utc>,
}
