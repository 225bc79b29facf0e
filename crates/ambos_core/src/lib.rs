pub mod config;
pub mod credibility;
pub mod error;
pub mod gateway;
pub mod storage;
pub mod types;

pub use config::Config;
pub use credibility::{score, CredibilityFactors, PostSignals};
pub use error::Error;
pub use gateway::{AiGateway, ToolSpec};
pub use storage::LayoutStore;
pub use types::{
    AnalysisResult, Article, ArticleSource, DashboardLayout, Engagement, EnrichedQuery, Entity,
    OsintMetadata, PanelPlacement, Platform, Prediction, Sentiment, SourceType,
};

pub type Result<T> = std::result::Result<T, Error>;
