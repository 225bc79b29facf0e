pub mod analyze;
pub mod enrich;
pub mod extract;
pub mod gateway;
pub mod parse;

pub use analyze::AnalysisOrchestrator;
pub use enrich::QueryEnricher;
pub use extract::Extractor;
pub use gateway::OpenRouterGateway;

pub mod prelude {
    pub use super::analyze::AnalysisOrchestrator;
    pub use super::enrich::QueryEnricher;
    pub use super::extract::Extractor;
    pub use super::gateway::OpenRouterGateway;
    pub use ambos_core::{AiGateway, AnalysisResult, EnrichedQuery, Error, Result};
}
