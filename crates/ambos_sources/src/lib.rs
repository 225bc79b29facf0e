pub mod adapters;
pub mod manager;

pub use adapters::{SearchQuery, SourceAdapter, SourceInfo, SourceKind};
pub use manager::SourceManager;

pub mod prelude {
    pub use super::adapters::{SearchQuery, SourceAdapter, SourceInfo, SourceKind};
    pub use super::manager::SourceManager;
    pub use ambos_core::{Article, Error, Result};
}
