use std::sync::Arc;

use ambos_core::{AiGateway, LayoutStore};
use ambos_sources::SourceManager;

use crate::alerts::AlertDispatcher;

pub struct AppState {
    pub manager: Arc<SourceManager>,
    /// Absent when no gateway credential is configured; enrich/analyze
    /// requests then fail with a configuration error instead of an auth one.
    pub gateway: Option<Arc<dyn AiGateway>>,
    pub layouts: Arc<dyn LayoutStore>,
    pub alerts: AlertDispatcher,
}
