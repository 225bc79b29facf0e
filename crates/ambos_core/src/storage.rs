use async_trait::async_trait;

use crate::types::DashboardLayout;
use crate::Result;

/// Dashboard layout persistence: read at start, write on change. Injected
/// explicitly so callers never reach for a module-level singleton.
#[async_trait]
pub trait LayoutStore: Send + Sync {
    /// Load a layout by dashboard id; `None` when no layout was saved yet.
    async fn load(&self, id: &str) -> Result<Option<DashboardLayout>>;

    /// Persist a layout under the given dashboard id.
    async fn save(&self, id: &str, layout: &DashboardLayout) -> Result<()>;

    /// Remove a saved layout. Deleting a missing layout is not an error.
    async fn delete(&self, id: &str) -> Result<()>;
}
