use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use ambos_core::{DashboardLayout, LayoutStore, Result};

/// In-memory layout storage. State is lost on restart; used when no data
/// directory is configured and in tests.
#[derive(Default)]
pub struct MemoryStore {
    layouts: RwLock<HashMap<String, DashboardLayout>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LayoutStore for MemoryStore {
    async fn load(&self, id: &str) -> Result<Option<DashboardLayout>> {
        Ok(self.layouts.read().await.get(id).cloned())
    }

    async fn save(&self, id: &str, layout: &DashboardLayout) -> Result<()> {
        self.layouts
            .write()
            .await
            .insert(id.to_string(), layout.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.layouts.write().await.remove(id);
        Ok(())
    }
}
