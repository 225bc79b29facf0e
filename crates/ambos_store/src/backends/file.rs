use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use ambos_core::{DashboardLayout, Error, LayoutStore, Result};

/// One JSON file per dashboard id under a data directory. The directory is
/// created on first save.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, id: &str) -> Result<PathBuf> {
        validate_id(id)?;
        Ok(self.dir.join(format!("{id}.json")))
    }
}

/// Layout ids become file names, so anything that could escape the data
/// directory is rejected outright.
fn validate_id(id: &str) -> Result<()> {
    if id.is_empty()
        || !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::Config(format!("invalid layout id: {id:?}")));
    }
    Ok(())
}

#[async_trait]
impl LayoutStore for FileStore {
    async fn load(&self, id: &str) -> Result<Option<DashboardLayout>> {
        let path = self.path_for(id)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, id: &str, layout: &DashboardLayout) -> Result<()> {
        let path = self.path_for(id)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let bytes = serde_json::to_vec_pretty(layout)?;
        // Write to a temp file first so a crash never leaves a half-written
        // layout behind.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!(id, path = %path.display(), "layout saved");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let path = self.path_for(id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use ambos_core::PanelPlacement;

    fn layout() -> DashboardLayout {
        DashboardLayout {
            panels: vec![PanelPlacement {
                id: "map".to_string(),
                kind: "locations".to_string(),
                x: 6,
                y: 0,
                w: 6,
                h: 4,
            }],
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn save_then_load_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.save("main", &layout()).await.unwrap();
        let loaded = store.load("main").await.unwrap().unwrap();
        assert_eq!(loaded.panels, layout().panels);
    }

    #[tokio::test]
    async fn missing_layout_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.load("absent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn path_traversal_ids_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        for id in ["../evil", "a/b", "", "a.b"] {
            let err = store.load(id).await.unwrap_err();
            assert!(matches!(err, Error::Config(_)), "id {id:?} accepted");
        }
    }

    #[tokio::test]
    async fn delete_removes_the_file_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.save("main", &layout()).await.unwrap();
        store.delete("main").await.unwrap();
        store.delete("main").await.unwrap();
        assert!(store.load("main").await.unwrap().is_none());
    }
}
