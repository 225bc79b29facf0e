use std::path::PathBuf;
use std::sync::Arc;

use ambos_core::LayoutStore;

pub mod backends;

pub use backends::file::FileStore;
pub use backends::memory::MemoryStore;

/// Pick a layout backend: file-backed when a data directory is configured,
/// in-memory otherwise.
pub fn create_store(data_dir: Option<PathBuf>) -> Arc<dyn LayoutStore> {
    match data_dir {
        Some(dir) => Arc::new(FileStore::new(dir)),
        None => Arc::new(MemoryStore::new()),
    }
}

pub mod prelude {
    pub use super::backends::file::FileStore;
    pub use super::backends::memory::MemoryStore;
    pub use super::create_store;
    pub use ambos_core::LayoutStore;
}
