//! Key-value persistence.
//!
//! `Storage` is the raw string store (memory or files on disk).
//! `ProgressStore` layers a key namespace, a versioned JSON envelope and
//! best-effort error handling on top of it. `Backend` picks files on disk
//! and falls back to memory when the data directory is unusable.

pub mod autosave;
pub mod file;
pub mod memory;
pub mod store;

use std::path::Path;
use thiserror::Error;
use tracing::{error, info};

pub use autosave::AutoSave;
pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use store::{Migration, ProgressStore};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid key pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("storage quota exceeded ({needed} bytes needed, {available} available)")]
    QuotaExceeded { needed: usize, available: usize },
}

pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Storage picked at startup.
#[derive(Debug, Clone)]
pub enum Backend {
    File(FileStorage),
    Memory(MemoryStorage),
}

impl Backend {
    /// Opens file storage under `dir`. When that fails the session keeps
    /// running on memory storage and nothing survives a restart.
    pub fn open_or_memory(dir: &Path) -> Self {
        match FileStorage::open(dir) {
            Ok(storage) => {
                info!(dir = %dir.display(), "using file storage");
                Backend::File(storage)
            }
            Err(e) => {
                error!(dir = %dir.display(), error = %e, "data dir unusable, saves will not persist");
                Backend::Memory(MemoryStorage::new())
            }
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, Backend::File(_))
    }

    fn inner(&self) -> &dyn Storage {
        match self {
            Backend::File(storage) => storage,
            Backend::Memory(storage) => storage,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Storage {
        match self {
            Backend::File(storage) => storage,
            Backend::Memory(storage) => storage,
        }
    }
}

impl Storage for Backend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner().get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner_mut().set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.inner_mut().remove(key)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.inner().keys()
    }
}
