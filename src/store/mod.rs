use crate::app_config::{StoreBackend, StoreSettings};
use crate::domain::LocationRecord;
use async_trait::async_trait;
use std::fmt::Debug;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

mod json_file_store;
mod memory_store;

pub use json_file_store::JsonFileStoreHandle;
pub use memory_store::MemoryStore;

/// Append-only, insertion ordered collection of location readings.
///
/// Implementations serialize their own writes, an `append` is never lost to a concurrent one.
#[async_trait]
pub trait LocationStore: Debug + Send + Sync {
    /// Appends a record and returns the number of records stored afterwards.
    async fn append(&self, record: LocationRecord) -> Result<usize, StoreError>;

    /// All records, oldest first.
    async fn list(&self) -> Result<Vec<LocationRecord>, StoreError>;
}

pub fn open(settings: &StoreSettings) -> Arc<dyn LocationStore> {
    match settings.backend() {
        StoreBackend::File => Arc::new(JsonFileStoreHandle::spawn(settings.path(), settings.buffer_size())),
        StoreBackend::Memory => Arc::new(MemoryStore::default()),
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("could not read location store: {source}")]
    Read { source: io::Error, path: PathBuf },
    #[error("could not write location store: {source}")]
    Write { source: io::Error, path: PathBuf },
    #[error("location store is corrupt: {source}")]
    Corrupt { source: serde_json::Error, path: PathBuf },
    #[error("could not encode location store: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("location store is unavailable")]
    Unavailable,
}

impl StoreError {
    pub fn path(&self) -> Option<&Path> {
        match self {
            StoreError::Read { path, .. } | StoreError::Write { path, .. } | StoreError::Corrupt { path, .. } => Some(path),
            StoreError::Encode(_) | StoreError::Unavailable => None,
        }
    }
}
