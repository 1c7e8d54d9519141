use crate::domain::LocationRecord;
use crate::store::{LocationStore, StoreError};
use async_trait::async_trait;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::sync::oneshot;
use tracing::{debug, info, instrument, warn};

#[derive(Debug)]
pub enum StoreCommand {
    Append {
        record: LocationRecord,
        reply: oneshot::Sender<Result<usize, StoreError>>,
    },
    List {
        reply: oneshot::Sender<Result<Vec<LocationRecord>, StoreError>>,
    },
}

/// Owner of the store file. Commands are handled one at a time, which makes every
/// read-modify-write cycle atomic with respect to the other requests.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    rx: Receiver<StoreCommand>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>, rx: Receiver<StoreCommand>) -> Self {
        JsonFileStore { path: path.into(), rx }
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn listen(&mut self) {
        while let Some(command) = self.rx.recv().await {
            match command {
                StoreCommand::Append { record, reply } => {
                    let result = self.append(record).await;
                    if reply.send(result).is_err() {
                        debug!("💾 Requester went away before the append completed");
                    }
                }
                StoreCommand::List { reply } => {
                    let result = self.read_all().await;
                    if reply.send(result).is_err() {
                        debug!("💾 Requester went away before the listing completed");
                    }
                }
            }
        }
        info!("💾 Location store closed");
    }

    async fn append(&self, record: LocationRecord) -> Result<usize, StoreError> {
        let mut records = self.read_all().await?;
        records.push(record);
        self.write_all(&records).await?;
        debug!("💾 Appended location, {} stored", records.len());
        Ok(records.len())
    }

    async fn read_all(&self) -> Result<Vec<LocationRecord>, StoreError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(StoreError::Read {
                    source: err,
                    path: self.path.clone(),
                });
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
            source: e,
            path: self.path.clone(),
        })
    }

    async fn write_all(&self, records: &[LocationRecord]) -> Result<(), StoreError> {
        let mut bytes = serde_json::to_vec_pretty(records).map_err(StoreError::Encode)?;
        bytes.push(b'\n');

        let write_error = |source| StoreError::Write {
            source,
            path: self.path.clone(),
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(write_error)?;
        }

        // Flushed to disk before the rename, the store file is either the old or the new array
        let temp_path = temp_path_for(&self.path);
        write_synced(&temp_path, &bytes).await.map_err(write_error)?;
        if let Err(err) = fs::rename(&temp_path, &self.path).await {
            if let Err(remove_err) = fs::remove_file(&temp_path).await {
                warn!("⚠️ Could not remove '{}': {}", temp_path.display(), remove_err);
            }
            return Err(write_error(err));
        }

        Ok(())
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Cloneable front of a [`JsonFileStore`] running on its own task.
#[derive(Clone, Debug)]
pub struct JsonFileStoreHandle {
    tx: Sender<StoreCommand>,
}

impl JsonFileStoreHandle {
    pub fn spawn(path: impl Into<PathBuf>, buffer_size: usize) -> Self {
        let (tx, rx) = mpsc::channel::<StoreCommand>(buffer_size.max(1));
        let mut store = JsonFileStore::new(path, rx);

        tokio::spawn(async move {
            store.listen().await;
        });

        JsonFileStoreHandle { tx }
    }
}

#[async_trait]
impl LocationStore for JsonFileStoreHandle {
    async fn append(&self, record: LocationRecord) -> Result<usize, StoreError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(StoreCommand::Append { record, reply })
            .await
            .map_err(|_| StoreError::Unavailable)?;
        response.await.map_err(|_| StoreError::Unavailable)?
    }

    async fn list(&self) -> Result<Vec<LocationRecord>, StoreError> {
        let (reply, response) = oneshot::channel();
        self.tx.send(StoreCommand::List { reply }).await.map_err(|_| StoreError::Unavailable)?;
        response.await.map_err(|_| StoreError::Unavailable)?
    }
}
