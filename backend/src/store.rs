use std::{
    io,
    marker::PhantomData,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};
use time::OffsetDateTime;
use tokio::{fs, io::AsyncWriteExt, sync::Mutex};
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to serialize collection: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("collection file {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },
    #[error("poll {0} not found")]
    PollNotFound(String),
    #[error("record {0} already exists")]
    DuplicateId(String),
    #[error("a new poll must start without ballots")]
    BallotsNotEmpty,
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io { path: path.to_path_buf(), source }
    }
}

/// How a collection reacts when its backing file cannot be read or parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadPolicy {
    /// Treat an unreadable file as an empty collection.
    #[default]
    FailOpen,
    /// Surface the failure to the caller.
    FailClosed,
}

struct Snapshot<T> {
    records: Vec<T>,
    corrupt: bool,
}

/// A sequence of records persisted as one JSON array file.
///
/// Nothing is cached: every call reads the whole file again. Mutations go
/// through [`JsonCollection::update`], which holds the collection lock across
/// the read, the mutation and the write.
pub struct JsonCollection<T> {
    path: PathBuf,
    policy: ReadPolicy,
    write_lock: Mutex<()>,
    _records: PhantomData<fn() -> T>,
}

impl<T> JsonCollection<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>, policy: ReadPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
            write_lock: Mutex::new(()),
            _records: PhantomData,
        }
    }

    pub async fn read(&self) -> Result<Vec<T>, StoreError> {
        Ok(self.load().await?.records)
    }

    /// Runs `mutate` against a freshly loaded copy of the collection and
    /// writes the whole collection back, even when `mutate` changed nothing.
    /// If `mutate` fails nothing is written.
    pub async fn update<R, F>(&self, mutate: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, StoreError>,
    {
        let _guard = self.write_lock.lock().await;
        let Snapshot { mut records, corrupt } = self.load().await?;
        let result = mutate(&mut records)?;
        if corrupt {
            self.preserve_corrupt().await?;
        }
        self.write(&records).await?;
        Ok(result)
    }

    async fn load(&self) -> Result<Snapshot<T>, StoreError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{} does not exist yet, starting empty", self.path.display());
                return Ok(Snapshot { records: Vec::new(), corrupt: false });
            }
            Err(e) => return self.fail(StoreError::io(&self.path, e)),
        };

        match serde_json::from_slice(&bytes) {
            Ok(records) => Ok(Snapshot { records, corrupt: false }),
            Err(e) => self.fail(StoreError::Corrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            }),
        }
    }

    fn fail(&self, error: StoreError) -> Result<Snapshot<T>, StoreError> {
        match self.policy {
            ReadPolicy::FailClosed => Err(error),
            ReadPolicy::FailOpen => {
                warn!("Reading {} as empty collection: {}", self.path.display(), error);
                Ok(Snapshot { records: Vec::new(), corrupt: true })
            }
        }
    }

    async fn preserve_corrupt(&self) -> Result<(), StoreError> {
        let Some(file_name) = self.path.file_name() else {
            return Ok(());
        };
        let backup = self.path.with_file_name(format!(
            "{}.corrupt-{}",
            file_name.to_string_lossy(),
            OffsetDateTime::now_utc().unix_timestamp()
        ));
        match fs::rename(&self.path, &backup).await {
            Ok(()) => {
                warn!("Moved unreadable {} to {}", self.path.display(), backup.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(&self.path, e)),
        }
    }

    async fn write(&self, records: &[T]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(records)?;
        write_atomic(&self.path, &bytes).await
    }
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let dir = path.parent().ok_or_else(|| {
        StoreError::io(path, io::Error::new(io::ErrorKind::InvalidInput, "path has no parent directory"))
    })?;
    let file_name = path.file_name().ok_or_else(|| {
        StoreError::io(path, io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))
    })?;
    if !dir.as_os_str().is_empty() {
        fs::create_dir_all(dir).await.map_err(|e| StoreError::io(dir, e))?;
    }

    let tmp_path = dir.join(format!("{}.tmp", file_name.to_string_lossy()));
    {
        let mut file = fs::File::create(&tmp_path).await.map_err(|e| StoreError::io(&tmp_path, e))?;
        file.write_all(bytes).await.map_err(|e| StoreError::io(&tmp_path, e))?;
        file.write_all(b"\n").await.map_err(|e| StoreError::io(&tmp_path, e))?;
        file.sync_all().await.map_err(|e| StoreError::io(&tmp_path, e))?;
    }

    #[cfg(windows)]
    {
        if fs::try_exists(path).await.unwrap_or(false) {
            let _ = fs::remove_file(path).await;
        }
    }

    fs::rename(&tmp_path, path).await.map_err(|e| StoreError::io(path, e))
}
