// File-backed snapshot store. One JSON document, replaced atomically.
use atomicwrites::{AtomicFile, OverwriteBehavior};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::snapshot::CacheSnapshot;
use crate::store::{CacheStore, Result, StoreError};

pub const DEFAULT_SNAPSHOT_FILE: &str = "posted.json";

pub struct FileCacheStore {
    path: PathBuf,
}

impl FileCacheStore {
    /// Store `posted.json` inside `data_dir`, creating the directory if needed.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        Self::with_file_name(data_dir, DEFAULT_SNAPSHOT_FILE)
    }

    pub fn with_file_name<P: AsRef<Path>>(data_dir: P, file_name: &str) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir)?;
        Ok(Self {
            path: data_dir.join(file_name),
        })
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CacheStore for FileCacheStore {
    fn load(&self) -> Result<CacheSnapshot> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&data).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    fn save(&self, snapshot: &CacheSnapshot) -> Result<()> {
        let json_data = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        // Written to a temporary file in the same directory, then renamed over
        // the target.
        AtomicFile::new(&self.path, OverwriteBehavior::AllowOverwrite)
            .write(|file| file.write_all(&json_data))
            .map_err(|e| match e {
                atomicwrites::Error::Internal(e) | atomicwrites::Error::User(e) => {
                    StoreError::Io(e)
                }
            })?;

        debug!(
            path = %self.path.display(),
            bytes = json_data.len(),
            "snapshot written"
        );
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
