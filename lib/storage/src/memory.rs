use parking_lot::RwLock;
use std::path::PathBuf;

use crate::snapshot::CacheSnapshot;
use crate::store::{CacheStore, Result, StoreError};

/// Keeps the snapshot in process memory. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryCacheStore {
    snapshot: RwLock<Option<CacheSnapshot>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: CacheSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(Some(snapshot)),
        }
    }
}

impl CacheStore for MemoryCacheStore {
    fn load(&self) -> Result<CacheSnapshot> {
        self.snapshot
            .read()
            .clone()
            .ok_or_else(|| StoreError::NotFound(PathBuf::from("<memory>")))
    }

    fn save(&self, snapshot: &CacheSnapshot) -> Result<()> {
        *self.snapshot.write() = Some(snapshot.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
