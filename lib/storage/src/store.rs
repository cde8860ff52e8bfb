use std::path::PathBuf;
use thiserror::Error;

use crate::snapshot::CacheSnapshot;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No snapshot stored at {0}")]
    NotFound(PathBuf),

    #[error("Stored snapshot is unreadable: {0}")]
    Corrupt(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// `NotFound` and `Corrupt` mean "no usable cache", not a broken store.
    pub fn is_absent(&self) -> bool {
        matches!(self, StoreError::NotFound(_) | StoreError::Corrupt(_))
    }
}

/// Durable home of the current [`CacheSnapshot`].
///
/// `save` must replace the stored snapshot atomically: a concurrent `load`
/// sees either the old or the new snapshot, and a failed `save` leaves the old
/// one in place.
pub trait CacheStore: Send + Sync {
    fn load(&self) -> Result<CacheSnapshot>;

    fn save(&self, snapshot: &CacheSnapshot) -> Result<()>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}
