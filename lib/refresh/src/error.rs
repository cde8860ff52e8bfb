use advertx_core::AdvertId;
use advertx_storage::CacheSnapshot;
use std::sync::Arc;
use thiserror::Error;

/// Failure reported by a [`DataSource`](crate::DataSource).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataSourceError {
    /// The store could not be reached or did not answer in time.
    #[error("Data source unavailable: {0}")]
    Unavailable(String),

    /// The store answered with something that is not a batch of adverts.
    #[error("Malformed data: {0}")]
    Malformed(String),
}

/// Why a refresh cycle did not produce a durable snapshot.
///
/// Every observer of a cycle receives a clone of the same value.
#[derive(Error, Debug, Clone)]
pub enum RefreshFailure {
    #[error("Data source unavailable: {0}")]
    DataSourceUnavailable(String),

    #[error("Invalid batch: {0}")]
    InvalidBatch(String),

    /// Scoring succeeded but the snapshot was not written. The snapshot is
    /// still served from memory until the next successful cycle.
    #[error("Snapshot not persisted: {reason}")]
    PersistError {
        reason: String,
        snapshot: Arc<CacheSnapshot>,
    },

    /// The cycle task stopped before reporting an outcome.
    #[error("Refresh cycle ended without an outcome")]
    Abandoned,
}

impl RefreshFailure {
    /// The in-memory snapshot of a cycle that only failed to persist.
    pub fn snapshot(&self) -> Option<&Arc<CacheSnapshot>> {
        match self {
            RefreshFailure::PersistError { snapshot, .. } => Some(snapshot),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RefreshFailure::DataSourceUnavailable(_) => "data_source_unavailable",
            RefreshFailure::InvalidBatch(_) => "invalid_batch",
            RefreshFailure::PersistError { .. } => "persist_error",
            RefreshFailure::Abandoned => "abandoned",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Adverts have not been compared yet")]
    NoSnapshot,

    #[error("Advert {0} is not in the current snapshot")]
    NotFoundInSnapshot(AdvertId),
}
