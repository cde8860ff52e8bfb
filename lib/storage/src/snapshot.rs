use advertx_core::SimilarityIndex;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The result of one successful refresh cycle.
///
/// Snapshots are never modified after creation; a newer cycle replaces the
/// whole value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub created_at: DateTime<Utc>,
    pub content: SimilarityIndex,
}

impl CacheSnapshot {
    /// Snapshot `content` as of now.
    pub fn new(content: SimilarityIndex) -> Self {
        Self::with_created_at(content, Utc::now())
    }

    pub fn with_created_at(content: SimilarityIndex, created_at: DateTime<Utc>) -> Self {
        Self { created_at, content }
    }

    /// Age at `now`. A creation time in the future counts as zero.
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        (now - self.created_at).to_std().unwrap_or_default()
    }

    /// Expired once `now - created_at >= ttl`.
    pub fn is_expired_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.age_at(now) >= ttl
    }

    #[inline]
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.is_expired_at(Utc::now(), ttl)
    }
}
