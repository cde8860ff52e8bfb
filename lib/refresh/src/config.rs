use std::time::Duration;

/// Snapshot lifetime and the refresh period, 24 hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_PERSIST_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for a [`RefreshCoordinator`](crate::RefreshCoordinator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Maximum snapshot age before an on-demand read refreshes it.
    pub ttl: Duration,
    /// Upper bound on one `DataSource::fetch_all` call.
    pub fetch_timeout: Duration,
    /// Upper bound on one `CacheStore::save` call.
    pub persist_timeout: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            persist_timeout: DEFAULT_PERSIST_TIMEOUT,
        }
    }
}

impl RefreshConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_persist_timeout(mut self, timeout: Duration) -> Self {
        self.persist_timeout = timeout;
        self
    }
}
