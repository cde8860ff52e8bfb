//! # advertx Refresh
//!
//! The refresh pipeline: fetch adverts from a [`DataSource`], score them,
//! persist the [`CacheSnapshot`](advertx_storage::CacheSnapshot) and notify
//! subscribers, with at most one cycle in flight.
//!
//! ## Example
//!
//! ```rust,no_run
//! use advertx_refresh::{JsonFileSource, NullSink, RefreshConfig, RefreshCoordinator, Scheduler};
//! use advertx_storage::FileCacheStore;
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = RefreshConfig::default();
//! let coordinator = Arc::new(RefreshCoordinator::new(
//!     config.clone(),
//!     Arc::new(JsonFileSource::new("items.json")),
//!     Arc::new(FileCacheStore::new("./data")?),
//!     Arc::new(NullSink),
//! ));
//!
//! let scheduler = Scheduler::spawn(coordinator.clone(), config.ttl);
//! let snapshot = coordinator.get_current_or_trigger_refresh().await?;
//! println!("{} adverts indexed", snapshot.content.len());
//! scheduler.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod notify;
pub mod scheduler;
pub mod source;

#[cfg(test)]
mod test_support;

pub use config::RefreshConfig;
pub use coordinator::{CycleOutcome, CyclePhase, RefreshCoordinator, Trigger};
pub use error::{DataSourceError, QueryError, RefreshFailure};
pub use notify::{BroadcastSink, NotificationSink, NullSink};
pub use scheduler::{Scheduler, SchedulerHandle};
pub use source::{DataSource, HttpSource, JsonFileSource};
