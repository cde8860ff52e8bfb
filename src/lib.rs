//! # advertx
//!
//! Finds probable duplicate adverts. Every pair of adverts in a batch is
//! scored on contact, area and price; pairs that score above zero are linked
//! in both directions. The resulting index is cached as a timestamped snapshot
//! and refreshed by a single-flight pipeline, at most once at a time.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! advertx --source-file adverts.json --api-key secret --http-port 8080
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use advertx::prelude::*;
//!
//! let records: Vec<AdvertRecord> = [
//!     RawAdvert::new(1, 100.0, "50 m2", "(555) 111"),
//!     RawAdvert::new(2, 104.0, "52 m2", "555111"),
//! ]
//! .iter()
//! .map(AdvertRecord::from_raw)
//! .collect();
//!
//! let scored = SimilarityEngine::new().build_index(&records);
//! assert_eq!(scored.index.links_for(1).unwrap()[0].score, 34.0);
//! ```
//!
//! ## Crate Structure
//!
//! - [`advertx-core`](https://docs.rs/advertx-core) - Advert records, normalization, the similarity index
//! - [`advertx-similarity`](https://docs.rs/advertx-similarity) - Pair scoring and the index build
//! - [`advertx-storage`](https://docs.rs/advertx-storage) - Snapshot stores
//! - [`advertx-refresh`](https://docs.rs/advertx-refresh) - Refresh coordinator, scheduler, data sources
//! - [`advertx-api`](https://docs.rs/advertx-api) - REST API

// Re-export core types
pub use advertx_core::{
    normalize_area, normalize_batch, normalize_contact, AdvertId, AdvertRecord, Error, RawAdvert,
    Result, SimilarityIndex, SimilarityLink, MAX_SCORE,
};

// Re-export scoring
pub use advertx_similarity::{IndexStats, ScoreBreakdown, ScoredBatch, SimilarityEngine};

// Re-export storage
pub use advertx_storage::{
    CacheSnapshot, CacheStore, FileCacheStore, MemoryCacheStore, StoreError, DEFAULT_SNAPSHOT_FILE,
};

// Re-export refresh pipeline
pub use advertx_refresh::{
    BroadcastSink, CycleOutcome, CyclePhase, DataSource, DataSourceError, HttpSource,
    JsonFileSource, NotificationSink, NullSink, QueryError, RefreshConfig, RefreshCoordinator,
    RefreshFailure, Scheduler, SchedulerHandle, Trigger,
};

// Re-export API
pub use advertx_api::{ApiState, RestApi};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AdvertId, AdvertRecord, RawAdvert, SimilarityIndex, SimilarityLink,
        SimilarityEngine, ScoreBreakdown,
        CacheSnapshot, CacheStore, FileCacheStore, MemoryCacheStore,
        DataSource, JsonFileSource, HttpSource, NotificationSink, BroadcastSink, NullSink,
        RefreshConfig, RefreshCoordinator, RefreshFailure, Scheduler,
        Error, Result,
    };
}
