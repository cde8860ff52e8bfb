pub mod file;
pub mod memory;
pub mod snapshot;
pub mod store;

pub use file::{FileCacheStore, DEFAULT_SNAPSHOT_FILE};
pub use memory::MemoryCacheStore;
pub use snapshot::CacheSnapshot;
pub use store::{CacheStore, Result, StoreError};
