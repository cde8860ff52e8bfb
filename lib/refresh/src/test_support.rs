// Shared doubles for coordinator and scheduler tests.
use advertx_core::RawAdvert;
use advertx_storage::{CacheSnapshot, CacheStore, MemoryCacheStore, StoreError};
use async_trait::async_trait;
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

use crate::config::RefreshConfig;
use crate::coordinator::{CycleOutcome, RefreshCoordinator};
use crate::error::DataSourceError;
use crate::notify::NotificationSink;
use crate::source::DataSource;

/// Adverts 1 and 2 link with score 34, advert 3 matches nothing.
pub fn sample_batch() -> Vec<RawAdvert> {
    vec![
        RawAdvert::new(1, 100.0, "50 m2", "(555) 111"),
        RawAdvert::new(2, 104.0, "52 m2", "555111"),
        RawAdvert::new(3, 500.0, "120 m2", "777"),
    ]
}

pub fn coordinator(
    source: Arc<dyn DataSource>,
    store: Arc<dyn CacheStore>,
    sink: Arc<dyn NotificationSink>,
) -> Arc<RefreshCoordinator> {
    Arc::new(RefreshCoordinator::new(
        RefreshConfig::default(),
        source,
        store,
        sink,
    ))
}

pub async fn wait_until(condition: impl Fn() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met in time");
}

pub struct StaticSource {
    batch: Vec<RawAdvert>,
    calls: AtomicUsize,
}

impl StaticSource {
    pub fn new(batch: Vec<RawAdvert>) -> Self {
        Self {
            batch,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataSource for StaticSource {
    async fn fetch_all(&self) -> Result<Vec<RawAdvert>, DataSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.batch.clone())
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

/// Blocks every fetch until `release` is called.
pub struct GatedSource {
    batch: Option<Vec<RawAdvert>>,
    gate: Notify,
    calls: AtomicUsize,
}

impl GatedSource {
    pub fn new(batch: Vec<RawAdvert>) -> Self {
        Self {
            batch: Some(batch),
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Fails with `Unavailable` once released.
    pub fn failing() -> Self {
        Self {
            batch: None,
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataSource for GatedSource {
    async fn fetch_all(&self) -> Result<Vec<RawAdvert>, DataSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        self.batch
            .clone()
            .ok_or_else(|| DataSourceError::Unavailable("connection refused".into()))
    }

    fn describe(&self) -> String {
        "gated".to_string()
    }
}

pub struct FailingSource;

#[async_trait]
impl DataSource for FailingSource {
    async fn fetch_all(&self) -> Result<Vec<RawAdvert>, DataSourceError> {
        Err(DataSourceError::Unavailable("connection refused".into()))
    }

    fn describe(&self) -> String {
        "failing".to_string()
    }
}

pub struct MalformedSource;

#[async_trait]
impl DataSource for MalformedSource {
    async fn fetch_all(&self) -> Result<Vec<RawAdvert>, DataSourceError> {
        Err(DataSourceError::Malformed("expected an array".into()))
    }

    fn describe(&self) -> String {
        "malformed".to_string()
    }
}

/// Loads like a memory store, refuses every save.
#[derive(Default)]
pub struct FailingStore {
    inner: MemoryCacheStore,
}

impl FailingStore {
    pub fn with_snapshot(snapshot: CacheSnapshot) -> Self {
        Self {
            inner: MemoryCacheStore::with_snapshot(snapshot),
        }
    }
}

impl CacheStore for FailingStore {
    fn load(&self) -> advertx_storage::Result<CacheSnapshot> {
        self.inner.load()
    }

    fn save(&self, _snapshot: &CacheSnapshot) -> advertx_storage::Result<()> {
        Err(StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only file system",
        )))
    }

    fn describe(&self) -> String {
        "failing".to_string()
    }
}

/// The first save sleeps for `delay` before writing; later saves are
/// immediate.
pub struct SlowFirstSaveStore {
    inner: MemoryCacheStore,
    delay: Duration,
    slowed: AtomicBool,
}

impl SlowFirstSaveStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MemoryCacheStore::new(),
            delay,
            slowed: AtomicBool::new(false),
        }
    }
}

impl CacheStore for SlowFirstSaveStore {
    fn load(&self) -> advertx_storage::Result<CacheSnapshot> {
        self.inner.load()
    }

    fn save(&self, snapshot: &CacheSnapshot) -> advertx_storage::Result<()> {
        if !self.slowed.swap(true, Ordering::SeqCst) {
            std::thread::sleep(self.delay);
        }
        self.inner.save(snapshot)
    }

    fn describe(&self) -> String {
        "slow first save".to_string()
    }
}

/// Blocks every save until `release` is called.
#[derive(Default)]
pub struct GatedStore {
    inner: MemoryCacheStore,
    open: Mutex<bool>,
    opened: Condvar,
    saves: AtomicUsize,
}

impl GatedStore {
    pub fn release(&self) {
        *self.open.lock() = true;
        self.opened.notify_all();
    }

    /// Saves that have started, finished or not.
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl CacheStore for GatedStore {
    fn load(&self) -> advertx_storage::Result<CacheSnapshot> {
        self.inner.load()
    }

    fn save(&self, snapshot: &CacheSnapshot) -> advertx_storage::Result<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        let mut open = self.open.lock();
        while !*open {
            self.opened.wait(&mut open);
        }
        drop(open);
        self.inner.save(snapshot)
    }

    fn describe(&self) -> String {
        "gated".to_string()
    }
}

#[derive(Default)]
pub struct RecordingSink {
    outcomes: Mutex<Vec<CycleOutcome>>,
}

impl RecordingSink {
    pub fn outcomes(&self) -> Vec<CycleOutcome> {
        self.outcomes.lock().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn publish(&self, outcome: &CycleOutcome) {
        self.outcomes.lock().push(outcome.clone());
    }
}
