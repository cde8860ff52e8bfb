//! Single-flight refresh of the similarity snapshot.
//!
//! A cycle runs `Fetching -> Scoring -> Persisting` and ends in success or a
//! [`RefreshFailure`]. At most one cycle is in flight: a trigger that arrives
//! while one runs is queued as an observer and receives that cycle's outcome.
//! The cycle itself runs as a separate task, so a caller that stops waiting
//! does not cancel it.

use advertx_core::{normalize_batch, AdvertId, SimilarityLink};
use advertx_similarity::SimilarityEngine;
use advertx_storage::{CacheSnapshot, CacheStore};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex as AsyncMutex};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::RefreshConfig;
use crate::error::{DataSourceError, QueryError, RefreshFailure};
use crate::notify::NotificationSink;
use crate::source::DataSource;

/// What every observer of a cycle receives.
pub type CycleOutcome = Result<Arc<CacheSnapshot>, RefreshFailure>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    Fetching,
    Scoring,
    Persisting,
}

/// Who asked for a refresh. Only used for logging; the freshness check lives
/// in [`RefreshCoordinator::get_current_or_trigger_refresh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Timer,
    OnDemand,
}

struct CycleState {
    phase: CyclePhase,
    observers: Vec<oneshot::Sender<CycleOutcome>>,
}

pub struct RefreshCoordinator {
    config: RefreshConfig,
    engine: SimilarityEngine,
    source: Arc<dyn DataSource>,
    store: Arc<dyn CacheStore>,
    sink: Arc<dyn NotificationSink>,
    state: Mutex<CycleState>,
    current: RwLock<Option<Arc<CacheSnapshot>>>,
    /// Held for the whole blocking write, including past a persist timeout,
    /// so saves reach the store one at a time and in cycle order.
    persist_lock: Arc<AsyncMutex<()>>,
    cycles_started: AtomicU64,
}

impl RefreshCoordinator {
    pub fn new(
        config: RefreshConfig,
        source: Arc<dyn DataSource>,
        store: Arc<dyn CacheStore>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            config,
            engine: SimilarityEngine::new(),
            source,
            store,
            sink,
            state: Mutex::new(CycleState {
                phase: CyclePhase::Idle,
                observers: Vec::new(),
            }),
            current: RwLock::new(None),
            persist_lock: Arc::new(AsyncMutex::new(())),
            cycles_started: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn config(&self) -> &RefreshConfig {
        &self.config
    }

    pub fn phase(&self) -> CyclePhase {
        self.state.lock().phase
    }

    /// Callers currently waiting on the in-flight cycle.
    pub fn pending_observers(&self) -> usize {
        self.state.lock().observers.len()
    }

    pub fn cycles_started(&self) -> u64 {
        self.cycles_started.load(Ordering::Relaxed)
    }

    /// Latest snapshot held in memory, without touching the store.
    pub fn current(&self) -> Option<Arc<CacheSnapshot>> {
        self.current.read().clone()
    }

    /// Links of one advert in the latest snapshot, loading the stored one if
    /// nothing is in memory yet. Never starts a cycle.
    pub async fn query_links_for(&self, id: AdvertId) -> Result<Vec<SimilarityLink>, QueryError> {
        let snapshot = self.load_current().await.ok_or(QueryError::NoSnapshot)?;
        snapshot
            .content
            .links_for(id)
            .map(<[SimilarityLink]>::to_vec)
            .ok_or(QueryError::NotFoundInSnapshot(id))
    }

    /// Serve the current snapshot if it is still fresh, otherwise refresh and
    /// wait for the result.
    ///
    /// A cycle that scored successfully but failed to persist still answers
    /// with its in-memory snapshot.
    pub async fn get_current_or_trigger_refresh(self: &Arc<Self>) -> CycleOutcome {
        if let Some(snapshot) = self.load_current().await {
            if !snapshot.is_expired(self.config.ttl) {
                debug!(created_at = %snapshot.created_at, "serving cached snapshot");
                return Ok(snapshot);
            }
            debug!(created_at = %snapshot.created_at, "cached snapshot expired");
        }

        match self.trigger(Trigger::OnDemand).await {
            Err(RefreshFailure::PersistError { snapshot, .. }) => Ok(snapshot),
            outcome => outcome,
        }
    }

    /// Run a full cycle regardless of snapshot age, or join the one in flight.
    pub async fn refresh(self: &Arc<Self>) -> CycleOutcome {
        self.trigger(Trigger::Timer).await
    }

    /// Start a cycle if none is running, then wait for the outcome of the
    /// cycle in flight.
    pub async fn trigger(self: &Arc<Self>, trigger: Trigger) -> CycleOutcome {
        let (sender, receiver) = oneshot::channel();
        let start = {
            let mut state = self.state.lock();
            state.observers.push(sender);
            if state.phase == CyclePhase::Idle {
                state.phase = CyclePhase::Fetching;
                true
            } else {
                false
            }
        };

        if start {
            let cycle = self.cycles_started.fetch_add(1, Ordering::Relaxed) + 1;
            info!(cycle, ?trigger, source = %self.source.describe(), "refresh cycle started");
            let coordinator = Arc::clone(self);
            tokio::spawn(async move {
                let guard = CycleGuard {
                    coordinator: coordinator.as_ref(),
                    finished: false,
                };
                let outcome = coordinator.run_cycle(cycle).await;
                guard.finish(cycle, outcome);
            });
        } else {
            debug!(?trigger, "refresh already in flight, waiting for its outcome");
        }

        receiver.await.unwrap_or(Err(RefreshFailure::Abandoned))
    }

    /// The in-memory snapshot, or the stored one adopted as current.
    async fn load_current(&self) -> Option<Arc<CacheSnapshot>> {
        if let Some(snapshot) = self.current() {
            return Some(snapshot);
        }

        let store = Arc::clone(&self.store);
        let loaded = timeout(
            self.config.persist_timeout,
            tokio::task::spawn_blocking(move || store.load()),
        )
        .await;

        let snapshot = match loaded {
            Ok(Ok(Ok(snapshot))) => Arc::new(snapshot),
            Ok(Ok(Err(e))) if e.is_absent() => {
                debug!(store = %self.store.describe(), "no usable stored snapshot: {}", e);
                return None;
            }
            Ok(Ok(Err(e))) => {
                warn!(store = %self.store.describe(), "failed to load snapshot: {}", e);
                return None;
            }
            Ok(Err(e)) => {
                warn!("snapshot load task failed: {}", e);
                return None;
            }
            Err(_) => {
                warn!(timeout = ?self.config.persist_timeout, "snapshot load timed out");
                return None;
            }
        };

        // A cycle may have finished while the store was being read.
        let mut current = self.current.write();
        Some(Arc::clone(current.get_or_insert(snapshot)))
    }

    fn set_phase(&self, phase: CyclePhase) {
        self.state.lock().phase = phase;
        debug!(?phase, "refresh phase");
    }

    async fn run_cycle(&self, cycle: u64) -> CycleOutcome {
        let fetched = timeout(self.config.fetch_timeout, self.source.fetch_all()).await;
        let batch = match fetched {
            Ok(Ok(batch)) => batch,
            Ok(Err(DataSourceError::Unavailable(reason))) => {
                return Err(RefreshFailure::DataSourceUnavailable(reason));
            }
            Ok(Err(DataSourceError::Malformed(reason))) => {
                return Err(RefreshFailure::InvalidBatch(reason));
            }
            Err(_) => {
                return Err(RefreshFailure::DataSourceUnavailable(format!(
                    "fetch timed out after {:?}",
                    self.config.fetch_timeout
                )));
            }
        };
        info!(cycle, records = batch.len(), "adverts fetched");

        self.set_phase(CyclePhase::Scoring);
        let engine = self.engine;
        let scored = tokio::task::spawn_blocking(move || {
            normalize_batch(&batch).map(|records| engine.build_index(&records))
        })
        .await;
        let scored = match scored {
            Ok(Ok(scored)) => scored,
            Ok(Err(e)) => return Err(RefreshFailure::InvalidBatch(e.to_string())),
            Err(e) => {
                return Err(RefreshFailure::InvalidBatch(format!(
                    "scoring task failed: {}",
                    e
                )));
            }
        };
        info!(
            cycle,
            records = scored.stats.records,
            pairs = scored.stats.pairs_evaluated,
            linked_pairs = scored.stats.linked_pairs,
            elapsed_ms = scored.stats.elapsed.as_millis() as u64,
            "adverts compared"
        );

        self.set_phase(CyclePhase::Persisting);
        let snapshot = Arc::new(CacheSnapshot::new(scored.index));
        let store = Arc::clone(&self.store);
        let to_save = Arc::clone(&snapshot);
        let persist_lock = Arc::clone(&self.persist_lock);
        let saved = timeout(self.config.persist_timeout, async move {
            // A timed-out write keeps the lock until it returns, so this
            // cycle's save cannot land before it.
            let guard = persist_lock.lock_owned().await;
            tokio::task::spawn_blocking(move || {
                let _guard = guard;
                store.save(&to_save)
            })
            .await
        })
        .await;

        let persist_failure = match saved {
            Ok(Ok(Ok(()))) => None,
            Ok(Ok(Err(e))) => Some(e.to_string()),
            Ok(Err(e)) => Some(format!("persist task failed: {}", e)),
            Err(_) => Some(format!(
                "persist timed out after {:?}",
                self.config.persist_timeout
            )),
        };

        // Memory moves forward even when the store could not.
        *self.current.write() = Some(Arc::clone(&snapshot));

        match persist_failure {
            None => Ok(snapshot),
            Some(reason) => Err(RefreshFailure::PersistError { reason, snapshot }),
        }
    }

    /// Back to `Idle`, handing the outcome to everyone who waited for it.
    fn complete(&self, cycle: u64, outcome: CycleOutcome) {
        let observers = {
            let mut state = self.state.lock();
            state.phase = CyclePhase::Idle;
            std::mem::take(&mut state.observers)
        };

        match &outcome {
            Ok(snapshot) => info!(
                cycle,
                observers = observers.len(),
                adverts = snapshot.content.len(),
                links = snapshot.content.link_count(),
                "refresh cycle done"
            ),
            Err(failure @ RefreshFailure::PersistError { .. }) => warn!(
                cycle,
                observers = observers.len(),
                store = %self.store.describe(),
                "refresh cycle scored but durable cache lags memory: {}",
                failure
            ),
            Err(failure) => warn!(
                cycle,
                observers = observers.len(),
                kind = failure.kind(),
                "refresh cycle failed, keeping previous snapshot: {}",
                failure
            ),
        }

        for observer in observers {
            let _ = observer.send(outcome.clone());
        }
        self.sink.publish(&outcome);
    }
}

/// Resets the coordinator if a cycle task unwinds before reporting, so
/// waiting observers get `Abandoned` instead of hanging.
struct CycleGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    finished: bool,
}

impl CycleGuard<'_> {
    fn finish(mut self, cycle: u64, outcome: CycleOutcome) {
        self.finished = true;
        self.coordinator.complete(cycle, outcome);
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let observers = {
            let mut state = self.coordinator.state.lock();
            state.phase = CyclePhase::Idle;
            std::mem::take(&mut state.observers)
        };
        warn!(observers = observers.len(), "refresh cycle abandoned");
        self.coordinator
            .sink
            .publish(&Err(RefreshFailure::Abandoned));
    }
}
