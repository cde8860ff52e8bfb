use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::coordinator::{CycleOutcome, RefreshCoordinator};

/// Shortest accepted period; `tokio::time::interval` rejects zero.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Drives the coordinator: one on-demand read at start, then a full refresh
/// every `period`.
///
/// Firings run one after another inside a single task, so they never overlap.
/// A failed cycle is logged and the next tick still fires.
pub struct Scheduler;

impl Scheduler {
    pub fn spawn(coordinator: Arc<RefreshCoordinator>, period: Duration) -> SchedulerHandle {
        let period = period.max(MIN_PERIOD);
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let fired = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&fired);

        let task = tokio::spawn(async move {
            tokio::select! {
                outcome = coordinator.get_current_or_trigger_refresh() => {
                    log_firing("startup", &outcome);
                    counter.fetch_add(1, Ordering::Relaxed);
                }
                _ = shutdown_rx.changed() => return,
            }

            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = shutdown_rx.changed() => break,
                }

                info!(?period, "timer says it is time to refresh");
                tokio::select! {
                    outcome = coordinator.refresh() => {
                        log_firing("timer", &outcome);
                        counter.fetch_add(1, Ordering::Relaxed);
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
            info!("refresh scheduler stopped");
        });

        SchedulerHandle {
            shutdown,
            task,
            fired,
        }
    }
}

fn log_firing(source: &str, outcome: &CycleOutcome) {
    match outcome {
        Ok(snapshot) => info!(
            source,
            created_at = %snapshot.created_at,
            adverts = snapshot.content.len(),
            "scheduled refresh served"
        ),
        Err(failure) => warn!(source, kind = failure.kind(), "scheduled refresh failed: {}", failure),
    }
}

/// Owns the scheduler task. Dropping the handle also stops the timer.
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
    fired: Arc<AtomicU64>,
}

impl SchedulerHandle {
    /// Firings completed so far, the startup one included.
    pub fn fired(&self) -> u64 {
        self.fired.load(Ordering::Relaxed)
    }

    /// Stop the timer and wait for the task to exit. A cycle already running
    /// on the coordinator finishes on its own.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!("refresh scheduler task failed: {}", e);
        }
    }
}
