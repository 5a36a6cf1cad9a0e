//! Expiry Sweeper
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::{CacheStore, StatsCounters};

/// Shortest period a sweeper will tick at.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Longest period a sweeper will tick at.
pub const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Lifecycle of a sweeper. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweeperState {
    Running,
    Stopped,
}

/// Handle to the background sweep loop.
///
/// Cancelling the token moves the sweeper to `Stopped`; dropping the handle
/// cancels it as well, so the task never outlives the cache that owns it.
#[derive(Debug)]
pub struct Sweeper {
    token: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Sweeper {
    /// Spawns the sweep loop on the current Tokio runtime.
    ///
    /// The first sweep happens one `interval` after spawning. The interval is
    /// clamped to `MIN_SWEEP_INTERVAL..=MAX_SWEEP_INTERVAL`.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime context.
    pub(crate) fn spawn(
        store: Arc<RwLock<CacheStore>>,
        stats: Arc<StatsCounters>,
        interval: Duration,
    ) -> Self {
        let interval = clamp_interval(interval);
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let handle = tokio::spawn(async move {
            let interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
            info!(interval_ms, "expiry sweeper started");

            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        match sweep_once(&store, &stats) {
                            Some(removed) if removed > 0 => {
                                info!("expiry sweep: removed {} expired entries", removed);
                            }
                            Some(_) => debug!("expiry sweep: no expired entries found"),
                            None => {}
                        }
                    }
                }
            }

            info!("expiry sweeper stopped");
        });

        Self {
            token,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// `Stopped` once cancelled or once the loop has exited for any reason.
    pub fn state(&self) -> SweeperState {
        let exited = self
            .handle
            .lock()
            .as_ref()
            .map_or(true, |handle| handle.is_finished());

        if self.token.is_cancelled() || exited {
            SweeperState::Stopped
        } else {
            SweeperState::Running
        }
    }

    /// Signals the sweep loop to stop and waits for it to exit.
    ///
    /// Calling this more than once is a no-op after the first call.
    pub async fn shutdown(&self) {
        self.token.cancel();

        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                warn!("expiry sweeper exited abnormally: {}", err);
            }
        }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

fn clamp_interval(interval: Duration) -> Duration {
    interval.clamp(MIN_SWEEP_INTERVAL, MAX_SWEEP_INTERVAL)
}

/// Runs one sweep pass.
///
/// Returns `None` when the store was empty and the scan was skipped, otherwise
/// the number of entries removed.
pub(crate) fn sweep_once(store: &RwLock<CacheStore>, stats: &StatsCounters) -> Option<usize> {
    if store.read().is_empty() {
        return None;
    }

    let removed = store.write().purge_expired(Utc::now());
    stats.record_expired(removed);
    stats.record_sweep();
    Some(removed)
}
