/*!
 * Outbound request gating.
 *
 * A `RateGate` combines two independent limits that must both be satisfied
 * before a provider call starts:
 * - a bound on the number of calls in flight (semaphore slots)
 * - a minimum spacing between two consecutive call starts
 *
 * Waiters are served in FIFO order by both tokio primitives.
 */

use log::trace;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

/// Limits applied by a `RateGate`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateGateConfig {
    /// Maximum concurrently admitted calls
    pub max_concurrent: usize,
    /// Minimum time between two call starts
    pub min_interval: Duration,
}

impl Default for RateGateConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 20,
            min_interval: Duration::from_secs(1),
        }
    }
}

/// Admission ticket for one outbound call; the slot is released on drop
#[derive(Debug)]
pub struct GatePermit {
    _slot: Option<OwnedSemaphorePermit>,
}

/// Concurrency and pacing gate shared by every call of a client
#[derive(Debug)]
pub struct RateGate {
    slots: Arc<Semaphore>,
    last_start: Mutex<Option<Instant>>,
    config: RateGateConfig,
}

impl RateGate {
    pub fn new(config: RateGateConfig) -> Self {
        let max_concurrent = config.max_concurrent.max(1);
        Self {
            slots: Arc::new(Semaphore::new(max_concurrent)),
            last_start: Mutex::new(None),
            config: RateGateConfig { max_concurrent, ..config },
        }
    }

    pub fn config(&self) -> RateGateConfig {
        self.config
    }

    /// Slots not currently held by an admitted call
    pub fn available_slots(&self) -> usize {
        self.slots.available_permits()
    }

    /// Wait until one more call may start.
    ///
    /// A concurrency slot is taken first; the pacing lock is then held while
    /// sleeping so that starts are spaced by at least `min_interval`.
    pub async fn acquire(&self) -> GatePermit {
        // The semaphore is owned here and never closed, so this cannot fail.
        let slot = Arc::clone(&self.slots).acquire_owned().await.ok();

        let mut last_start = self.last_start.lock().await;
        if let Some(previous) = *last_start {
            let ready_at = previous + self.config.min_interval;
            if ready_at > Instant::now() {
                trace!("Rate gate pacing for {:?}", ready_at - Instant::now());
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last_start = Some(Instant::now());

        GatePermit { _slot: slot }
    }
}

impl Default for RateGate {
    fn default() -> Self {
        Self::new(RateGateConfig::default())
    }
}
