//! Reconciliation engine
//!
//! One engine drives one reconciler. The dispatcher loop owns a work
//! queue of resource keys and guarantees single-flight per key: a key is
//! never reconciled by two workers at once, and a change arriving while
//! its key is in flight marks the key pending so it runs exactly once
//! more after a successful pass. Worker concurrency across distinct
//! keys is bounded by a semaphore.
//!
//! The loop is level-triggered. Keys arrive from the store change feed,
//! from a periodic full resync that re-lists every key, and from
//! per-key requeues (the steady resync cadence after a successful pass,
//! or backoff after a failure). A lagging change feed is not an error;
//! the engine logs it and falls back to a full resync.
//!
//! After a failed pass the key enters a cooldown until its scheduled
//! retry fires; triggers arriving in between are coalesced into that
//! retry. Without the cooldown, a pass that both writes status and
//! fails (an explicit service rejection, say) would re-trigger itself
//! through the change feed and retry in a tight loop.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use shared::{ResourceKey, Result};

/// What a successful pass tells the engine to do with the key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Run again after the steady resync interval
    Requeue,
    /// Drop the key until a new change arrives
    Forget,
}

/// A reconciler for one resource kind
#[async_trait]
pub trait Reconcile: Send + Sync + 'static {
    /// Kind name, used in log fields
    fn kind(&self) -> &'static str;

    /// Every key the engine should cover on a full resync
    fn list_keys(&self) -> Vec<ResourceKey>;

    /// Converge one resource toward its desired state
    ///
    /// Must be idempotent: the engine calls this repeatedly for the
    /// same key and expects a no-op pass when nothing is left to do.
    async fn reconcile(&self, key: &ResourceKey) -> Result<Outcome>;
}

/// Engine tuning knobs
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Steady requeue interval after a successful pass
    pub resync: Duration,
    /// Interval between full key re-lists
    pub full_resync: Duration,
    /// Max concurrent reconcile passes (across distinct keys)
    pub workers: usize,
    /// First retry delay after a retriable failure
    pub backoff_base: Duration,
    /// Ceiling for the exponential retry delay
    pub backoff_cap: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            resync: Duration::from_secs(180),
            full_resync: Duration::from_secs(600),
            workers: 4,
            backoff_base: Duration::from_secs(1),
            backoff_cap: Duration::from_secs(300),
        }
    }
}

#[derive(Default)]
struct KeyState {
    inflight: bool,
    /// A change arrived while the key was in flight
    pending: bool,
    /// The key failed and waits for its scheduled retry; triggers
    /// arriving meanwhile are dropped, the retry covers them.
    cooldown: bool,
    /// Consecutive failures, reset on success
    failures: u32,
}

/// Dispatcher loop around one [`Reconcile`] implementation
pub struct Engine {
    reconciler: Arc<dyn Reconcile>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(reconciler: Arc<dyn Reconcile>, config: EngineConfig) -> Self {
        Self { reconciler, config }
    }

    /// Run until `shutdown` is cancelled
    ///
    /// `changes` is the store's change feed for the reconciler's kind.
    /// In-flight passes are drained before returning.
    pub async fn run(self, mut changes: broadcast::Receiver<ResourceKey>, shutdown: CancellationToken) {
        let kind = self.reconciler.kind();
        let (queue_tx, mut queue_rx) = mpsc::unbounded_channel::<ResourceKey>();
        // Delayed requeues arrive on their own channel so the loop can
        // tell a fired timer from an ordinary trigger and end the
        // key's cooldown.
        let (timer_tx, mut timer_rx) = mpsc::unbounded_channel::<ResourceKey>();
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<(ResourceKey, Result<Outcome>)>();
        let permits = Arc::new(Semaphore::new(self.config.workers));

        let mut states: HashMap<ResourceKey, KeyState> = HashMap::new();
        let mut feed_open = true;

        // First tick fires immediately, so startup begins with a full
        // resync over whatever is already in the store.
        let mut full_resync = tokio::time::interval(self.config.full_resync);

        info!(kind, workers = self.config.workers, "engine started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,

                _ = full_resync.tick() => {
                    let keys = self.reconciler.list_keys();
                    debug!(kind, count = keys.len(), "full resync");
                    for key in keys {
                        let _ = queue_tx.send(key);
                    }
                }

                changed = changes.recv(), if feed_open => {
                    match changed {
                        Ok(key) => {
                            let _ = queue_tx.send(key);
                        }
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            warn!(kind, missed, "change feed lagged, falling back to full resync");
                            for key in self.reconciler.list_keys() {
                                let _ = queue_tx.send(key);
                            }
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            warn!(kind, "change feed closed, periodic resync only");
                            feed_open = false;
                        }
                    }
                }

                Some(key) = timer_rx.recv() => {
                    if let Some(state) = states.get_mut(&key) {
                        state.cooldown = false;
                    }
                    let _ = queue_tx.send(key);
                }

                Some(key) = queue_rx.recv() => {
                    let state = states.entry(key.clone()).or_default();
                    if state.cooldown {
                        continue;
                    }
                    if state.inflight {
                        state.pending = true;
                        continue;
                    }
                    state.inflight = true;

                    let Ok(permit) = permits.clone().acquire_owned().await else {
                        break;
                    };
                    let reconciler = self.reconciler.clone();
                    let done = done_tx.clone();
                    tokio::spawn(async move {
                        let result = reconciler.reconcile(&key).await;
                        drop(permit);
                        let _ = done.send((key, result));
                    });
                }

                Some((key, result)) = done_rx.recv() => {
                    self.finish_pass(&mut states, &queue_tx, &timer_tx, key, result);
                }
            }
        }

        // Drain in-flight passes so status writes are not cut off
        // mid-way. New work is no longer dispatched.
        while states.values().any(|s| s.inflight) {
            match done_rx.recv().await {
                Some((key, result)) => {
                    if let Some(state) = states.get_mut(&key) {
                        state.inflight = false;
                    }
                    if let Err(e) = result {
                        if !e.is_not_found() {
                            warn!(kind, %key, error = %e, "pass failed during shutdown");
                        }
                    }
                }
                None => break,
            }
        }
        info!(kind, "engine stopped");
    }

    /// Handle a completed pass and decide when (or whether) the key
    /// runs again.
    ///
    /// A change coalesced during a successful pass is flushed
    /// immediately. After a failure it is not: the pass's own status
    /// write echoes back through the change feed, and flushing that
    /// echo would bypass the retry delay. The scheduled retry covers
    /// whatever the dropped trigger would have.
    fn finish_pass(
        &self,
        states: &mut HashMap<ResourceKey, KeyState>,
        queue_tx: &mpsc::UnboundedSender<ResourceKey>,
        timer_tx: &mpsc::UnboundedSender<ResourceKey>,
        key: ResourceKey,
        result: Result<Outcome>,
    ) {
        let kind = self.reconciler.kind();
        let state = states.entry(key.clone()).or_default();
        state.inflight = false;
        let had_pending = std::mem::take(&mut state.pending);

        match result {
            Ok(Outcome::Requeue) => {
                state.failures = 0;
                if had_pending {
                    let _ = queue_tx.send(key);
                } else {
                    self.requeue_after(timer_tx, key, self.config.resync);
                }
            }
            Ok(Outcome::Forget) => {
                state.failures = 0;
                if had_pending {
                    let _ = queue_tx.send(key);
                } else {
                    states.remove(&key);
                }
            }
            Err(e) if e.is_not_found() => {
                debug!(kind, %key, "resource gone, dropping key");
                states.remove(&key);
            }
            Err(e) if e.is_retriable() => {
                state.failures += 1;
                state.cooldown = true;
                let delay = self.backoff(state.failures);
                if delay >= self.config.backoff_cap {
                    error!(kind, %key, error = %e, failures = state.failures,
                           delay_secs = delay.as_secs(), "pass keeps failing, backoff saturated");
                } else {
                    warn!(kind, %key, error = %e, failures = state.failures,
                          delay_secs = delay.as_secs(), "pass failed, retrying");
                }
                self.requeue_after(timer_tx, key, delay);
            }
            Err(e) => {
                // Non-retriable: surfaced in status conditions already;
                // keep covering the key at the steady cadence so a spec
                // edit gets picked up even without a change event.
                error!(kind, %key, error = %e, "pass failed");
                state.failures = 0;
                state.cooldown = true;
                self.requeue_after(timer_tx, key, self.config.resync);
            }
        }
    }

    /// Exponential backoff: base doubled per consecutive failure, capped.
    fn backoff(&self, failures: u32) -> Duration {
        let exp = failures.saturating_sub(1).min(20);
        self.config
            .backoff_base
            .saturating_mul(1u32 << exp)
            .min(self.config.backoff_cap)
    }

    fn requeue_after(
        &self,
        timer_tx: &mpsc::UnboundedSender<ResourceKey>,
        key: ResourceKey,
        delay: Duration,
    ) {
        let tx = timer_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(key);
        });
    }
}
