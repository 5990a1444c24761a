//! Refresh lifecycle: one collect-then-fetch cycle at a time, a periodic timer,
//! and whole-state snapshots published to the UI.
//!
//! Consumers only ever see [`SyncState`] through a `watch` channel. A cycle
//! commits its three reads in one publish or not at all, so a failed cycle
//! leaves the last good `latest`/`history`/`stats` on screen next to the error.
//! The error itself is cleared as soon as the next cycle starts.

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::client::MetricsApi;
use crate::error::{ApiError, ErrorInfo};
use crate::types::{Sample, Stats};

pub const REFRESH_PERIOD: Duration = Duration::from_secs(5);
pub const HISTORY_WINDOW_HOURS: NonZeroU32 = match NonZeroU32::new(24) {
    Some(h) => h,
    None => panic!("window must be non-zero"),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Refreshing,
    RefreshFailed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncState {
    pub latest: Option<Sample>,
    /// Newest first.
    pub history: Vec<Sample>,
    pub stats: Option<Stats>,
    pub loading: bool,
    pub error: Option<ErrorInfo>,
    pub auto_refresh_enabled: bool,
    pub phase: Phase,
    /// Cycles that reached an outcome (success or failure) and were published.
    pub completed_cycles: u64,
}

impl SyncState {
    fn initial(auto_refresh_enabled: bool) -> Self {
        Self {
            latest: None,
            history: Vec::new(),
            stats: None,
            loading: true,
            error: None,
            auto_refresh_enabled,
            phase: Phase::Idle,
            completed_cycles: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Refreshed,
    Failed,
    /// Another cycle was already in flight.
    Skipped,
    /// The controller was stopped; nothing was published.
    Discarded,
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub period: Duration,
    pub window_hours: NonZeroU32,
    pub auto_refresh: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            period: REFRESH_PERIOD,
            window_hours: HISTORY_WINDOW_HOURS,
            auto_refresh: true,
        }
    }
}

struct Inner<A> {
    api: A,
    opts: SyncOptions,
    state: watch::Sender<SyncState>,
    in_flight: AtomicBool,
    live: AtomicBool,
    timer: Mutex<Option<JoinHandle<()>>>,
}

pub struct SyncController<A> {
    inner: Arc<Inner<A>>,
}

impl<A> Clone for SyncController<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Snapshot {
    latest: Option<Sample>,
    history: Vec<Sample>,
    stats: Stats,
}

// Released on drop so a cancelled cycle future cannot wedge the gate shut.
struct CycleGate<'a>(&'a AtomicBool);

impl<'a> CycleGate<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for CycleGate<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<A: MetricsApi> SyncController<A> {
    pub fn new(api: A, opts: SyncOptions) -> Self {
        let (state, _) = watch::channel(SyncState::initial(opts.auto_refresh));
        Self {
            inner: Arc::new(Inner {
                api,
                opts,
                state,
                in_flight: AtomicBool::new(false),
                live: AtomicBool::new(true),
                timer: Mutex::new(None),
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> SyncState {
        self.inner.state.borrow().clone()
    }

    pub fn is_live(&self) -> bool {
        self.inner.live.load(Ordering::Acquire)
    }

    /// Runs the first cycle, then arms the timer if auto-refresh is on.
    pub async fn start(&self) -> CycleOutcome {
        let outcome = self.run_cycle().await;
        if self.is_live() && self.inner.state.borrow().auto_refresh_enabled {
            self.arm_timer();
        }
        outcome
    }

    /// Manual trigger. The cycle runs on its own task; the handle reports how it ended.
    pub fn refresh_now(&self) -> JoinHandle<CycleOutcome> {
        let this = self.clone();
        tokio::spawn(async move { this.run_cycle().await })
    }

    /// Turning auto-refresh off cancels the pending tick but lets an in-flight
    /// cycle finish. Turning it on arms a timer without running a cycle now.
    pub fn set_auto_refresh(&self, enabled: bool) {
        if !self.is_live() {
            return;
        }
        self.inner.state.send_if_modified(|s| {
            let changed = s.auto_refresh_enabled != enabled;
            s.auto_refresh_enabled = enabled;
            changed
        });
        if enabled {
            self.arm_timer();
        } else {
            self.disarm_timer();
        }
    }

    /// Cancels the timer. In-flight requests keep running but their results are dropped.
    pub fn stop(&self) {
        // Serialized with commits through the channel's write lock: once this
        // returns, no cycle can publish.
        self.inner.state.send_if_modified(|_| {
            self.inner.live.store(false, Ordering::Release);
            false
        });
        self.disarm_timer();
        debug!("sync controller stopped");
    }

    /// One collect-then-fetch cycle. A no-op while another cycle is in flight.
    pub async fn run_cycle(&self) -> CycleOutcome {
        if !self.is_live() {
            return CycleOutcome::Discarded;
        }
        let Some(_gate) = CycleGate::acquire(&self.inner.in_flight) else {
            debug!("refresh already in flight; skipping");
            return CycleOutcome::Skipped;
        };

        // a failure in this cycle re-populates it
        self.publish(|s| {
            s.phase = Phase::Refreshing;
            s.error = None;
            true
        });
        debug!("refresh cycle started");

        let result = self.fetch_snapshot().await;
        let outcome = match &result {
            Ok(_) => CycleOutcome::Refreshed,
            Err(e) => {
                warn!(error = %e, "refresh cycle failed");
                CycleOutcome::Failed
            }
        };

        let committed = self.publish(move |s| {
            match result {
                Ok(snap) => {
                    s.latest = snap.latest;
                    s.history = snap.history;
                    s.stats = Some(snap.stats);
                    s.error = None;
                    s.phase = Phase::Idle;
                }
                Err(e) => {
                    s.error = Some(ErrorInfo::from(&e));
                    s.phase = Phase::RefreshFailed;
                }
            }
            s.loading = false;
            s.completed_cycles += 1;
            true
        });

        if committed {
            debug!(?outcome, "refresh cycle finished");
            outcome
        } else {
            debug!("controller stopped mid-cycle; result discarded");
            CycleOutcome::Discarded
        }
    }

    async fn fetch_snapshot(&self) -> Result<Snapshot, ApiError> {
        let api = &self.inner.api;
        let hours = self.inner.opts.window_hours;

        // reads must observe the sample we just asked for
        api.trigger_collection().await?;

        let (latest, mut history, stats) = tokio::try_join!(
            async {
                match api.fetch_latest().await {
                    Ok(s) => Ok(Some(s)),
                    Err(ApiError::NotFound(_)) => Ok(None),
                    Err(e) => Err(e),
                }
            },
            api.fetch_history(Some(hours)),
            api.fetch_stats(hours),
        )?;

        history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        history.dedup_by_key(|s| s.timestamp);

        Ok(Snapshot {
            latest,
            history,
            stats,
        })
    }

    // Returns false (and publishes nothing) once the controller is stopped.
    fn publish<F>(&self, modify: F) -> bool
    where
        F: FnOnce(&mut SyncState) -> bool,
    {
        let live = &self.inner.live;
        self.inner.state.send_if_modified(|s| {
            if !live.load(Ordering::Acquire) {
                return false;
            }
            modify(s)
        })
    }

    fn arm_timer(&self) {
        let mut slot = self.inner.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }
        let weak = Arc::downgrade(&self.inner);
        let period = self.inner.opts.period;
        *slot = Some(tokio::spawn(tick_loop(weak, period)));
        debug!(?period, "auto-refresh timer armed");
    }

    fn disarm_timer(&self) {
        let handle = self
            .inner
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(h) = handle {
            h.abort();
            debug!("auto-refresh timer cancelled");
        }
    }
}

// Sleeps a full period after each settled cycle, so a slow cycle delays the next
// tick instead of stacking up behind it.
async fn tick_loop<A: MetricsApi>(weak: Weak<Inner<A>>, period: Duration) {
    loop {
        sleep(period).await;
        let Some(inner) = weak.upgrade() else { break };
        let controller = SyncController { inner };
        if !controller.is_live() {
            break;
        }
        // Own task: aborting this loop must not abort the cycle.
        let cycle = tokio::spawn(async move { controller.run_cycle().await });
        if cycle.await.is_err() {
            break;
        }
    }
}
