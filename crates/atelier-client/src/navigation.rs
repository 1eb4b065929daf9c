//! Route-change progress bar.
//!
//! ```text
//! idle --start--> loading (0..=90, random steps per tick)
//!        --complete | watchdog--> 100 --display delay--> idle
//! ```
//!
//! Only one cycle runs at a time. Starting while a cycle is in flight
//! resets to 0 and restarts every timer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::runtime::Handle;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::events::{EventBus, NavigationSignal, Subscription};

/// Percent the bar creeps towards while waiting for completion.
pub const LOADING_CEILING: u8 = 90;
const STEP_MIN: u8 = 1;
const STEP_MAX: u8 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationProgress {
    pub is_active: bool,
    pub percent: u8,
}

impl NavigationProgress {
    pub const IDLE: Self = Self {
        is_active: false,
        percent: 0,
    };
}

/// Pure state transitions, no timers.
#[derive(Debug, Clone, Default)]
pub struct ProgressMachine {
    progress: NavigationProgress,
}

impl ProgressMachine {
    pub fn progress(&self) -> NavigationProgress {
        self.progress
    }

    pub fn start(&mut self) {
        self.progress = NavigationProgress {
            is_active: true,
            percent: 0,
        };
    }

    /// One random step towards [`LOADING_CEILING`]. No effect once the
    /// bar is idle or complete.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if !self.progress.is_active || self.progress.percent >= LOADING_CEILING {
            return;
        }
        let step = rng.gen_range(STEP_MIN..=STEP_MAX);
        self.progress.percent = self
            .progress
            .percent
            .saturating_add(step)
            .min(LOADING_CEILING);
    }

    /// Snap to 100. Returns `false` when no cycle is active.
    pub fn complete(&mut self) -> bool {
        if !self.progress.is_active {
            return false;
        }
        self.progress.percent = 100;
        true
    }

    pub fn finish(&mut self) {
        self.progress = NavigationProgress::IDLE;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IndicatorTiming {
    /// Interval between progress steps.
    pub tick: Duration,
    /// Upper bound on a cycle when no completion signal arrives.
    pub watchdog: Duration,
    /// How long 100% stays visible before the bar hides.
    pub display_delay: Duration,
}

impl Default for IndicatorTiming {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(200),
            watchdog: Duration::from_secs(8),
            display_delay: Duration::from_millis(400),
        }
    }
}

struct Cycle {
    done: Arc<Notify>,
    task: JoinHandle<()>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Progress indicator driven by tokio timers. Clones share one indicator.
///
/// Cycles run on the runtime that was current when the indicator was
/// created (or the one given to [`with_runtime`](Self::with_runtime)), so
/// navigation signals may come from any thread.
#[derive(Clone)]
pub struct NavigationIndicator {
    timing: IndicatorTiming,
    runtime: Option<Handle>,
    tx: Arc<watch::Sender<NavigationProgress>>,
    generation: Arc<AtomicU64>,
    cycle: Arc<Mutex<Option<Cycle>>>,
}

impl NavigationIndicator {
    pub fn new(timing: IndicatorTiming) -> Self {
        let (tx, _rx) = watch::channel(NavigationProgress::IDLE);
        Self {
            timing,
            runtime: Handle::try_current().ok(),
            tx: Arc::new(tx),
            generation: Arc::new(AtomicU64::new(0)),
            cycle: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn progress(&self) -> NavigationProgress {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<NavigationProgress> {
        self.tx.subscribe()
    }

    /// Begin a cycle, replacing any cycle in flight.
    pub fn start(&self) {
        let Some(runtime) = self.runtime.clone().or_else(|| Handle::try_current().ok()) else {
            warn!("No tokio runtime available, navigation progress not shown");
            return;
        };

        let mut cycle = lock(&self.cycle);
        if let Some(previous) = cycle.take() {
            previous.task.abort();
            debug!("Navigation restarted while in flight");
        }

        // Bump first so a superseded task can no longer publish.
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut machine = ProgressMachine::default();
        machine.start();
        self.tx.send_replace(machine.progress());

        let done = Arc::new(Notify::new());
        let task = runtime.spawn(drive(
            machine,
            self.timing,
            self.tx.clone(),
            self.generation.clone(),
            generation,
            done.clone(),
        ));
        *cycle = Some(Cycle { done, task });
    }

    /// Signal that the route transition finished. No-op when idle.
    pub fn complete(&self) {
        if let Some(cycle) = lock(&self.cycle).as_ref() {
            cycle.done.notify_one();
        }
    }

    /// Drive this indicator from route-change signals until the returned
    /// subscription is dropped.
    pub fn attach(&self, signals: &EventBus<NavigationSignal>) -> Subscription {
        let indicator = self.clone();
        signals.subscribe(move |signal: &NavigationSignal| match signal {
            NavigationSignal::Started { to } => {
                debug!(page = ?to, "Navigation started");
                indicator.start();
            }
            NavigationSignal::Completed { at } => {
                debug!(page = ?at, "Navigation completed");
                indicator.complete();
            }
        })
    }
}

impl Default for NavigationIndicator {
    fn default() -> Self {
        Self::new(IndicatorTiming::default())
    }
}

impl Drop for Cycle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn drive(
    mut machine: ProgressMachine,
    timing: IndicatorTiming,
    tx: Arc<watch::Sender<NavigationProgress>>,
    current: Arc<AtomicU64>,
    generation: u64,
    done: Arc<Notify>,
) {
    let publish = |progress: NavigationProgress| {
        tx.send_if_modified(|value| {
            if current.load(Ordering::SeqCst) != generation || *value == progress {
                return false;
            }
            *value = progress;
            true
        });
    };

    let mut rng = StdRng::from_entropy();
    let mut ticker = tokio::time::interval(timing.tick);
    ticker.tick().await;
    let watchdog = tokio::time::sleep(timing.watchdog);
    tokio::pin!(watchdog);

    loop {
        tokio::select! {
            biased;
            _ = done.notified() => break,
            _ = &mut watchdog => {
                warn!("No navigation completion signal, forcing progress to 100");
                break;
            }
            _ = ticker.tick() => {
                machine.advance(&mut rng);
                publish(machine.progress());
            }
        }
    }

    machine.complete();
    publish(machine.progress());

    tokio::time::sleep(timing.display_delay).await;
    machine.finish();
    publish(machine.progress());
}
