//! Real-time driver for a [`Sequencer`].
//!
//! A `SessionHandle` owns one sequencer behind a mutex and spawns a tokio
//! task that ticks it on a fixed period. Ticks are anchored to the nominal
//! schedule (`interval_at`), so a slow tick does not push every later tick
//! back.
//!
//! Control operations and the tick callback serialize on the same lock.
//! The tick callback re-checks the cancellation token and the pause flag
//! after taking the lock, so a tick that fires concurrently with `stop()`
//! or `pause()` is discarded.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::config::BreathingConfig;
use super::sequencer::{Sequencer, SequencerState, SessionSummary};
use crate::error::{CoreError, Result};
use crate::events::Event;

/// Timing knobs for the harness.
#[derive(Debug, Clone)]
pub struct HarnessOptions {
    /// Real time between ticks (default: 1 second)
    pub tick_interval: Duration,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
        }
    }
}

impl HarnessOptions {
    #[must_use]
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub summary: SessionSummary,
    /// `true` on natural completion, `false` if stopped early.
    pub completed: bool,
}

struct Shared {
    sequencer: Sequencer,
    /// Bumped on resume/restart so the ticker re-anchors its schedule.
    generation: u64,
    events: mpsc::UnboundedSender<Event>,
    receiver_gone: bool,
}

impl Shared {
    fn emit(&mut self, event: Event) {
        if self.events.send(event).is_err() && !self.receiver_gone {
            self.receiver_gone = true;
            tracing::warn!("session event receiver dropped; continuing without observers");
        }
    }
}

/// A running breathing session.
///
/// Dropping the handle cancels the ticker.
pub struct SessionHandle {
    shared: Arc<Mutex<Shared>>,
    cancel: CancellationToken,
    rearm: Arc<Notify>,
    task: Option<JoinHandle<()>>,
}

impl SessionHandle {
    /// Start a session and its ticker on the current tokio runtime.
    ///
    /// The initial `PhaseEntered(Inhale, 1)` is sent before this returns.
    ///
    /// # Errors
    /// Returns a validation error for an invalid config, or
    /// [`CoreError::Runtime`] when called outside a tokio runtime.
    pub fn spawn(
        config: BreathingConfig,
        options: HarnessOptions,
        events: mpsc::UnboundedSender<Event>,
    ) -> Result<Self> {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|e| CoreError::Runtime(e.to_string()))?;
        let (sequencer, first) = Sequencer::start(config)?;

        let mut shared = Shared {
            sequencer,
            generation: 0,
            events,
            receiver_gone: false,
        };
        shared.emit(first);

        let shared = Arc::new(Mutex::new(shared));
        let cancel = CancellationToken::new();
        let rearm = Arc::new(Notify::new());

        tracing::debug!(pattern = %config.pattern(), sets = config.sets, "session started");
        let task = runtime.spawn(run_ticker(
            Arc::clone(&shared),
            cancel.clone(),
            Arc::clone(&rearm),
            options.tick_interval,
        ));

        Ok(Self {
            shared,
            cancel,
            rearm,
            task: Some(task),
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SequencerState {
        self.shared.lock().sequencer.state()
    }

    pub fn config(&self) -> BreathingConfig {
        *self.shared.lock().sequencer.config()
    }

    pub fn is_finished(&self) -> bool {
        self.shared.lock().sequencer.is_finished()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Returns `false` if the session was already paused or has ended.
    pub fn pause(&self) -> bool {
        let paused = self.shared.lock().sequencer.pause();
        if paused {
            tracing::debug!("session paused");
        }
        paused
    }

    pub fn resume(&self) -> bool {
        let mut shared = self.shared.lock();
        if !shared.sequencer.resume() {
            return false;
        }
        shared.generation += 1;
        self.rearm.notify_one();
        tracing::debug!("session resumed");
        true
    }

    pub fn restart(&self) -> bool {
        let mut shared = self.shared.lock();
        let Some(event) = shared.sequencer.restart() else {
            return false;
        };
        shared.generation += 1;
        shared.emit(event);
        self.rearm.notify_one();
        tracing::debug!("session restarted");
        true
    }

    /// Stop immediately. No event is delivered after this returns.
    pub fn stop(&self) -> SessionSummary {
        let mut shared = self.shared.lock();
        self.cancel.cancel();
        let summary = shared.sequencer.stop();
        tracing::debug!(completed_sets = summary.completed_sets, "session stopped");
        summary
    }

    /// Resolves once the session has completed or been stopped.
    pub async fn finished(&self) {
        self.cancel.cancelled().await;
    }

    /// Wait until the session completes or is stopped.
    pub async fn wait(mut self) -> SessionOutcome {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!("session ticker failed: {e}");
                self.cancel.cancel();
            }
        }
        let mut shared = self.shared.lock();
        let completed = shared.sequencer.is_completed();
        SessionOutcome {
            summary: shared.sequencer.stop(),
            completed,
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_ticker(
    shared: Arc<Mutex<Shared>>,
    cancel: CancellationToken,
    rearm: Arc<Notify>,
    period: Duration,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
    let mut seen_generation = shared.lock().generation;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = rearm.notified() => {
                seen_generation = shared.lock().generation;
                ticker.reset();
                continue;
            }
            _ = ticker.tick() => {}
        }

        let mut guard = shared.lock();
        if cancel.is_cancelled() {
            break;
        }
        if guard.generation != seen_generation {
            // Fired between a resume and its rearm.
            seen_generation = guard.generation;
            drop(guard);
            ticker.reset();
            continue;
        }
        if let Some(event) = guard.sequencer.tick() {
            let done = event.is_terminal();
            guard.emit(event);
            if done {
                cancel.cancel();
                tracing::debug!("session completed");
                break;
            }
        }
    }
}
