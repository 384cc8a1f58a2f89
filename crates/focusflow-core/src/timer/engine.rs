//! Timer engine implementation.
//!
//! The engine owns one live [`TimerSnapshot`] and one [`TimerConfig`]. While
//! running, a Tokio task sleeps one second between decrements. All writes go
//! through a single mutex and are published on a `watch` channel, so readers
//! always see a complete snapshot and never a torn one.
//!
//! ## Cancellation
//!
//! Every tick loop is tagged with a generation number. Stopping the loop bumps
//! the generation under the writer lock and aborts the task; a tick that was
//! already waiting for the lock sees a stale generation and publishes nothing.
//! Once `pause()` returns, no further decrement can land.
//!
//! ## Usage
//!
//! ```ignore
//! let engine = Arc::new(TimerEngine::new(TimerConfig::default()));
//! let mut rx = engine.subscribe();
//! engine.start();
//! while rx.changed().await.is_ok() {
//!     println!("{}", rx.borrow().format_remaining());
//! }
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::config::TimerConfig;
use super::state::TimerSnapshot;
use super::transition::{self, TickOutcome};
use crate::events::Event;

/// Interval between decrements.
pub const TICK: Duration = Duration::from_secs(1);

const EVENT_CAPACITY: usize = 64;

/// Control surface shared by the engine and anything standing in for it.
pub trait TimerControl: Send + Sync {
    fn state(&self) -> TimerSnapshot;
    fn set_config(&self, config: TimerConfig);
    fn start(&self);
    fn pause(&self);
    fn reset_to_focus(&self);
    fn skip_phase(&self);
}

/// Focus/break countdown with a background one-second tick loop.
pub struct TimerEngine {
    shared: Arc<Shared>,
    runtime: Handle,
}

struct Shared {
    inner: Mutex<Inner>,
    state_tx: watch::Sender<TimerSnapshot>,
    events_tx: broadcast::Sender<Event>,
}

struct Inner {
    config: TimerConfig,
    generation: u64,
    ticker: Option<JoinHandle<()>>,
}

impl TimerEngine {
    /// Create a stopped engine at the start of a Focus phase.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime, like `tokio::spawn`.
    /// Use [`with_runtime`](Self::with_runtime) to pass a handle explicitly.
    pub fn new(config: TimerConfig) -> Self {
        Self::with_runtime(config, Handle::current())
    }

    /// Create an engine whose tick loop runs on `runtime`.
    pub fn with_runtime(config: TimerConfig, runtime: Handle) -> Self {
        let (state_tx, _) = watch::channel(TimerSnapshot::initial(&config));
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    config,
                    generation: 0,
                    ticker: None,
                }),
                state_tx,
                events_tx,
            }),
            runtime,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> TimerConfig {
        self.shared.lock().config
    }

    /// Receiver that always holds the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.shared.state_tx.subscribe()
    }

    /// Stream of discrete events. Slow receivers may lag and lose events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<Event> {
        self.shared.events_tx.subscribe()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Reset to a stopped Focus phase and zero the counters.
    pub fn full_reset(&self) {
        let mut inner = self.shared.lock();
        Shared::stop_ticker(&mut inner);
        let snapshot = TimerSnapshot::initial(&inner.config);
        self.shared.publish(snapshot);
        info!("timer fully reset");
        self.shared.emit(Event::TimerReset {
            full: true,
            at: Utc::now(),
        });
    }

    fn spawn_ticker(&self, inner: &mut Inner) {
        Shared::stop_ticker(inner);
        let shared = Arc::clone(&self.shared);
        let generation = inner.generation;
        inner.ticker = Some(self.runtime.spawn(run_ticker(shared, generation)));
    }
}

impl TimerControl for TimerEngine {
    fn state(&self) -> TimerSnapshot {
        *self.shared.state_tx.borrow()
    }

    /// Identical configurations are ignored. Anything else stops the timer
    /// and restarts Focus at the new duration; the counters are kept.
    fn set_config(&self, config: TimerConfig) {
        let mut inner = self.shared.lock();
        if inner.config == config {
            debug!("config unchanged, ignoring");
            return;
        }
        Shared::stop_ticker(&mut inner);
        inner.config = config;
        let current = self.shared.current();
        let snapshot =
            TimerSnapshot::fresh_focus(&config, current.completed_pomodoros, current.cycle_count);
        self.shared.publish(snapshot);
        info!(
            focus_minutes = config.focus_minutes(),
            short_break_minutes = config.short_break_minutes(),
            long_break_minutes = config.long_break_minutes(),
            cycles_until_long_break = config.cycles_until_long_break(),
            "timer reconfigured"
        );
        self.shared.emit(Event::ConfigChanged {
            config,
            at: Utc::now(),
        });
    }

    fn start(&self) {
        let mut inner = self.shared.lock();
        let current = self.shared.current();
        if current.is_running {
            return;
        }
        let snapshot = TimerSnapshot {
            is_running: true,
            ..current
        };
        self.shared.publish(snapshot);
        self.spawn_ticker(&mut inner);
        info!(phase = ?snapshot.phase, remaining = snapshot.remaining_seconds, "timer started");
        self.shared.emit(Event::TimerStarted {
            phase: snapshot.phase,
            remaining_seconds: snapshot.remaining_seconds,
            at: Utc::now(),
        });
    }

    fn pause(&self) {
        let mut inner = self.shared.lock();
        let current = self.shared.current();
        if !current.is_running {
            return;
        }
        Shared::stop_ticker(&mut inner);
        let snapshot = TimerSnapshot {
            is_running: false,
            ..current
        };
        self.shared.publish(snapshot);
        info!(phase = ?snapshot.phase, remaining = snapshot.remaining_seconds, "timer paused");
        self.shared.emit(Event::TimerPaused {
            phase: snapshot.phase,
            remaining_seconds: snapshot.remaining_seconds,
            at: Utc::now(),
        });
    }

    fn reset_to_focus(&self) {
        let mut inner = self.shared.lock();
        Shared::stop_ticker(&mut inner);
        let current = self.shared.current();
        let snapshot = TimerSnapshot::fresh_focus(
            &inner.config,
            current.completed_pomodoros,
            current.cycle_count,
        );
        self.shared.publish(snapshot);
        info!("timer reset to focus");
        self.shared.emit(Event::TimerReset {
            full: false,
            at: Utc::now(),
        });
    }

    fn skip_phase(&self) {
        let mut inner = self.shared.lock();
        Shared::stop_ticker(&mut inner);
        let current = self.shared.current();
        let next = transition::advance(&current, &inner.config, true);
        self.shared.publish(next);
        info!(from = ?current.phase, to = ?next.phase, "phase skipped");
        self.shared.emit(Event::PhaseCompleted {
            from: current.phase,
            to: next.phase,
            skipped: true,
            completed_pomodoros: next.completed_pomodoros,
            at: Utc::now(),
        });
    }
}

impl Drop for TimerEngine {
    fn drop(&mut self) {
        Shared::stop_ticker(&mut self.shared.lock());
    }
}

impl std::fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("state", &self.state())
            .field("config", &self.config())
            .finish()
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock can't leave a half-written snapshot:
        // snapshots are replaced whole.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current(&self) -> TimerSnapshot {
        *self.state_tx.borrow()
    }

    fn publish(&self, snapshot: TimerSnapshot) {
        self.state_tx.send_replace(snapshot);
    }

    fn emit(&self, event: Event) {
        // No subscribers is fine.
        let _ = self.events_tx.send(event);
    }

    fn stop_ticker(inner: &mut Inner) {
        inner.generation = inner.generation.wrapping_add(1);
        if let Some(handle) = inner.ticker.take() {
            handle.abort();
        }
    }

    /// Apply one tick for loop `generation`. Returns false when the loop
    /// should exit.
    fn apply_tick(&self, generation: u64) -> bool {
        let mut inner = self.lock();
        if inner.generation != generation {
            return false;
        }
        let current = self.current();
        let Some(outcome) = transition::tick(&current, &inner.config) else {
            inner.ticker = None;
            return false;
        };
        let next = outcome.snapshot();
        self.publish(next);
        if let TickOutcome::PhaseEnded(_) = outcome {
            info!(
                from = ?current.phase,
                to = ?next.phase,
                completed = next.completed_pomodoros,
                "phase completed"
            );
            self.emit(Event::PhaseCompleted {
                from: current.phase,
                to: next.phase,
                skipped: false,
                completed_pomodoros: next.completed_pomodoros,
                at: Utc::now(),
            });
        }
        if !next.is_running {
            // The handle belongs to this task; dropping it just detaches.
            inner.ticker = None;
            return false;
        }
        true
    }
}

async fn run_ticker(shared: Arc<Shared>, generation: u64) {
    debug!(generation, "tick loop started");
    loop {
        tokio::time::sleep(TICK).await;
        if !shared.apply_tick(generation) {
            break;
        }
    }
    debug!(generation, "tick loop finished");
}
