//! Background session service.
//!
//! Follows the engine's snapshots, keeps the ongoing notification current and
//! feeds focus progress into the daily summary. Collaborator failures are
//! logged and counted; they never stop the loop or touch the engine.
//!
//! The service holds the engine only long enough to subscribe, so dropping the
//! engine ends the loop.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::notification::{render, Notification, Notifier};
use crate::summary::{SummarySink, SummaryTracker};
use crate::timer::{EngineSlot, TimerEngine, TimerSnapshot};

/// Counters returned when the service stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceReport {
    pub snapshots_seen: u64,
    pub notifications_sent: u64,
    pub notify_failures: u64,
    pub summary_failures: u64,
}

pub struct SessionService {
    engine: Arc<TimerEngine>,
    notifier: Option<Box<dyn Notifier>>,
    sink: Option<Box<dyn SummarySink>>,
}

impl SessionService {
    pub fn new(engine: Arc<TimerEngine>) -> Self {
        Self {
            engine,
            notifier: None,
            sink: None,
        }
    }

    /// Attach to whatever engine `slot` currently holds. `None` when the slot
    /// is empty; there is nothing to show.
    pub fn from_slot(slot: &EngineSlot) -> Option<Self> {
        slot.current().map(Self::new)
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Some(Box::new(notifier));
        self
    }

    pub fn with_summary_sink(mut self, sink: impl SummarySink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn engine(&self) -> &Arc<TimerEngine> {
        &self.engine
    }

    /// Run until `cancel` fires or the engine is dropped.
    ///
    /// ```rust,ignore
    /// let cancel = CancellationToken::new();
    /// let service = SessionService::new(engine.clone()).with_summary_sink(db);
    /// tokio::spawn(service.run(cancel.child_token()));
    /// ```
    pub async fn run(self, cancel: CancellationToken) -> ServiceReport {
        let Self {
            engine,
            notifier,
            sink,
        } = self;
        let mut rx = engine.subscribe();
        drop(engine);

        let mut state = LoopState {
            notifier,
            sink,
            tracker: SummaryTracker::new(),
            last_notification: None,
            report: ServiceReport::default(),
        };

        let initial = *rx.borrow_and_update();
        info!(phase = ?initial.phase, "session service started");
        state.handle(&initial);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("session service cancelled");
                    break;
                }
                changed = rx.changed() => {
                    if changed.is_err() {
                        info!("timer engine dropped, session service stopping");
                        break;
                    }
                    let snapshot = *rx.borrow_and_update();
                    state.handle(&snapshot);
                }
            }
        }
        state.report
    }
}

struct LoopState {
    notifier: Option<Box<dyn Notifier>>,
    sink: Option<Box<dyn SummarySink>>,
    tracker: SummaryTracker,
    last_notification: Option<Notification>,
    report: ServiceReport,
}

impl LoopState {
    fn handle(&mut self, snapshot: &TimerSnapshot) {
        self.report.snapshots_seen += 1;

        if let Some(notifier) = self.notifier.as_mut() {
            let notification = render(snapshot);
            if self.last_notification.as_ref() != Some(&notification) {
                match notifier.notify(&notification) {
                    Ok(()) => {
                        self.report.notifications_sent += 1;
                        self.last_notification = Some(notification);
                    }
                    Err(e) => {
                        self.report.notify_failures += 1;
                        warn!(error = %e, "failed to deliver timer notification");
                    }
                }
            }
        }

        if let Some(progress) = self.tracker.observe(snapshot) {
            debug!(
                focus_seconds = progress.focus_seconds,
                completed_sessions = progress.completed_sessions,
                "focus progress"
            );
            if let Some(sink) = self.sink.as_ref() {
                // Runs inline on the runtime; sinks write at most one row per tick.
                if let Err(e) = sink.record(progress) {
                    self.report.summary_failures += 1;
                    warn!(error = %e, "failed to record daily summary progress");
                }
            }
        }
    }
}
