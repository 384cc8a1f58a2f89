//! Daily focus totals.
//!
//! [`SummaryTracker`] turns the engine's snapshot stream into focus-time
//! increments. It relies only on consecutive snapshots, so it stays correct
//! when a `watch` receiver coalesces several ticks into one change.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::timer::{Phase, TimerSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub focus_seconds: u64,
    pub completed_focus_sessions: u32,
}

impl DailySummary {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            focus_seconds: 0,
            completed_focus_sessions: 0,
        }
    }

    pub fn focus_minutes(&self) -> u64 {
        self.focus_seconds / 60
    }

    /// `1h 05m`, or `25m` under an hour.
    pub fn format_focus(&self) -> String {
        let minutes = self.focus_minutes();
        if minutes >= 60 {
            format!("{}h {:02}m", minutes / 60, minutes % 60)
        } else {
            format!("{minutes}m")
        }
    }
}

/// Increment to add to today's totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SummaryProgress {
    pub focus_seconds: u64,
    pub completed_sessions: u32,
}

impl SummaryProgress {
    pub fn is_empty(&self) -> bool {
        self.focus_seconds == 0 && self.completed_sessions == 0
    }
}

/// Somewhere to put summary progress.
///
/// [`SessionService`](crate::SessionService) calls `record` directly from its
/// async loop, at most once per tick. Implementations must return quickly; a
/// slow backend should hand the write to `tokio::task::spawn_blocking` itself.
pub trait SummarySink: Send {
    fn record(&self, progress: SummaryProgress) -> Result<()>;
}

/// Derives focus progress from consecutive snapshots.
#[derive(Debug, Default)]
pub struct SummaryTracker {
    last: Option<TimerSnapshot>,
}

impl SummaryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next snapshot. Returns the progress made since the previous
    /// one, if any.
    ///
    /// - Focus time is the drop in remaining seconds while a Focus phase was
    ///   running. A countdown replaced by a reset or a new configuration
    ///   adds nothing.
    /// - A Focus phase that ends with `completed_pomodoros` going up is a
    ///   completed session; its last observed remaining seconds count as
    ///   focus time too.
    /// - A skipped Focus phase adds nothing.
    pub fn observe(&mut self, snapshot: &TimerSnapshot) -> Option<SummaryProgress> {
        let previous = self.last.replace(*snapshot)?;
        if previous.phase != Phase::Focus || !previous.is_running {
            return None;
        }

        let progress = match snapshot.phase {
            Phase::Focus
                if snapshot.total_seconds == previous.total_seconds
                    && snapshot.remaining_seconds <= previous.remaining_seconds =>
            {
                SummaryProgress {
                    focus_seconds: u64::from(
                        previous.remaining_seconds - snapshot.remaining_seconds,
                    ),
                    completed_sessions: 0,
                }
            }
            Phase::Focus => return None,
            Phase::ShortBreak | Phase::LongBreak
                if snapshot.completed_pomodoros > previous.completed_pomodoros =>
            {
                SummaryProgress {
                    focus_seconds: u64::from(previous.remaining_seconds),
                    completed_sessions: 1,
                }
            }
            Phase::ShortBreak | Phase::LongBreak => return None,
        };

        (!progress.is_empty()).then_some(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{transition, TimerConfig};

    fn running(snap: TimerSnapshot) -> TimerSnapshot {
        TimerSnapshot {
            is_running: true,
            ..snap
        }
    }

    #[test]
    fn first_snapshot_is_a_baseline() {
        let mut tracker = SummaryTracker::new();
        let snap = running(TimerSnapshot::initial(&TimerConfig::default()));
        assert_eq!(tracker.observe(&snap), None);
    }

    #[test]
    fn full_focus_phase_adds_its_duration_and_one_session() {
        let config = TimerConfig::new(1, 1, 2, 4);
        let mut tracker = SummaryTracker::new();
        let mut snap = TimerSnapshot::initial(&config);
        tracker.observe(&snap);
        snap = running(snap);
        tracker.observe(&snap);

        let mut total = SummaryProgress::default();
        while snap.phase == Phase::Focus {
            snap = transition::tick(&snap, &config).unwrap().snapshot();
            if let Some(p) = tracker.observe(&snap) {
                total.focus_seconds += p.focus_seconds;
                total.completed_sessions += p.completed_sessions;
            }
        }
        assert_eq!(total.focus_seconds, 60);
        assert_eq!(total.completed_sessions, 1);
    }

    #[test]
    fn coalesced_ticks_are_counted() {
        let config = TimerConfig::new(1, 1, 2, 4);
        let mut tracker = SummaryTracker::new();
        let start = running(TimerSnapshot::initial(&config));
        tracker.observe(&start);
        let later = TimerSnapshot {
            remaining_seconds: 40,
            ..start
        };
        assert_eq!(
            tracker.observe(&later).unwrap(),
            SummaryProgress {
                focus_seconds: 20,
                completed_sessions: 0
            }
        );
        let next = transition::advance(&later, &config, false);
        assert_eq!(
            tracker.observe(&next).unwrap(),
            SummaryProgress {
                focus_seconds: 40,
                completed_sessions: 1
            }
        );
    }

    #[test]
    fn pause_keeps_seconds_ticked_before_it() {
        let config = TimerConfig::default();
        let mut tracker = SummaryTracker::new();
        let start = running(TimerSnapshot::initial(&config));
        tracker.observe(&start);
        let paused = TimerSnapshot {
            remaining_seconds: start.remaining_seconds - 3,
            is_running: false,
            ..start
        };
        assert_eq!(tracker.observe(&paused).unwrap().focus_seconds, 3);
    }

    #[test]
    fn skipped_focus_adds_nothing() {
        let config = TimerConfig::default();
        let mut tracker = SummaryTracker::new();
        let start = running(TimerSnapshot::initial(&config));
        tracker.observe(&start);
        let skipped = transition::advance(&start, &config, true);
        assert_eq!(tracker.observe(&skipped), None);
    }

    #[test]
    fn break_time_is_not_focus_time() {
        let config = TimerConfig::new(1, 1, 2, 4);
        let mut tracker = SummaryTracker::new();
        let brk = running(transition::advance(
            &TimerSnapshot::initial(&config),
            &config,
            true,
        ));
        tracker.observe(&brk);
        let ticked = transition::tick(&brk, &config).unwrap().snapshot();
        assert_eq!(tracker.observe(&ticked), None);
    }

    #[test]
    fn reset_does_not_produce_negative_time() {
        let config = TimerConfig::default();
        let mut tracker = SummaryTracker::new();
        let start = running(TimerSnapshot {
            remaining_seconds: 100,
            ..TimerSnapshot::initial(&config)
        });
        tracker.observe(&start);
        assert_eq!(tracker.observe(&TimerSnapshot::initial(&config)), None);
    }

    #[test]
    fn shorter_focus_after_reconfigure_adds_nothing() {
        let long = TimerConfig::new(25, 5, 15, 4);
        let short = TimerConfig::new(1, 5, 15, 4);
        let mut tracker = SummaryTracker::new();
        let start = running(TimerSnapshot::initial(&long));
        tracker.observe(&start);
        let ticked = transition::tick(&start, &long).unwrap().snapshot();
        assert_eq!(tracker.observe(&ticked).unwrap().focus_seconds, 1);

        // Restarted at 60s of a new 60s countdown: not 1439s of focus.
        let restarted = running(TimerSnapshot::initial(&short));
        assert_eq!(tracker.observe(&restarted), None);
        let ticked = transition::tick(&restarted, &short).unwrap().snapshot();
        assert_eq!(tracker.observe(&ticked).unwrap().focus_seconds, 1);
    }

    #[test]
    fn formats_focus_time() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let mut s = DailySummary::empty(date);
        s.focus_seconds = 25 * 60 + 59;
        assert_eq!(s.format_focus(), "25m");
        s.focus_seconds = 65 * 60;
        assert_eq!(s.format_focus(), "1h 05m");
    }
}
