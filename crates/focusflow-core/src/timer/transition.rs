//! Pure phase/countdown rules.
//!
//! Both functions map one snapshot to the next without touching time or
//! tasks; the engine applies them under its writer lock.

use super::config::TimerConfig;
use super::state::{Phase, TimerSnapshot};

/// Result of applying one tick to a running snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Countdown moved one second and is still above zero.
    Counting(TimerSnapshot),
    /// Countdown hit zero; the snapshot is the start of the next phase.
    PhaseEnded(TimerSnapshot),
}

impl TickOutcome {
    pub fn snapshot(&self) -> TimerSnapshot {
        match *self {
            TickOutcome::Counting(s) | TickOutcome::PhaseEnded(s) => s,
        }
    }
}

/// Decrement a running countdown by one second.
///
/// Returns `None` when the snapshot is stopped; a stopped timer never ticks.
pub fn tick(current: &TimerSnapshot, config: &TimerConfig) -> Option<TickOutcome> {
    if !current.is_running {
        return None;
    }
    let next = current.remaining_seconds.saturating_sub(1);
    if next > 0 {
        Some(TickOutcome::Counting(TimerSnapshot {
            remaining_seconds: next,
            ..*current
        }))
    } else {
        Some(TickOutcome::PhaseEnded(advance(current, config, false)))
    }
}

/// Move to the next phase.
///
/// A Focus phase that ran out counts as a completed pomodoro; a skipped one
/// does not, and never earns a long break. Every break leads back to Focus.
/// After a timeout the next phase keeps running only under `auto_continue`;
/// after a skip the timer is always stopped.
pub fn advance(current: &TimerSnapshot, config: &TimerConfig, skipped: bool) -> TimerSnapshot {
    let is_running = !skipped && current.is_running && config.auto_continue();
    match current.phase {
        Phase::Focus => {
            let (completed, cycle_count) = if skipped {
                (current.completed_pomodoros, current.cycle_count)
            } else {
                (
                    current.completed_pomodoros.saturating_add(1),
                    current.cycle_count.saturating_add(1),
                )
            };
            let next = if long_break_due(completed, config) && !skipped {
                Phase::LongBreak
            } else {
                Phase::ShortBreak
            };
            let total = config.seconds_for(next);
            TimerSnapshot {
                phase: next,
                remaining_seconds: total,
                total_seconds: total,
                is_running,
                completed_pomodoros: completed,
                cycle_count,
            }
        }
        Phase::ShortBreak | Phase::LongBreak => {
            let cycle_count = if current.phase == Phase::LongBreak {
                0
            } else {
                current.cycle_count
            };
            TimerSnapshot {
                is_running,
                ..TimerSnapshot::fresh_focus(config, current.completed_pomodoros, cycle_count)
            }
        }
    }
}

/// The first long break follows exactly `cycles_until_long_break` completions.
pub fn long_break_due(completed: u32, config: &TimerConfig) -> bool {
    completed > 0 && completed % config.cycles_until_long_break() == 0
}
