use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Phase, TimerConfig};

/// Every control operation and phase change produces an Event.
///
/// Snapshots carry the full state; events say what happened. Observers that
/// only care about the latest state can ignore these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        phase: Phase,
        remaining_seconds: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: Phase,
        remaining_seconds: u32,
        at: DateTime<Utc>,
    },
    /// `full` is set when the counters were zeroed too.
    TimerReset {
        full: bool,
        at: DateTime<Utc>,
    },
    PhaseCompleted {
        from: Phase,
        to: Phase,
        skipped: bool,
        completed_pomodoros: u32,
        at: DateTime<Utc>,
    },
    ConfigChanged {
        config: TimerConfig,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::TimerStarted { at, .. }
            | Event::TimerPaused { at, .. }
            | Event::TimerReset { at, .. }
            | Event::PhaseCompleted { at, .. }
            | Event::ConfigChanged { at, .. } => *at,
        }
    }

    /// True for a Focus phase that ran down to zero.
    pub fn is_completed_focus(&self) -> bool {
        matches!(
            self,
            Event::PhaseCompleted {
                from: Phase::Focus,
                skipped: false,
                ..
            }
        )
    }
}
