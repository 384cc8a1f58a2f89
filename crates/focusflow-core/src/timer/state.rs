use serde::{Deserialize, Serialize};

use super::config::TimerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Focus,
    ShortBreak,
    LongBreak,
}

impl Phase {
    pub fn is_break(self) -> bool {
        matches!(self, Phase::ShortBreak | Phase::LongBreak)
    }

    /// Human-readable title used by the notification and status line.
    pub fn title(self) -> &'static str {
        match self {
            Phase::Focus => "Focus",
            Phase::ShortBreak => "Short break",
            Phase::LongBreak => "Long break",
        }
    }
}

/// Immutable view of the engine at one point in time.
///
/// The engine never mutates a published snapshot; every change produces a
/// new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase: Phase,
    /// Always within `0..=total_seconds`.
    pub remaining_seconds: u32,
    /// Full length of the current phase under the active configuration.
    pub total_seconds: u32,
    pub is_running: bool,
    /// Focus phases that ran down to zero. Skips don't count.
    pub completed_pomodoros: u32,
    /// Completed focus phases since the last long break.
    pub cycle_count: u32,
}

impl TimerSnapshot {
    /// Stopped Focus snapshot at full duration with zeroed counters.
    pub fn initial(config: &TimerConfig) -> Self {
        Self::fresh_focus(config, 0, 0)
    }

    pub(crate) fn fresh_focus(config: &TimerConfig, completed: u32, cycle_count: u32) -> Self {
        let total = config.seconds_for(Phase::Focus);
        Self {
            phase: Phase::Focus,
            remaining_seconds: total,
            total_seconds: total,
            is_running: false,
            completed_pomodoros: completed,
            cycle_count,
        }
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.total_seconds.saturating_sub(self.remaining_seconds)
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn progress(&self) -> f64 {
        if self.total_seconds == 0 {
            return 0.0;
        }
        1.0 - (f64::from(self.remaining_seconds) / f64::from(self.total_seconds))
    }

    /// Remaining time as `MM:SS`. Minutes are not wrapped at 60.
    pub fn format_remaining(&self) -> String {
        format_mm_ss(self.remaining_seconds)
    }
}

pub fn format_mm_ss(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
