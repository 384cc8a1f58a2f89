use serde::{Deserialize, Serialize};

use super::state::Phase;

/// Lower bound applied to every duration and to the long-break cadence.
pub const MIN_MINUTES: u32 = 1;

/// Upper bound for a single phase. Keeps `minutes * 60` well inside `u32`.
pub const MAX_PHASE_MINUTES: u32 = 24 * 60;

/// Immutable timer configuration.
///
/// Values are clamped on construction, so a countdown can never start with a
/// zero-length phase. Replace the whole value to reconfigure the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawTimerConfig", into = "RawTimerConfig")]
pub struct TimerConfig {
    focus_minutes: u32,
    short_break_minutes: u32,
    long_break_minutes: u32,
    cycles_until_long_break: u32,
    auto_continue: bool,
}

/// Serialized form. Deserialization goes through [`TimerConfig::new`] so
/// hand-edited values are clamped too.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawTimerConfig {
    focus_minutes: i64,
    short_break_minutes: i64,
    long_break_minutes: i64,
    cycles_until_long_break: i64,
    #[serde(default)]
    auto_continue: bool,
}

impl From<RawTimerConfig> for TimerConfig {
    fn from(raw: RawTimerConfig) -> Self {
        Self::new(
            raw.focus_minutes,
            raw.short_break_minutes,
            raw.long_break_minutes,
            raw.cycles_until_long_break,
        )
        .with_auto_continue(raw.auto_continue)
    }
}

impl From<TimerConfig> for RawTimerConfig {
    fn from(cfg: TimerConfig) -> Self {
        Self {
            focus_minutes: cfg.focus_minutes.into(),
            short_break_minutes: cfg.short_break_minutes.into(),
            long_break_minutes: cfg.long_break_minutes.into(),
            cycles_until_long_break: cfg.cycles_until_long_break.into(),
            auto_continue: cfg.auto_continue,
        }
    }
}

fn clamp_minutes(value: i64, max: u32) -> u32 {
    value.clamp(i64::from(MIN_MINUTES), i64::from(max)) as u32
}

impl TimerConfig {
    /// Build a configuration, clamping each value to `1..=MAX_PHASE_MINUTES`
    /// (cadence to `1..=u32::MAX`).
    ///
    /// Takes signed input so callers holding user-entered numbers don't have
    /// to pre-validate.
    pub fn new(
        focus_minutes: i64,
        short_break_minutes: i64,
        long_break_minutes: i64,
        cycles_until_long_break: i64,
    ) -> Self {
        Self {
            focus_minutes: clamp_minutes(focus_minutes, MAX_PHASE_MINUTES),
            short_break_minutes: clamp_minutes(short_break_minutes, MAX_PHASE_MINUTES),
            long_break_minutes: clamp_minutes(long_break_minutes, MAX_PHASE_MINUTES),
            cycles_until_long_break: clamp_minutes(cycles_until_long_break, u32::MAX),
            auto_continue: false,
        }
    }

    /// Keep running into the next phase when a countdown reaches zero.
    pub fn with_auto_continue(mut self, auto_continue: bool) -> Self {
        self.auto_continue = auto_continue;
        self
    }

    pub fn focus_minutes(&self) -> u32 {
        self.focus_minutes
    }

    pub fn short_break_minutes(&self) -> u32 {
        self.short_break_minutes
    }

    pub fn long_break_minutes(&self) -> u32 {
        self.long_break_minutes
    }

    pub fn cycles_until_long_break(&self) -> u32 {
        self.cycles_until_long_break
    }

    pub fn auto_continue(&self) -> bool {
        self.auto_continue
    }

    /// Full countdown length for `phase`, in seconds.
    pub fn seconds_for(&self, phase: Phase) -> u32 {
        let minutes = match phase {
            Phase::Focus => self.focus_minutes,
            Phase::ShortBreak => self.short_break_minutes,
            Phase::LongBreak => self.long_break_minutes,
        };
        minutes * 60
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self::new(25, 5, 15, 4)
    }
}
