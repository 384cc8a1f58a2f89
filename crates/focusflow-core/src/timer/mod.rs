mod config;
mod engine;
pub mod registry;
mod state;
pub mod transition;

pub use config::{TimerConfig, MAX_PHASE_MINUTES, MIN_MINUTES};
pub use engine::{TimerControl, TimerEngine, TICK};
pub use registry::EngineSlot;
pub use state::{format_mm_ss, Phase, TimerSnapshot};
pub use transition::TickOutcome;
