//! # FocusFlow Core Library
//!
//! Core logic for the FocusFlow Pomodoro timer. The `focusflow` CLI is a thin
//! layer over this crate; everything it does is available here.
//!
//! ## Architecture
//!
//! - **Timer Engine**: An async state machine that owns a 1 Hz ticker on the
//!   tokio runtime and publishes immutable snapshots through a `watch` cell
//! - **Storage**: SQLite for tasks and daily focus totals, TOML for settings
//! - **Session Service**: Background loop that mirrors the timer into an
//!   ongoing notification and feeds the daily summary
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Timer state machine and snapshot publisher
//! - [`TimerControl`]: Command surface shared by the engine and its callers
//! - [`Database`]: Task list and daily summary persistence
//! - [`Config`]: Application configuration management
//! - [`SessionService`]: Notification and summary bookkeeping

pub mod timer;
pub mod storage;
pub mod events;
pub mod tasks;
pub mod summary;
pub mod notification;
pub mod service;
pub mod error;

pub use timer::{EngineSlot, Phase, TimerConfig, TimerControl, TimerEngine, TimerSnapshot};
pub use storage::{Config, Database};
pub use events::Event;
pub use tasks::{Task, MAX_TASKS};
pub use summary::{DailySummary, SummaryProgress, SummarySink, SummaryTracker};
pub use notification::{Notification, NotificationAction, Notifier, NotifyError};
pub use service::{ServiceReport, SessionService};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
