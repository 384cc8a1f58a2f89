//! Ongoing "timer running" notification.
//!
//! Rendering is a pure function of the snapshot; delivery goes through a
//! [`Notifier`]. A failed delivery never reaches the engine.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::timer::{TimerControl, TimerSnapshot};

/// Buttons a notification (or any remote control) can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationAction {
    Start,
    Pause,
    Reset,
    Skip,
}

impl NotificationAction {
    pub fn label(self) -> &'static str {
        match self {
            NotificationAction::Start => "Start",
            NotificationAction::Pause => "Pause",
            NotificationAction::Reset => "Reset",
            NotificationAction::Skip => "Skip",
        }
    }

    /// Forward the action to the timer.
    pub fn apply(self, timer: &dyn TimerControl) {
        match self {
            NotificationAction::Start => timer.start(),
            NotificationAction::Pause => timer.pause(),
            NotificationAction::Reset => timer.reset_to_focus(),
            NotificationAction::Skip => timer.skip_phase(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown action '{0}' (expected start, pause, reset or skip)")]
pub struct ParseActionError(String);

impl FromStr for NotificationAction {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" | "s" => Ok(NotificationAction::Start),
            "pause" | "p" => Ok(NotificationAction::Pause),
            "reset" | "r" => Ok(NotificationAction::Reset),
            "skip" | "k" => Ok(NotificationAction::Skip),
            other => Err(ParseActionError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    /// Remaining time as `MM:SS`.
    pub body: String,
    /// Start or Pause, depending on whether the timer runs.
    pub primary: NotificationAction,
    pub secondary: NotificationAction,
    pub ongoing: bool,
}

impl Notification {
    /// One-line rendering for terminals and tray tooltips.
    pub fn line(&self) -> String {
        format!(
            "{} {}  [{}] [{}]",
            self.title,
            self.body,
            self.primary.label(),
            self.secondary.label()
        )
    }
}

pub fn render(snapshot: &TimerSnapshot) -> Notification {
    Notification {
        title: snapshot.phase.title().to_string(),
        body: snapshot.format_remaining(),
        primary: if snapshot.is_running {
            NotificationAction::Pause
        } else {
            NotificationAction::Start
        },
        secondary: NotificationAction::Reset,
        ongoing: true,
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notifications are unavailable: {0}")]
    Unavailable(String),
    #[error("failed to deliver notification: {0}")]
    Delivery(#[from] std::io::Error),
}

/// Delivery sink for rendered notifications.
pub trait Notifier: Send {
    fn notify(&mut self, notification: &Notification) -> Result<(), NotifyError>;
}
