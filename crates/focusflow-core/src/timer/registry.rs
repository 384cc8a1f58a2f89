//! Single-slot engine registry.
//!
//! Lets a background component reach the engine the foreground created
//! without sharing a constructor path. The slot holds a [`Weak`] reference:
//! whoever built the engine owns it, and a dropped engine reads back as
//! absent.
//!
//! Prefer passing an [`EngineSlot`] (or the `Arc<TimerEngine>` itself) to the
//! components that need it. [`global`] is the one process-wide slot, kept for
//! hosts whose lifecycle offers no injection point.

use std::sync::{Arc, OnceLock, PoisonError, RwLock, Weak};

use super::engine::TimerEngine;

/// Holds at most one engine reference. Replace and read are atomic.
#[derive(Debug, Default)]
pub struct EngineSlot {
    slot: RwLock<Weak<TimerEngine>>,
}

impl EngineSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the held reference.
    pub fn install(&self, engine: &Arc<TimerEngine>) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Arc::downgrade(engine);
    }

    /// The installed engine, if one was installed and is still alive.
    pub fn current(&self) -> Option<Arc<TimerEngine>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .upgrade()
    }

    pub fn clear(&self) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Weak::new();
    }
}

/// The process-wide slot.
pub fn global() -> &'static EngineSlot {
    static GLOBAL: OnceLock<EngineSlot> = OnceLock::new();
    GLOBAL.get_or_init(EngineSlot::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{TimerConfig, TimerControl};

    #[tokio::test]
    async fn empty_slot_has_no_engine() {
        assert!(EngineSlot::new().current().is_none());
    }

    #[tokio::test]
    async fn install_then_current_returns_same_engine() {
        let slot = EngineSlot::new();
        let engine = Arc::new(TimerEngine::new(TimerConfig::default()));
        slot.install(&engine);
        let found = slot.current().unwrap();
        assert!(Arc::ptr_eq(&found, &engine));

        found.skip_phase();
        assert_eq!(engine.state(), found.state());
    }

    #[tokio::test]
    async fn install_replaces_previous_engine() {
        let slot = EngineSlot::new();
        let first = Arc::new(TimerEngine::new(TimerConfig::default()));
        let second = Arc::new(TimerEngine::new(TimerConfig::new(10, 2, 20, 3)));
        slot.install(&first);
        slot.install(&second);
        assert!(Arc::ptr_eq(&slot.current().unwrap(), &second));
    }

    #[tokio::test]
    async fn slot_does_not_keep_engine_alive() {
        let slot = EngineSlot::new();
        let engine = Arc::new(TimerEngine::new(TimerConfig::default()));
        slot.install(&engine);
        drop(engine);
        assert!(slot.current().is_none());
    }

    #[tokio::test]
    async fn clear_empties_slot() {
        let slot = EngineSlot::new();
        let engine = Arc::new(TimerEngine::new(TimerConfig::default()));
        slot.install(&engine);
        slot.clear();
        assert!(slot.current().is_none());
    }

    #[test]
    fn global_is_a_single_instance() {
        assert!(std::ptr::eq(global(), global()));
    }
}
