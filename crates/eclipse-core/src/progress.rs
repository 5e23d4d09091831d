use std::sync::{Mutex, PoisonError};

use crate::events::{publish, publish_status, EventSender, LauncherEvent};

/// Progress callbacks handed to the installer for the duration of one install.
pub trait ProgressSink: Send + Sync {
    fn set_status(&self, message: &str);
    fn set_max(&self, value: u64);
    fn set_progress(&self, value: u64);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressState {
    pub current: u64,
    pub max: u64,
}

impl ProgressState {
    /// `floor(current / max * 100)`, or `None` until a positive max is known.
    pub fn percentage(&self) -> Option<u64> {
        if self.max == 0 {
            return None;
        }
        Some(self.current.saturating_mul(100) / self.max)
    }
}

/// Forwards installer progress onto the launcher event channel.
pub struct ProgressBridge {
    events: EventSender,
    state: Mutex<ProgressState>,
}

impl ProgressBridge {
    pub fn new(events: EventSender) -> Self {
        Self {
            events,
            state: Mutex::new(ProgressState::default()),
        }
    }

    pub fn state(&self) -> ProgressState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ProgressSink for ProgressBridge {
    fn set_status(&self, message: &str) {
        publish_status(&self.events, message);
    }

    fn set_max(&self, value: u64) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).max = value;
    }

    fn set_progress(&self, value: u64) {
        let state = {
            let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            guard.current = value;
            *guard
        };
        let Some(percent) = state.percentage() else {
            return;
        };
        publish(
            &self.events,
            LauncherEvent::Progress {
                percent,
                current: state.current,
                max: state.max,
            },
        );
    }
}
