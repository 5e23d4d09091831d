use serde::Serialize;
use tokio::sync::mpsc;

use crate::history::HistoryEntry;

/// Notification pushed from the orchestration core to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LauncherEvent {
    Status {
        message: String,
    },
    Progress {
        percent: u64,
        current: u64,
        max: u64,
    },
    History {
        entries: Vec<HistoryEntry>,
    },
    Finished {
        outcome: LaunchOutcome,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum LaunchOutcome {
    Launched { version: String, username: String },
    Failed { message: String },
}

impl LaunchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LaunchOutcome::Launched { .. })
    }
}

pub type EventSender = mpsc::UnboundedSender<LauncherEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<LauncherEvent>;

pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Sends without caring whether anyone is still listening.
pub(crate) fn publish(events: &EventSender, event: LauncherEvent) {
    if events.send(event).is_err() {
        tracing::trace!("event receiver dropped; discarding launcher event");
    }
}

pub(crate) fn publish_status(events: &EventSender, message: impl Into<String>) {
    let message = message.into();
    tracing::info!(status = %message);
    publish(events, LauncherEvent::Status { message });
}
