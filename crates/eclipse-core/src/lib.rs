//! Orchestration core for Eclipse Launcher.
//!
//! Owns the persisted configuration document, the launch history, the
//! progress bridge between the install worker and the presentation layer, and
//! the per-launch state machine. Installing game files, building the launch
//! command and looking up player profiles are delegated to collaborators
//! behind the traits in [`install`] and [`profile`].

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod history;
pub mod install;
pub mod maintenance;
pub mod paths;
pub mod profile;
pub mod progress;
pub mod session;
pub mod versions;

#[cfg(test)]
mod testing;

pub use api::{ActionResult, LauncherApi};
pub use config::{ConfigStore, ConfigUpdate, Configuration, SharedConfig, Theme};
pub use context::LauncherContext;
pub use error::{InstallError, LauncherError};
pub use events::{event_channel, EventReceiver, EventSender, LaunchOutcome, LauncherEvent};
pub use history::{HistoryEntry, HistoryLog, HISTORY_CAPACITY};
pub use install::{
    DetachedSpawner, GameInstaller, LaunchCommand, LaunchOptions, ProcessSpawner, VersionSummary,
};
pub use paths::LauncherPaths;
pub use profile::{MojangProfiles, ProfileLookup};
pub use progress::{ProgressBridge, ProgressSink, ProgressState};
pub use session::{jvm_arguments, LaunchHandle, LaunchPhase, LaunchRequest, LaunchSession};
pub use versions::{VersionCatalog, VersionKind};
