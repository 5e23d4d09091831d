use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::{lock_store, ConfigUpdate, Configuration, Theme};
use crate::context::LauncherContext;
use crate::error::LauncherError;
use crate::history::HistoryEntry;
use crate::maintenance;
use crate::session::{LaunchHandle, LaunchRequest, LaunchSession};
use crate::versions::VersionCatalog;

/// Outcome of a user-triggered operation that may fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
}

impl ActionResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn error(err: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            message: format!("Error: {err}"),
        }
    }
}

/// The surface the presentation layer talks to. Nothing here panics or lets
/// an error escape except [`LauncherApi::launch`], whose rejection is also
/// reported as a status event.
pub struct LauncherApi {
    context: LauncherContext,
    session: LaunchSession,
}

impl LauncherApi {
    pub fn new(context: LauncherContext) -> Self {
        let session = LaunchSession::new(context.clone());
        Self { context, session }
    }

    pub fn context(&self) -> &LauncherContext {
        &self.context
    }

    pub fn session(&self) -> &LaunchSession {
        &self.session
    }

    pub fn get_config(&self) -> Configuration {
        lock_store(&self.context.store).config().clone()
    }

    pub fn launcher_directory(&self) -> &Path {
        self.context.paths.root()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        lock_store(&self.context.store)
            .config()
            .launch_history
            .entries()
            .to_vec()
    }

    pub fn update_username(&self, username: &str) {
        self.apply(ConfigUpdate::Username(username.to_string()));
    }

    pub fn update_ram(&self, ram_gb: u32) {
        self.apply(ConfigUpdate::RamAllocation(ram_gb));
    }

    pub fn update_theme(&self, theme: Theme) {
        self.apply(ConfigUpdate::Theme(theme));
    }

    pub fn update_dark_mode(&self, enabled: bool) {
        self.apply(ConfigUpdate::DarkMode(enabled));
    }

    pub fn mark_tutorial_complete(&self) {
        self.apply(ConfigUpdate::TutorialShown(true));
    }

    fn apply(&self, update: ConfigUpdate) {
        lock_store(&self.context.store).update(update);
    }

    pub fn reset_launcher_data(&self) -> ActionResult {
        match lock_store(&self.context.store).reset() {
            Ok(()) => ActionResult::ok("Launcher data reset successfully!"),
            Err(err) => {
                tracing::error!("failed to reset launcher data: {err}");
                ActionResult::error(err)
            }
        }
    }

    pub fn delete_instances(&self) -> ActionResult {
        match maintenance::delete_instances(self.context.paths.game_dir()) {
            Ok(()) => ActionResult::ok("All Minecraft instances deleted successfully!"),
            Err(err) => {
                tracing::error!("failed to delete instances: {err}");
                ActionResult::error(err)
            }
        }
    }

    /// Installable versions grouped by type. Empty when the collaborator
    /// cannot list them.
    pub async fn get_versions(&self) -> VersionCatalog {
        match self
            .context
            .installer
            .available_versions(self.context.paths.game_dir())
            .await
        {
            Ok(summaries) => VersionCatalog::from_summaries(&summaries),
            Err(err) => {
                tracing::warn!("failed to list versions: {err}");
                VersionCatalog::default()
            }
        }
    }

    pub fn launch(&self, request: LaunchRequest) -> Result<LaunchHandle, LauncherError> {
        self.session.launch(request)
    }

    pub async fn get_uuid(&self, username: &str) -> Option<String> {
        self.context.profiles.lookup_uuid(username).await
    }
}
