use std::sync::Arc;

use crate::config::{ConfigStore, SharedConfig};
use crate::events::EventSender;
use crate::install::{GameInstaller, ProcessSpawner};
use crate::paths::LauncherPaths;
use crate::profile::ProfileLookup;

/// Everything a launcher component needs, built once at process start.
#[derive(Clone)]
pub struct LauncherContext {
    pub paths: LauncherPaths,
    pub store: SharedConfig,
    pub installer: Arc<dyn GameInstaller>,
    pub spawner: Arc<dyn ProcessSpawner>,
    pub profiles: Arc<dyn ProfileLookup>,
    pub events: EventSender,
}

impl LauncherContext {
    /// Opens the configuration document under `paths` and wires the
    /// collaborators together.
    pub fn new(
        paths: LauncherPaths,
        installer: Arc<dyn GameInstaller>,
        spawner: Arc<dyn ProcessSpawner>,
        profiles: Arc<dyn ProfileLookup>,
        events: EventSender,
    ) -> Self {
        let store = ConfigStore::open(paths.config_file()).shared();
        tracing::debug!(root = %paths.root().display(), "launcher context ready");
        Self {
            paths,
            store,
            installer,
            spawner,
            profiles,
            events,
        }
    }
}
