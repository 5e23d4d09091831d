//! Stub collaborators shared by the unit tests.

use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::context::LauncherContext;
use crate::error::InstallError;
use crate::events::{event_channel, EventReceiver, LauncherEvent};
use crate::install::{
    GameInstaller, LaunchCommand, LaunchOptions, ProcessSpawner, VersionSummary,
};
use crate::paths::LauncherPaths;
use crate::profile::ProfileLookup;
use crate::progress::ProgressSink;

#[derive(Default)]
pub struct StubInstaller {
    pub versions: Vec<VersionSummary>,
    pub versions_error: Option<String>,
    pub install_error: Option<String>,
    pub gate: Option<Arc<Notify>>,
    pub seen_options: Mutex<Vec<LaunchOptions>>,
}

#[async_trait]
impl GameInstaller for StubInstaller {
    async fn available_versions(
        &self,
        _game_dir: &Path,
    ) -> Result<Vec<VersionSummary>, InstallError> {
        match &self.versions_error {
            Some(message) => Err(InstallError::Http(message.clone())),
            None => Ok(self.versions.clone()),
        }
    }

    async fn install(
        &self,
        _version: &str,
        _game_dir: &Path,
        progress: &dyn ProgressSink,
    ) -> Result<(), InstallError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        progress.set_status("Download Libraries");
        progress.set_progress(1);
        progress.set_max(4);
        for step in 1..=4 {
            progress.set_progress(step);
        }
        match &self.install_error {
            Some(message) => Err(InstallError::Message(message.clone())),
            None => Ok(()),
        }
    }

    async fn launch_command(
        &self,
        version: &str,
        game_dir: &Path,
        options: &LaunchOptions,
    ) -> Result<LaunchCommand, InstallError> {
        self.seen_options
            .lock()
            .map_err(|_| InstallError::from("options lock poisoned"))?
            .push(options.clone());
        Ok(LaunchCommand::new("java")
            .args(options.jvm_arguments.iter().cloned())
            .arg(format!("--version={version}"))
            .arg(format!("--username={}", options.username))
            .current_dir(game_dir))
    }
}

#[derive(Default)]
pub struct RecordingSpawner {
    pub fail: bool,
    pub spawned: Mutex<Vec<LaunchCommand>>,
}

impl ProcessSpawner for RecordingSpawner {
    fn spawn(&self, command: &LaunchCommand) -> std::io::Result<()> {
        if self.fail {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "java not found",
            ));
        }
        self.spawned
            .lock()
            .map_err(|_| std::io::Error::other("spawn log poisoned"))?
            .push(command.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct FixedProfiles {
    pub uuid: Option<String>,
}

#[async_trait]
impl ProfileLookup for FixedProfiles {
    async fn lookup_uuid(&self, _username: &str) -> Option<String> {
        self.uuid.clone()
    }
}

pub struct Harness {
    pub dir: tempfile::TempDir,
    pub context: LauncherContext,
    pub events: EventReceiver,
    pub installer: Arc<StubInstaller>,
    pub spawner: Arc<RecordingSpawner>,
}

impl Harness {
    pub fn new(installer: StubInstaller, spawner: RecordingSpawner) -> Self {
        Self::with_profiles(installer, spawner, FixedProfiles::default())
    }

    pub fn with_profiles(
        installer: StubInstaller,
        spawner: RecordingSpawner,
        profiles: FixedProfiles,
    ) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let installer = Arc::new(installer);
        let spawner = Arc::new(spawner);
        let (tx, events) = event_channel();
        let context = LauncherContext::new(
            LauncherPaths::new(dir.path()),
            installer.clone(),
            spawner.clone(),
            Arc::new(profiles),
            tx,
        );
        Self {
            dir,
            context,
            events,
            installer,
            spawner,
        }
    }

    pub fn drain(&mut self) -> Vec<LauncherEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }

    pub fn statuses(events: &[LauncherEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|event| match event {
                LauncherEvent::Status { message } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }
}
