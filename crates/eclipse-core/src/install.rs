use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::InstallError;
use crate::progress::ProgressSink;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSummary {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Player and JVM settings the installer folds into the launch command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchOptions {
    pub username: String,
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub jvm_arguments: Vec<String>,
}

/// A fully formed command: executable plus argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
}

impl LaunchCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }
}

/// The install/build collaborator. Implementations download game files and
/// know how to turn a version into a runnable command.
#[async_trait]
pub trait GameInstaller: Send + Sync {
    async fn available_versions(&self, game_dir: &Path)
        -> Result<Vec<VersionSummary>, InstallError>;

    async fn install(
        &self,
        version: &str,
        game_dir: &Path,
        progress: &dyn ProgressSink,
    ) -> Result<(), InstallError>;

    async fn launch_command(
        &self,
        version: &str,
        game_dir: &Path,
        options: &LaunchOptions,
    ) -> Result<LaunchCommand, InstallError>;
}

pub trait ProcessSpawner: Send + Sync {
    fn spawn(&self, command: &LaunchCommand) -> std::io::Result<()>;
}

/// Starts the game and forgets about it: no wait, no output capture.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedSpawner;

impl ProcessSpawner for DetachedSpawner {
    fn spawn(&self, command: &LaunchCommand) -> std::io::Result<()> {
        let mut process = Command::new(&command.program);
        process
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(dir) = &command.current_dir {
            process.current_dir(dir);
        }

        let child = process.spawn()?;
        tracing::info!(pid = child.id(), program = %command.program.display(), "game process started");
        Ok(())
    }
}
