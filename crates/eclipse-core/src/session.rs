use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::config::{lock_store, ConfigUpdate, DEFAULT_RAM_GB};
use crate::context::LauncherContext;
use crate::error::LauncherError;
use crate::events::{publish, publish_status, LaunchOutcome, LauncherEvent};
use crate::history::HistoryEntry;
use crate::install::LaunchOptions;
use crate::progress::{ProgressBridge, ProgressSink};

pub const VALIDATION_MESSAGE: &str = "Please select a version and enter a username";
pub const LAUNCHED_MESSAGE: &str = "Minecraft launched successfully!";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRequest {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, alias = "ram")]
    pub ram_gb: Option<u32>,
}

impl LaunchRequest {
    pub fn new(version: impl Into<String>, username: impl Into<String>, ram_gb: Option<u32>) -> Self {
        Self {
            version: version.into(),
            username: username.into(),
            ram_gb,
        }
    }

    pub fn ram(&self) -> u32 {
        self.ram_gb.unwrap_or(DEFAULT_RAM_GB)
    }

    fn validate(&self) -> Result<(), LauncherError> {
        if self.version.trim().is_empty() || self.username.trim().is_empty() {
            return Err(LauncherError::Validation(VALIDATION_MESSAGE.to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchPhase {
    Idle,
    Validating,
    Installing,
    Launching,
    Recorded,
    Failed(String),
}

impl LaunchPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LaunchPhase::Recorded | LaunchPhase::Failed(_))
    }
}

/// `-Xmx{ram}G` plus an initial heap of half that, never below 1G.
pub fn jvm_arguments(ram_gb: u32) -> Vec<String> {
    vec![
        format!("-Xmx{ram_gb}G"),
        format!("-Xms{}G", (ram_gb / 2).max(1)),
    ]
}

/// Awaitable handle on a dispatched launch. Dropping it does not cancel the
/// launch.
pub struct LaunchHandle {
    task: JoinHandle<LaunchPhase>,
}

impl LaunchHandle {
    pub async fn wait(self) -> LaunchPhase {
        match self.task.await {
            Ok(phase) => phase,
            Err(err) => LaunchPhase::Failed(format!("Launch task aborted: {err}")),
        }
    }
}

struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

struct LaunchJob {
    version: String,
    username: String,
    ram_gb: u32,
}

pub struct LaunchSession {
    context: LauncherContext,
    in_flight: Arc<AtomicBool>,
    phase: Arc<Mutex<LaunchPhase>>,
}

impl LaunchSession {
    pub fn new(context: LauncherContext) -> Self {
        Self {
            context,
            in_flight: Arc::new(AtomicBool::new(false)),
            phase: Arc::new(Mutex::new(LaunchPhase::Idle)),
        }
    }

    pub fn is_launching(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn phase(&self) -> LaunchPhase {
        self.phase
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Validates the request, persists username and RAM, and dispatches the
    /// install-and-launch work onto the current tokio runtime. Returns as
    /// soon as the work is dispatched.
    pub fn launch(&self, request: LaunchRequest) -> Result<LaunchHandle, LauncherError> {
        if let Err(err) = request.validate() {
            publish_status(&self.context.events, VALIDATION_MESSAGE);
            return Err(err);
        }

        let runtime = Handle::try_current().map_err(|err| LauncherError::Runtime(err.to_string()))?;

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            let err = LauncherError::AlreadyLaunching;
            publish_status(&self.context.events, err.to_string());
            return Err(err);
        }
        let guard = InFlightGuard(self.in_flight.clone());
        set_phase(&self.phase, LaunchPhase::Validating);

        let job = LaunchJob {
            version: request.version,
            username: request.username,
            ram_gb: request.ram_gb.unwrap_or(DEFAULT_RAM_GB),
        };

        {
            let mut store = lock_store(&self.context.store);
            store.update(ConfigUpdate::Username(job.username.clone()));
            store.update(ConfigUpdate::RamAllocation(job.ram_gb));
        }

        tracing::info!(version = %job.version, username = %job.username, ram_gb = job.ram_gb, "launch dispatched");
        let task = runtime.spawn(run_launch(
            self.context.clone(),
            self.phase.clone(),
            job,
            guard,
        ));
        Ok(LaunchHandle { task })
    }
}

fn set_phase(phase: &Mutex<LaunchPhase>, next: LaunchPhase) {
    *phase.lock().unwrap_or_else(PoisonError::into_inner) = next;
}

async fn run_launch(
    context: LauncherContext,
    phase: Arc<Mutex<LaunchPhase>>,
    job: LaunchJob,
    _guard: InFlightGuard,
) -> LaunchPhase {
    let terminal = match install_and_launch(&context, &phase, &job).await {
        Ok(()) => LaunchPhase::Recorded,
        Err(err) => {
            let message = err.to_string();
            tracing::error!(version = %job.version, "launch failed: {message}");
            publish_status(&context.events, format!("Error: {message}"));
            publish(
                &context.events,
                LauncherEvent::Finished {
                    outcome: LaunchOutcome::Failed {
                        message: message.clone(),
                    },
                },
            );
            LaunchPhase::Failed(message)
        }
    };
    set_phase(&phase, terminal.clone());
    terminal
}

async fn install_and_launch(
    context: &LauncherContext,
    phase: &Mutex<LaunchPhase>,
    job: &LaunchJob,
) -> Result<(), LauncherError> {
    let game_dir = context.paths.game_dir();
    let bridge = ProgressBridge::new(context.events.clone());

    set_phase(phase, LaunchPhase::Installing);
    bridge.set_status(&format!("Installing Minecraft {}...", job.version));
    context
        .installer
        .install(&job.version, game_dir, &bridge)
        .await?;
    bridge.set_status(&format!("Minecraft {} installed successfully!", job.version));

    set_phase(phase, LaunchPhase::Launching);
    let options = LaunchOptions {
        username: job.username.clone(),
        uuid: String::new(),
        token: String::new(),
        jvm_arguments: jvm_arguments(job.ram_gb),
    };
    bridge.set_status(&format!("Launching Minecraft {}...", job.version));
    let command = context
        .installer
        .launch_command(&job.version, game_dir, &options)
        .await?;
    context.spawner.spawn(&command).map_err(|err| {
        LauncherError::Io(std::io::Error::new(
            err.kind(),
            format!("Failed to start {}: {err}", command.program.display()),
        ))
    })?;

    publish_status(&context.events, LAUNCHED_MESSAGE);
    let entries = lock_store(&context.store)
        .record_launch(HistoryEntry::now(job.version.clone(), job.username.clone()));
    publish(&context.events, LauncherEvent::History { entries });
    publish(
        &context.events,
        LauncherEvent::Finished {
            outcome: LaunchOutcome::Launched {
                version: job.version.clone(),
                username: job.username.clone(),
            },
        },
    );
    Ok(())
}
