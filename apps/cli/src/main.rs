use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use eclipse_core::{
    DetachedSpawner, EventReceiver, LauncherApi, LauncherContext, LauncherPaths, MojangProfiles,
    event_channel,
};
use vanilla_install::{DEFAULT_JAVA, VanillaInstaller};

mod commands;
mod logging;
mod render;

use commands::{launch, maintenance, settings, versions};

#[derive(Parser)]
#[command(name = "eclipse-launcher", version, about = "Install and launch Minecraft")]
struct Cli {
    /// Launcher data directory (config, logs and game files)
    #[arg(long, global = true, env = "ECLIPSE_LAUNCHER_DIR")]
    data_dir: Option<PathBuf>,
    /// Java executable used to start the game
    #[arg(long, global = true, env = "ECLIPSE_LAUNCHER_JAVA", default_value = DEFAULT_JAVA)]
    java: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the stored configuration
    Config,
    /// Change a stored setting
    Set {
        #[command(subcommand)]
        setting: settings::Setting,
    },
    /// Mark the first-run tutorial as seen
    TutorialComplete,
    /// Delete the configuration document and restore defaults
    Reset(maintenance::ResetArgs),
    /// Delete installed versions, libraries and assets
    DeleteInstances(maintenance::DeleteInstancesArgs),
    /// List installable versions
    Versions(versions::VersionsArgs),
    /// Look up the account UUID for a username
    Uuid { username: String },
    /// Show recent launches, newest first
    History,
    /// Install (if needed) and start a version
    Launch(launch::LaunchArgs),
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let paths = LauncherPaths::resolve(cli.data_dir);
    logging::init(&paths);

    let (api, receiver) = build_api(paths, cli.java);

    match cli.command {
        Commands::Config => settings::show_config(&api)?,
        Commands::Set { setting } => settings::apply(&api, setting),
        Commands::TutorialComplete => settings::tutorial_complete(&api),
        Commands::Reset(args) => return maintenance::reset(&api, args),
        Commands::DeleteInstances(args) => return maintenance::delete_instances(&api, args),
        Commands::Versions(args) => versions::list(&api, args).await,
        Commands::Uuid { username } => return settings::uuid(&api, &username).await,
        Commands::History => settings::history(&api),
        Commands::Launch(args) => return launch::run(&api, receiver, args).await,
    }

    Ok(ExitCode::SUCCESS)
}

fn build_api(paths: LauncherPaths, java: PathBuf) -> (LauncherApi, EventReceiver) {
    let (events, receiver) = event_channel();
    let context = LauncherContext::new(
        paths,
        Arc::new(VanillaInstaller::new().with_java(java)),
        Arc::new(DetachedSpawner),
        Arc::new(MojangProfiles::new()),
        events,
    );
    (LauncherApi::new(context), receiver)
}
