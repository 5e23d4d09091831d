use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use eclipse_core::{EventReceiver, LaunchPhase, LaunchRequest, LauncherApi};

use crate::render;

#[derive(Args)]
pub struct LaunchArgs {
    /// Version id, e.g. 1.20.1
    #[arg(long)]
    pub version: String,
    /// Player name; defaults to the last one used
    #[arg(long)]
    pub username: Option<String>,
    /// Maximum heap in gigabytes; defaults to the stored allocation
    #[arg(long)]
    pub ram: Option<u32>,
}

pub async fn run(
    api: &LauncherApi,
    mut receiver: EventReceiver,
    args: LaunchArgs,
) -> Result<ExitCode> {
    let config = api.get_config();
    let username = args.username.unwrap_or(config.last_username);
    let ram = args.ram.unwrap_or(config.ram_allocation);

    let handle = match api.launch(LaunchRequest::new(args.version, username, Some(ram))) {
        Ok(handle) => handle,
        Err(err) => {
            // The rejection was already queued as a status event.
            render::drain(&mut receiver)?;
            tracing::debug!("launch rejected: {err}");
            return Ok(ExitCode::FAILURE);
        }
    };

    let outcome = render::follow(&mut receiver).await?;
    match handle.wait().await {
        LaunchPhase::Recorded if outcome.is_success() => Ok(ExitCode::SUCCESS),
        phase => {
            tracing::debug!(?phase, "launch did not complete");
            Ok(ExitCode::FAILURE)
        }
    }
}
