use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use dialoguer::{Confirm, theme::ColorfulTheme};
use eclipse_core::{ActionResult, LauncherApi};

#[derive(Args)]
pub struct ResetArgs {
    /// Skip the confirmation prompt
    #[arg(long)]
    yes: bool,
}

#[derive(Args)]
pub struct DeleteInstancesArgs {
    /// Skip both confirmation prompts
    #[arg(long)]
    yes: bool,
}

pub fn reset(api: &LauncherApi, args: ResetArgs) -> Result<ExitCode> {
    if !args.yes
        && !confirm("Reset all launcher settings and launch history? This cannot be undone.")?
    {
        println!("Reset cancelled.");
        return Ok(ExitCode::SUCCESS);
    }
    Ok(report(api.reset_launcher_data()))
}

pub fn delete_instances(api: &LauncherApi, args: DeleteInstancesArgs) -> Result<ExitCode> {
    if !args.yes {
        let directory = api.launcher_directory().display().to_string();
        if !confirm(&format!(
            "Delete all installed versions, libraries and assets under {directory}?"
        ))? || !confirm("Are you absolutely sure? Everything will be downloaded again.")?
        {
            println!("Deletion cancelled.");
            return Ok(ExitCode::SUCCESS);
        }
    }
    Ok(report(api.delete_instances()))
}

fn confirm(prompt: &str) -> Result<bool> {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .context("Failed to read confirmation")
}

fn report(result: ActionResult) -> ExitCode {
    if result.success {
        println!("{}", result.message);
        ExitCode::SUCCESS
    } else {
        eprintln!("{}", result.message);
        ExitCode::FAILURE
    }
}
