use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Subcommand, builder::BoolishValueParser};
use eclipse_core::{LauncherApi, Theme};

#[derive(Subcommand)]
pub enum Setting {
    /// Player name used for offline launches
    Username { name: String },
    /// Maximum heap in gigabytes
    Ram { gb: u32 },
    /// Accent colour: purple, blue, green or red
    Theme {
        #[arg(value_parser = parse_theme)]
        theme: Theme,
    },
    /// Dark mode on or off
    DarkMode {
        #[arg(action = ArgAction::Set, value_parser = BoolishValueParser::new())]
        enabled: bool,
    },
}

fn parse_theme(value: &str) -> Result<Theme, String> {
    value.parse()
}

pub fn show_config(api: &LauncherApi) -> Result<()> {
    let config = api.get_config();
    let rendered =
        serde_json::to_string_pretty(&config).context("Failed to render configuration")?;
    println!("{rendered}");
    println!("Launcher directory: {}", api.launcher_directory().display());
    Ok(())
}

pub fn apply(api: &LauncherApi, setting: Setting) {
    match setting {
        Setting::Username { name } => {
            api.update_username(&name);
            println!("Username set to {name}");
        }
        Setting::Ram { gb } => {
            api.update_ram(gb);
            println!("RAM allocation set to {gb} GB");
        }
        Setting::Theme { theme } => {
            api.update_theme(theme);
            println!("Theme set to {}", theme.as_str());
        }
        Setting::DarkMode { enabled } => {
            api.update_dark_mode(enabled);
            println!("Dark mode {}", if enabled { "enabled" } else { "disabled" });
        }
    }
}

pub fn tutorial_complete(api: &LauncherApi) {
    api.mark_tutorial_complete();
    println!("Tutorial marked as complete");
}

pub fn history(api: &LauncherApi) {
    let entries = api.history();
    if entries.is_empty() {
        println!("No launches yet.");
        return;
    }
    for entry in entries {
        println!("{}  {:<16} {}", entry.timestamp, entry.username, entry.version);
    }
}

pub async fn uuid(api: &LauncherApi, username: &str) -> Result<ExitCode> {
    match api.get_uuid(username).await {
        Some(uuid) => {
            println!("{uuid}");
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("No profile found for {username}");
            Ok(ExitCode::FAILURE)
        }
    }
}
