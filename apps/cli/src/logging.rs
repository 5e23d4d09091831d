use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use eclipse_core::LauncherPaths;
use eclipse_core::paths::ensure_dir;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Human-readable logs go to stderr (`RUST_LOG`, default `warn`); a plain-text
/// copy at `info` is appended to the launcher log file.
pub fn init(paths: &LauncherPaths) {
    let stderr_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(stderr_filter);

    let log_path = paths.log_file();
    let (file_layer, file_error) = match open_log_file(&log_path) {
        Ok(file) => {
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(LevelFilter::INFO);
            (Some(layer), None)
        }
        Err(err) => (None, Some(err)),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Some(err) = file_error {
        tracing::warn!("file logging disabled, cannot open {}: {err}", log_path.display());
    }
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
