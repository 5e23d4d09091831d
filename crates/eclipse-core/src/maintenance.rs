use std::fs;
use std::path::Path;

use crate::error::LauncherError;

/// Game directories removed by "delete instances". The configuration document
/// and anything else in the game directory is left alone.
pub const INSTANCE_DIRS: [&str; 3] = ["versions", "libraries", "assets"];

pub fn delete_instances(game_dir: &Path) -> Result<(), LauncherError> {
    for name in INSTANCE_DIRS {
        let dir = game_dir.join(name);
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
            tracing::info!(dir = %dir.display(), "removed instance data");
        }
    }
    Ok(())
}
