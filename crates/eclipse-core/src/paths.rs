use std::path::{Path, PathBuf};

pub const APP_DIR_NAME: &str = "EclipseLauncher";
pub const CONFIG_FILE_NAME: &str = "launcher_config.json";
pub const LOG_FILE_NAME: &str = "launcher.log";

/// Filesystem layout of one launcher installation. The game files share the
/// root directory with the configuration document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherPaths {
    root: PathBuf,
}

impl LauncherPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(override_dir: Option<PathBuf>) -> Self {
        match override_dir {
            Some(dir) if !dir.as_os_str().is_empty() => Self::new(dir),
            _ => Self::new(default_root_dir()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn game_dir(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    pub fn log_file(&self) -> PathBuf {
        self.root.join(LOG_FILE_NAME)
    }
}

impl Default for LauncherPaths {
    fn default() -> Self {
        Self::new(default_root_dir())
    }
}

pub fn default_root_dir() -> PathBuf {
    if let Some(data) = dirs::data_local_dir() {
        return data.join(APP_DIR_NAME);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".eclipse-launcher");
    }

    PathBuf::from("eclipse-launcher")
}

pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(path)
}

pub fn file_exists(path: &Path) -> bool {
    std::fs::metadata(path).is_ok()
}
