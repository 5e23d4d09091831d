use thiserror::Error;

#[derive(Debug, Error)]
pub enum LauncherError {
    #[error("{0}")]
    Validation(String),
    #[error("A launch is already in progress")]
    AlreadyLaunching,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("Network error: {0}")]
    Network(String),
    #[error(transparent)]
    Install(#[from] InstallError),
    #[error("No async runtime available: {0}")]
    Runtime(String),
}

/// Failure reported by an install/launch collaborator. The display text is
/// surfaced to the user verbatim.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Http(String),
}

impl From<String> for InstallError {
    fn from(value: String) -> Self {
        InstallError::Message(value)
    }
}

impl From<&str> for InstallError {
    fn from(value: &str) -> Self {
        InstallError::Message(value.to_string())
    }
}
