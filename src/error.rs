use thiserror::Error;

#[derive(Error, Debug)]
pub enum FoxtrapError {
    #[error("Browser executable not found: {0}")]
    BrowserNotFound(String),

    #[error("Automation tool not found: {0}")]
    AutomationNotFound(String),

    #[error("Version probe failed: {0}")]
    VersionProbe(String),

    #[error("No version number in browser output: {0:?}")]
    VersionParse(String),

    #[error("Browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("Automation command failed: {0}")]
    Automation(String),

    #[error("Extension manifest error: {0}")]
    Manifest(String),

    #[error("Profile setup failed: {0}")]
    Profile(String),

    #[error("Fixture server error: {0}")]
    Fixture(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TLS error: {0}")]
    TlsError(#[from] rustls::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FoxtrapError>;
