//! Error types for the voicerig bootstrapper

use thiserror::Error;

/// Result type alias for voicerig operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while provisioning or launching the pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Credential prompt or cache error
    #[error("credential error: {0}")]
    Credential(String),

    /// Privilege cache (sudo token) error
    #[error("privilege error: {0}")]
    Privilege(String),

    /// OS package installation error
    #[error("install error: {0}")]
    Install(String),

    /// Asset download/provisioning error
    #[error("provision error: {0}")]
    Provision(String),

    /// Sparse checkout error
    #[error("checkout error: {0}")]
    Checkout(String),

    /// Workload launch error
    #[error("launch error: {0}")]
    Launch(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
