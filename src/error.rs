use thiserror::Error;

/// Unified error type for auto-release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Pattern error: {0}")]
    Pattern(String),

    #[error("Write conflict: {0}")]
    Conflict(String),

    #[error("Host operation failed: {0}")]
    Host(String),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid event payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid settings file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in auto-release
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create a pattern error with context
    pub fn pattern(msg: impl Into<String>) -> Self {
        ReleaseError::Pattern(msg.into())
    }

    /// Create a write conflict error with context
    pub fn conflict(msg: impl Into<String>) -> Self {
        ReleaseError::Conflict(msg.into())
    }

    /// Create a host error with context
    pub fn host(msg: impl Into<String>) -> Self {
        ReleaseError::Host(msg.into())
    }
}
