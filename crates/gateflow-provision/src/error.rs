//! Provisioning engine errors

use thiserror::Error;

/// Error type resources themselves return; the engine wraps these without
/// translating them so the original fault stays visible.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias for `Provisionable` implementations
pub type ResourceResult<T> = std::result::Result<T, BoxError>;

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("circular dependency detected: {0}")]
    CircularDependency(String),

    #[error("duplicate resource key: {0}")]
    DuplicateResource(String),

    #[error("resource '{resource}' depends on unknown resource '{dependency}'")]
    UnknownDependency { resource: String, dependency: String },

    #[error("state file error: {0}")]
    State(String),

    #[error("lock acquisition failed: {0}")]
    Lock(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
