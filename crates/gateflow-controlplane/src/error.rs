//! Control-plane client errors
//!
//! Control-plane rejections are propagated with the original fault text,
//! never translated; the caller decides what to do with them.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ControlPlaneError {
    #[error("aws CLI not found on PATH")]
    AwsCliNotFound,

    #[error("control-plane call '{operation}' rejected: {message}")]
    CommandFailed { operation: String, message: String },

    #[error("unexpected response from '{operation}': {message}")]
    MalformedResponse { operation: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ControlPlaneError>;
