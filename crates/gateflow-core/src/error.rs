use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid configuration: {0}")]
    ConfigValidation(String),

    #[error(
        "no deployment config found\nsearched: gateflow.json, .gateflow.json, .gateflow/gateflow.json\nhint: set GATEFLOW_CONFIG to point at the file directly"
    )]
    ConfigFileNotFound,

    #[error("schema template not found: {0}")]
    TemplateNotFound(PathBuf),

    #[error("target '{0}' uses a custom schema but no baseUrl is configured")]
    MissingSubstitutionValue(String),

    #[error("template render error: {file}\nreason: {message}")]
    TemplateRender { file: PathBuf, message: String },

    #[error("malformed storage location '{0}': expected s3://bucket/key")]
    MalformedLocation(String),

    #[error("file read error: {path}\nreason: {message}")]
    Io { path: PathBuf, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
