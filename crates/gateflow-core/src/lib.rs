//! gateflow core
//!
//! Deployment configuration model, fail-fast validation, deterministic
//! naming, schema template processing and storage location parsing.
//! Everything in this crate is local and side-effect free: all of its
//! failure modes fire before a single control-plane call is made.

pub mod config;
pub mod error;
pub mod loader;
pub mod location;
pub mod naming;
pub mod template;

pub use config::{
    AuthenticationType, AwsSettings, DeployConfig, GatewayConfig, IntegrationTargetConfig,
    TargetAuthSettings, TargetSettings, PREBUILT_SCHEMA_PREFIX,
};
pub use error::{CoreError, Result};
pub use loader::{find_config_file, load_config};
pub use location::StorageLocation;
pub use naming::deterministic_id;
pub use template::SchemaTemplates;
