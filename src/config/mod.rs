//! Configuration module for stagepub.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Permission mode selection
//! - Configuration validation

pub mod loader;
pub mod modes;
pub mod validation;

pub use loader::{
    Config, NetworkConfig, PermissionConfig, PublishConfig, StagingConfig, DEFAULT_CHUNK_SIZE,
};
pub use modes::PermissionMode;
pub use validation::validate_config;
