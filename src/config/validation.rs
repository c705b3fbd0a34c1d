//! Configuration validation logic.

use crate::config::loader::Config;
use crate::error::{Error, Result};

/// Smallest accepted copy chunk (4 KiB).
const MIN_CHUNK_SIZE: usize = 4 * 1024;

/// Largest accepted copy chunk (16 MiB).
const MAX_CHUNK_SIZE: usize = 16 * 1024 * 1024;

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_chunk_size(config.publish.chunk_size)?;
    validate_timeout(config.network.timeout_seconds)?;
    validate_user_agent(&config.network.user_agent)?;

    if let Some(subdirectory) = &config.publish.subdirectory {
        validate_subdirectory(subdirectory)?;
    }

    if !config.publish.use_broker && config.publish.legacy_root.is_none() {
        return Err(Error::MissingConfig(
            "publish.legacy_root (required when the storage broker is disabled)".to_string(),
        ));
    }

    Ok(())
}

/// Validate the publish copy chunk size.
pub fn validate_chunk_size(chunk_size: usize) -> Result<()> {
    if !(MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&chunk_size) {
        return Err(Error::ConfigValidation {
            field: "publish.chunk_size".to_string(),
            message: format!(
                "Chunk size must be between {} and {} bytes (got {})",
                MIN_CHUNK_SIZE, MAX_CHUNK_SIZE, chunk_size
            ),
        });
    }

    Ok(())
}

/// Validate the network timeout.
pub fn validate_timeout(timeout_seconds: u64) -> Result<()> {
    if timeout_seconds == 0 {
        return Err(Error::ConfigValidation {
            field: "network.timeout_seconds".to_string(),
            message: "Timeout must be greater than zero".to_string(),
        });
    }

    Ok(())
}

/// Validate the user agent string.
pub fn validate_user_agent(user_agent: &str) -> Result<()> {
    if user_agent.trim().is_empty() {
        return Err(Error::MissingConfig("network.user_agent".to_string()));
    }

    Ok(())
}

/// Validate the public subdirectory. Nested components are allowed, traversal is not.
pub fn validate_subdirectory(subdirectory: &str) -> Result<()> {
    let invalid = subdirectory.trim().is_empty()
        || subdirectory.starts_with('/')
        || subdirectory.starts_with('\\')
        || subdirectory
            .split(['/', '\\'])
            .any(|part| part == ".." || part.contains('\0'));

    if invalid {
        return Err(Error::ConfigValidation {
            field: "publish.subdirectory".to_string(),
            message: format!(
                "Subdirectory '{}' must be a relative path without '..' components",
                subdirectory
            ),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_chunk_size_bounds() {
        assert!(validate_chunk_size(4096).is_ok());
        assert!(validate_chunk_size(16 * 1024 * 1024).is_ok());
        assert!(validate_chunk_size(0).is_err());
        assert!(validate_chunk_size(17 * 1024 * 1024).is_err());
    }

    #[test]
    fn test_subdirectory() {
        assert!(validate_subdirectory("clips").is_ok());
        assert!(validate_subdirectory("clips/2024").is_ok());
        assert!(validate_subdirectory("../escape").is_err());
        assert!(validate_subdirectory("/absolute").is_err());
        assert!(validate_subdirectory("  ").is_err());
    }

    #[test]
    fn test_broker_disabled_needs_legacy_root() {
        let mut config = Config::default();
        config.publish.use_broker = false;
        assert!(matches!(
            validate_config(&config),
            Err(Error::MissingConfig(_))
        ));

        config.publish.legacy_root = Some(PathBuf::from("/mnt/shared"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(validate_timeout(0).is_err());
        assert!(validate_timeout(1).is_ok());
    }
}
