//! Configuration structures and loading logic.

use crate::config::modes::PermissionMode;
use crate::error::{Error, Result};
use directories::{ProjectDirs, UserDirs};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default size of one copy chunk when publishing (64 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub staging: StagingConfig,

    #[serde(default)]
    pub publish: PublishConfig,

    #[serde(default)]
    pub permissions: PermissionConfig,

    #[serde(default)]
    pub network: NetworkConfig,
}

/// Private scratch storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Root of the staging area. Defaults to the per-user cache directory.
    #[serde(default)]
    pub root: Option<PathBuf>,
}

/// Public storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Root the storage broker publishes into. Defaults to the user's
    /// Downloads directory.
    #[serde(default)]
    pub public_root: Option<PathBuf>,

    /// Subdirectory appended below the media category (e.g. "Movies/stagepub").
    #[serde(default)]
    pub subdirectory: Option<String>,

    /// Legacy public-storage root used when the broker is unavailable.
    #[serde(default)]
    pub legacy_root: Option<PathBuf>,

    /// Whether the storage broker may be used at all.
    #[serde(default = "default_true")]
    pub use_broker: bool,

    /// Copy chunk size in bytes.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            public_root: None,
            subdirectory: None,
            legacy_root: None,
            use_broker: true,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Permission handling configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionConfig {
    /// How capability requests are answered.
    #[serde(default)]
    pub mode: PermissionMode,
}

/// HTTP fetcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Overall request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

fn default_true() -> bool {
    true
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_timeout() -> u64 {
    300
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the effective staging root.
    pub fn staging_root(&self) -> PathBuf {
        self.staging.root.clone().unwrap_or_else(|| {
            ProjectDirs::from("", "", env!("CARGO_PKG_NAME"))
                .map(|dirs| dirs.cache_dir().join("staging"))
                .unwrap_or_else(|| std::env::temp_dir().join("stagepub-staging"))
        })
    }

    /// Get the effective public root for the storage broker.
    pub fn public_root(&self) -> PathBuf {
        self.publish.public_root.clone().unwrap_or_else(|| {
            UserDirs::new()
                .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
                .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.publish.use_broker);
        assert_eq!(config.publish.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.permissions.mode, PermissionMode::Prompt);
        assert_eq!(config.network.timeout_seconds, 300);
    }

    #[test]
    fn test_parse_sections() {
        let config: Config = toml::from_str(
            r#"
            [staging]
            root = "/tmp/staging"

            [publish]
            public_root = "/srv/public"
            subdirectory = "clips"
            use_broker = false
            legacy_root = "/mnt/sdcard"
            chunk_size = 8192

            [permissions]
            mode = "granted"
            "#,
        )
        .unwrap();

        assert_eq!(config.staging_root(), PathBuf::from("/tmp/staging"));
        assert_eq!(config.public_root(), PathBuf::from("/srv/public"));
        assert_eq!(config.publish.subdirectory.as_deref(), Some("clips"));
        assert!(!config.publish.use_broker);
        assert_eq!(config.publish.chunk_size, 8192);
        assert_eq!(config.permissions.mode, PermissionMode::Granted);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.publish.subdirectory = Some("saved".into());
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.publish.subdirectory.as_deref(), Some("saved"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
