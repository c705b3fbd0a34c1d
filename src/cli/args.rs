//! Command-line argument definitions using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::{Config, PermissionMode};

/// Permission-gated download-and-publish CLI.
#[derive(Parser, Debug)]
#[command(
    name = "stagepub",
    version,
    about = "Download files into private staging and publish them to shared storage",
    long_about = "Fetches each URL into a private staging directory, then publishes the file \
                  into public storage (Movies, Music, Pictures or Download) after write \
                  access has been granted.\n\n\
                  Requests run one at a time; staged files are always removed afterwards."
)]
pub struct Args {
    /// URL(s) to download, processed in order.
    #[arg(required = true)]
    pub locators: Vec<String>,

    /// Path to configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Private staging directory.
    #[arg(long = "staging-dir", env = "STAGEPUB_STAGING_DIR")]
    pub staging_dir: Option<PathBuf>,

    /// Public storage root the broker publishes into.
    #[arg(short = 'o', long = "output-dir", env = "STAGEPUB_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Legacy public root, used when the broker is unavailable.
    #[arg(long = "legacy-dir")]
    pub legacy_dir: Option<PathBuf>,

    /// Subdirectory below the media category folder.
    #[arg(short = 's', long = "subdir")]
    pub subdirectory: Option<String>,

    /// Publish through the legacy root only.
    #[arg(long)]
    pub no_broker: bool,

    /// How write-access requests are answered.
    #[arg(short, long, value_enum, env = "STAGEPUB_PERMISSIONS")]
    pub permissions: Option<PermissionModeArg>,

    /// Publish copy chunk size in bytes.
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// User agent sent with every request.
    #[arg(short = 'a', long = "user-agent", env = "STAGEPUB_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Hide progress and dialogs; print only the status line.
    #[arg(long, short)]
    pub quiet: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

/// CLI permission mode argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PermissionModeArg {
    /// Ask on the terminal.
    Prompt,
    /// Treat every request as granted.
    Granted,
    /// Treat every request as refused.
    Denied,
    /// Host has no permission concept.
    Unavailable,
}

impl From<PermissionModeArg> for PermissionMode {
    fn from(arg: PermissionModeArg) -> Self {
        match arg {
            PermissionModeArg::Prompt => PermissionMode::Prompt,
            PermissionModeArg::Granted => PermissionMode::Granted,
            PermissionModeArg::Denied => PermissionMode::Denied,
            PermissionModeArg::Unavailable => PermissionMode::Unavailable,
        }
    }
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(&self, config: &mut Config) {
        if let Some(dir) = &self.staging_dir {
            config.staging.root = Some(dir.clone());
        }

        if let Some(dir) = &self.output_dir {
            config.publish.public_root = Some(dir.clone());
        }

        if let Some(dir) = &self.legacy_dir {
            config.publish.legacy_root = Some(dir.clone());
        }

        if let Some(subdir) = &self.subdirectory {
            config.publish.subdirectory = Some(subdir.clone());
        }

        // Boolean flags (only override if set to non-default)
        if self.no_broker {
            config.publish.use_broker = false;
        }

        if let Some(mode) = self.permissions {
            config.permissions.mode = mode.into();
        }

        if let Some(size) = self.chunk_size {
            config.publish.chunk_size = size;
        }

        if let Some(user_agent) = &self.user_agent {
            config.network.user_agent = user_agent.clone();
        }

        if let Some(timeout) = self.timeout {
            config.network.timeout_seconds = timeout;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overrides_only_given_flags() {
        let args = Args::try_parse_from([
            "stagepub",
            "--output-dir",
            "/srv/public",
            "--permissions",
            "granted",
            "--no-broker",
            "https://example.com/a.mp4",
        ])
        .unwrap();

        let mut config = Config::default();
        config.publish.subdirectory = Some("keep".into());
        args.merge_into_config(&mut config);

        assert_eq!(config.publish.public_root, Some(PathBuf::from("/srv/public")));
        assert_eq!(config.permissions.mode, PermissionMode::Granted);
        assert!(!config.publish.use_broker);
        assert_eq!(config.publish.subdirectory.as_deref(), Some("keep"));
        assert_eq!(args.locators, vec!["https://example.com/a.mp4".to_string()]);
    }

    #[test]
    fn test_locator_is_required() {
        assert!(Args::try_parse_from(["stagepub"]).is_err());
    }
}
