//! stagepub - permission-gated download-and-publish pipeline.
//!
//! A download runs off the interactive thread in five steps:
//!
//! - ask for write access to shared storage
//! - fetch the resource into a private staging directory
//! - publish the staged file into public storage through a broker
//! - remove the staged file, whatever happened
//! - report exactly one outcome back to the interactive thread
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use stagepub::download::{Dependencies, DownloadCoordinator};
//! use stagepub::fetch::HttpFetcher;
//! use stagepub::fs::StagingArea;
//! use stagepub::permission::PermissionGate;
//! use stagepub::platform::{DirectoryBroker, HostPermissions};
//! use stagepub::publish::Publisher;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let deps = Dependencies {
//!         permissions: Arc::new(PermissionGate::new(Arc::new(HostPermissions))),
//!         staging: Arc::new(StagingArea::new("/tmp/stagepub")),
//!         fetcher: Arc::new(HttpFetcher::new("stagepub", Duration::from_secs(60))?),
//!         publisher: Arc::new(Publisher::default().with_broker(Arc::new(DirectoryBroker::new("/srv/public")))),
//!     };
//!     let (coordinator, _pump) = DownloadCoordinator::new(deps, None);
//!
//!     let outcome = coordinator.start("https://example.com/video.mp4")?.wait().await;
//!     println!("{}", outcome.status_text());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod fetch;
pub mod fs;
pub mod output;
pub mod permission;
pub mod platform;
pub mod publish;
pub mod status;

// Re-exports for convenience
pub use config::{Config, PermissionMode};
pub use download::{Dependencies, DownloadCoordinator, DownloadOutcome, Phase};
pub use error::{Error, FailureReason, FetchError, PublishError, Result};
pub use fs::{StagedFile, StagingArea};
pub use permission::{Capability, PermissionGate, PermissionState};
pub use publish::{PublishTarget, Publisher};
pub use status::{StatusPump, StatusSink, UiEvent};
