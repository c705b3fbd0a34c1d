//! Fetcher module.
//!
//! The fetcher turns a locator into a file inside a staging directory. The
//! pipeline treats it as an opaque capability; [`HttpFetcher`] is the plain
//! HTTP(S) implementation the CLI uses.

pub mod http;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::FetchError;

pub use http::HttpFetcher;

/// Progress callback: `(bytes_done, bytes_total)`.
pub type ProgressFn<'a> = &'a (dyn Fn(u64, Option<u64>) + Send + Sync);

/// Produces the bytes named by a locator.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Write the resource into `dest_dir` and return the final file path.
    async fn fetch(
        &self,
        locator: &str,
        dest_dir: &Path,
        on_progress: ProgressFn<'_>,
    ) -> Result<PathBuf, FetchError>;
}
