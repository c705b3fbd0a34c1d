//! Private, always-writable scratch storage.
//!
//! Every request gets its own directory `<root>/<uuid>/`. The fetcher writes
//! into that directory, and cleanup removes the whole directory, so partial
//! downloads never outlive their request.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use uuid::Uuid;

use crate::error::{FailureReason, FetchError};
use crate::fs::naming::coerce_filename;
use crate::fs::paths::ensure_dir;

/// A file owned by the staging area until it is handed to the publisher.
#[derive(Debug, PartialEq, Eq)]
pub struct StagedFile {
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl StagedFile {
    /// The request's private directory.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("."))
    }

    /// Final path component, used to derive the publish target.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Scratch location for in-flight downloads.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
    cleanups: Arc<AtomicUsize>,
}

impl StagingArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cleanups: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of `cleanup` calls so far.
    pub fn cleanup_count(&self) -> usize {
        self.cleanups.load(Ordering::SeqCst)
    }

    /// Reserve a collision-free path for `suggested_name`.
    ///
    /// Creates the root lazily. Any I/O failure surfaces as `StorageExhausted`.
    pub async fn allocate(&self, suggested_name: &str) -> Result<StagedFile, FailureReason> {
        let dir = self.root.join(Uuid::new_v4().to_string());

        let created: std::io::Result<()> = async {
            ensure_dir(&self.root).await?;
            tokio::fs::create_dir(&dir).await
        }
        .await;

        created.map_err(|e| {
            FailureReason::StorageExhausted(format!("cannot create {}: {}", dir.display(), e))
        })?;

        let path = dir.join(coerce_filename(suggested_name));
        tracing::debug!("Allocated staging path {}", path.display());

        Ok(StagedFile {
            path,
            size_bytes: 0,
        })
    }

    /// Record the file the fetcher actually produced.
    ///
    /// The fetcher must have written inside the staged directory.
    pub async fn settle(
        &self,
        staged: StagedFile,
        fetched: PathBuf,
    ) -> Result<StagedFile, (StagedFile, FailureReason)> {
        if fetched.parent() != Some(staged.dir()) {
            let reason = FetchError::Other(format!(
                "fetcher wrote outside its staging directory: {}",
                fetched.display()
            ));
            return Err((staged, reason.into()));
        }

        match tokio::fs::metadata(&fetched).await {
            Ok(meta) if meta.is_file() => Ok(StagedFile {
                path: fetched,
                size_bytes: meta.len(),
            }),
            Ok(_) => {
                let reason = FetchError::Other(format!("not a file: {}", fetched.display()));
                Err((staged, reason.into()))
            }
            Err(e) => Err((staged, FetchError::from(e).into())),
        }
    }

    /// Delete a staged file and its request directory. "Already gone" is success.
    pub async fn cleanup(&self, staged: StagedFile) -> std::io::Result<()> {
        self.cleanups.fetch_add(1, Ordering::SeqCst);
        let dir = staged.dir().to_path_buf();
        if !dir.starts_with(&self.root) || dir == self.root {
            // Never remove anything the staging area did not allocate.
            return match tokio::fs::remove_file(&staged.path).await {
                Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            };
        }

        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {
                tracing::debug!("Removed staging directory {}", dir.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Remove request directories orphaned by an earlier process.
    ///
    /// Only call this while no request is in flight.
    pub async fn sweep(&self) -> std::io::Result<usize> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let is_request_dir = name
                .to_str()
                .map(|n| Uuid::parse_str(n).is_ok())
                .unwrap_or(false);

            if is_request_dir && entry.file_type().await?.is_dir() {
                tokio::fs::remove_dir_all(entry.path()).await?;
                removed += 1;
            }
        }

        if removed > 0 {
            tracing::info!("Swept {} orphaned staging directories", removed);
        }
        Ok(removed)
    }
}
