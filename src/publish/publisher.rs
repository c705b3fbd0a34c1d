//! Moves staged files into public storage.
//!
//! Two strategies, tried in a fixed order:
//! 1. the storage broker, which needs no filesystem permission;
//! 2. a direct write under a legacy public root, only when the broker is
//!    unavailable and only with write permission.
//!
//! A copy that fails midway through the broker path is discarded when the
//! broker supports deletion by handle. Otherwise the partial entry stays
//! visible and the error says so.

use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::DEFAULT_CHUNK_SIZE;
use crate::error::PublishError;
use crate::fs::{join_relative, make_unique_filename, StagedFile};
use crate::permission::PermissionState;
use crate::publish::{PublishTarget, StorageBroker};

/// User-visible name of a published entry.
pub type PublishedName = String;

pub struct Publisher {
    broker: Option<Arc<dyn StorageBroker>>,
    legacy_root: Option<PathBuf>,
    chunk_size: usize,
}

impl Default for Publisher {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl Publisher {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            broker: None,
            legacy_root: None,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Use `broker` as the primary strategy.
    pub fn with_broker(mut self, broker: Arc<dyn StorageBroker>) -> Self {
        self.broker = Some(broker);
        self
    }

    /// Allow direct writes under `root` when no broker is available.
    pub fn with_legacy_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.legacy_root = Some(root.into());
        self
    }

    /// Publish `staged` as `target`. Blocking; run it off the async executor.
    pub fn publish(
        &self,
        staged: &StagedFile,
        target: &PublishTarget,
        permission: PermissionState,
    ) -> Result<PublishedName, PublishError> {
        if let Some(broker) = self.broker.as_deref().filter(|b| b.is_available()) {
            return self.publish_via_broker(broker, staged, target);
        }

        match &self.legacy_root {
            Some(root) if permission.allows_write() => self.publish_legacy(root, staged, target),
            Some(_) => Err(PublishError::PermissionRequired),
            None => Err(PublishError::NoStrategy),
        }
    }

    fn publish_via_broker(
        &self,
        broker: &dyn StorageBroker,
        staged: &StagedFile,
        target: &PublishTarget,
    ) -> Result<PublishedName, PublishError> {
        let mut source = open_source(staged)?;

        let mut entry = match broker.register_entry(target) {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                return Err(PublishError::BrokerRejected(format!(
                    "refused to register '{}' under {}",
                    target.display_name(),
                    target.relative_path()
                )))
            }
            Err(e) => return Err(PublishError::BrokerRejected(e.to_string())),
        };

        tracing::debug!(
            "Registered '{}' ({}) under {}",
            target.display_name(),
            target.mime_type(),
            target.relative_path()
        );

        let copied = copy_chunked(&mut source, &mut entry, self.chunk_size)
            .and_then(|copied| check_length(copied, staged.size_bytes));

        match copied {
            Ok(_) => entry.commit().map_err(|e| PublishError::CopyFailed {
                reason: format!("failed to finish entry: {}", e),
                partial_left: true,
            }),
            Err(e) => {
                let partial_left = match entry.discard() {
                    Ok(()) => false,
                    Err(discard_err) => {
                        tracing::warn!(
                            "Partial entry '{}' left in public storage: {}",
                            target.display_name(),
                            discard_err
                        );
                        true
                    }
                };
                Err(PublishError::CopyFailed {
                    reason: e.to_string(),
                    partial_left,
                })
            }
        }
    }

    fn publish_legacy(
        &self,
        root: &Path,
        staged: &StagedFile,
        target: &PublishTarget,
    ) -> Result<PublishedName, PublishError> {
        let mut source = open_source(staged)?;

        let dir = join_relative(root, target.relative_path()).map_err(|e| {
            PublishError::CopyFailed {
                reason: e.to_string(),
                partial_left: false,
            }
        })?;
        std::fs::create_dir_all(&dir).map_err(|e| PublishError::CopyFailed {
            reason: format!("cannot create {}: {}", dir.display(), e),
            partial_left: false,
        })?;

        let destination = make_unique_filename(&dir.join(target.display_name()));
        tracing::debug!("Publishing via legacy path {}", destination.display());

        let mut output = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&destination)
            .map_err(|e| PublishError::CopyFailed {
                reason: format!("cannot create {}: {}", destination.display(), e),
                partial_left: false,
            })?;

        let copied = copy_chunked(&mut source, &mut output, self.chunk_size)
            .and_then(|copied| check_length(copied, staged.size_bytes))
            .and_then(|_| output.sync_all());
        drop(output);

        match copied {
            Ok(()) => Ok(destination
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| target.display_name().to_string())),
            Err(e) => {
                let partial_left = std::fs::remove_file(&destination).is_err();
                Err(PublishError::CopyFailed {
                    reason: e.to_string(),
                    partial_left,
                })
            }
        }
    }
}

fn open_source(staged: &StagedFile) -> Result<File, PublishError> {
    File::open(&staged.path).map_err(|e| PublishError::CopyFailed {
        reason: format!("cannot open staged file {}: {}", staged.path.display(), e),
        partial_left: false,
    })
}

fn check_length(copied: u64, expected: u64) -> io::Result<()> {
    if copied == expected {
        Ok(())
    } else {
        Err(io::Error::new(
            ErrorKind::UnexpectedEof,
            format!("copied {} of {} staged bytes", copied, expected),
        ))
    }
}

/// Copy `reader` into `writer` in chunks of at most `chunk_size` bytes.
pub fn copy_chunked<R, W>(reader: &mut R, writer: &mut W, chunk_size: usize) -> io::Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = vec![0u8; chunk_size];
    let mut total: u64 = 0;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buf[..n])?;
        total += n as u64;
    }

    writer.flush()?;
    Ok(total)
}
