//! Desktop storage broker and permission host.
//!
//! Desktops have no storage broker service, so [`DirectoryBroker`] plays one
//! over a public directory: entries are written under a hidden pending name
//! and linked into place on commit, so a half-written file is never
//! visible under its final name and an existing file is never replaced.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use crate::fs::{join_relative, make_unique_filename, sanitize_filename};
use crate::permission::{Capability, PermissionBroker, PermissionState};
use crate::publish::{EntryWriter, PublishTarget, StorageBroker};

/// Storage broker backed by a user-visible directory tree.
#[derive(Debug, Clone)]
pub struct DirectoryBroker {
    root: PathBuf,
}

impl DirectoryBroker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl StorageBroker for DirectoryBroker {
    fn register_entry(&self, target: &PublishTarget) -> io::Result<Option<Box<dyn EntryWriter>>> {
        let dir = match join_relative(&self.root, target.relative_path()) {
            Ok(dir) => dir,
            Err(e) => {
                tracing::warn!("Refusing entry: {}", e);
                return Ok(None);
            }
        };
        let name = match sanitize_filename(target.display_name()) {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!("Refusing entry: {}", e);
                return Ok(None);
            }
        };

        std::fs::create_dir_all(&dir)?;

        let pending = dir.join(format!(".pending-{}-{}", Uuid::new_v4(), name));
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&pending)?;

        Ok(Some(Box::new(DirectoryEntry {
            file,
            pending,
            destination: dir.join(name),
        })))
    }
}

struct DirectoryEntry {
    file: File,
    pending: PathBuf,
    destination: PathBuf,
}

impl Write for DirectoryEntry {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl EntryWriter for DirectoryEntry {
    fn commit(self: Box<Self>) -> io::Result<String> {
        let DirectoryEntry {
            file,
            pending,
            destination,
        } = *self;

        file.sync_all()?;
        drop(file);

        let destination = place_without_clobbering(&pending, &destination)?;

        Ok(destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default())
    }

    fn discard(self: Box<Self>) -> io::Result<()> {
        let DirectoryEntry { file, pending, .. } = *self;
        drop(file);
        std::fs::remove_file(pending)
    }
}

/// Give `pending` a free name next to `destination` and return it.
///
/// `hard_link` fails with `AlreadyExists` instead of replacing, so a file
/// created by another process between the name check and the link survives;
/// the next candidate is tried instead.
fn place_without_clobbering(pending: &Path, destination: &Path) -> io::Result<PathBuf> {
    const MAX_ATTEMPTS: usize = 100;

    for _ in 0..MAX_ATTEMPTS {
        let candidate = make_unique_filename(destination);
        match std::fs::hard_link(pending, &candidate) {
            Ok(()) => {
                std::fs::remove_file(pending)?;
                return Ok(candidate);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free name for {}", destination.display()),
    ))
}

/// Permission host for platforms without a permission concept.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostPermissions;

#[async_trait]
impl PermissionBroker for HostPermissions {
    async fn request(&self, _capabilities: &[Capability]) -> PermissionState {
        PermissionState::Unavailable
    }
}
