//! Path and directory management.

use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Ensure a directory exists, creating it if necessary. Idempotent.
pub async fn ensure_dir(path: &Path) -> std::io::Result<()> {
    match tokio::fs::create_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(e),
    }
}

/// Join a `/`-separated relative path below `root`, refusing anything that
/// would escape it.
pub fn join_relative(root: &Path, relative: &str) -> Result<PathBuf> {
    let relative_path = Path::new(relative);
    let mut path = root.to_path_buf();

    for component in relative_path.components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir => {}
            _ => {
                return Err(Error::InvalidFilename(format!(
                    "Relative path escapes its root: '{}'",
                    relative
                )))
            }
        }
    }

    Ok(path)
}
