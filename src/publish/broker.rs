//! Storage broker interface.

use std::io::{self, Write};

use crate::publish::PublishTarget;

/// Write handle for a registered public entry.
///
/// The handle is closed when it is consumed by [`commit`](EntryWriter::commit)
/// or [`discard`](EntryWriter::discard), or dropped.
pub trait EntryWriter: Write + Send {
    /// Finish the entry and return its user-visible name.
    fn commit(self: Box<Self>) -> io::Result<String>;

    /// Delete the partially written entry.
    fn discard(self: Box<Self>) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "broker cannot delete entries by handle",
        ))
    }
}

/// OS-mediated insertion into public storage.
pub trait StorageBroker: Send + Sync {
    /// Whether this host offers the broker at all.
    fn is_available(&self) -> bool {
        true
    }

    /// Register an entry and obtain a write handle.
    ///
    /// `Ok(None)` means the broker refused the entry.
    fn register_entry(&self, target: &PublishTarget) -> io::Result<Option<Box<dyn EntryWriter>>>;
}
