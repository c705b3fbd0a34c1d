//! Platform implementations of the external brokers.
//!
//! Provides:
//! - A directory-backed storage broker
//! - Permission brokers for desktop hosts (none, prompt, fixed answer)

pub mod desktop;
pub mod prompt;

use std::sync::Arc;

pub use desktop::{DirectoryBroker, HostPermissions};
pub use prompt::{ConsolePermissions, FixedPermissions};

use crate::config::PermissionMode;
use crate::permission::{PermissionBroker, PermissionState};

/// Pick the permission broker for a configured mode.
pub fn permission_broker(mode: PermissionMode) -> Arc<dyn PermissionBroker> {
    match mode {
        PermissionMode::Prompt => Arc::new(ConsolePermissions::new()),
        PermissionMode::Granted => Arc::new(FixedPermissions(PermissionState::Granted)),
        PermissionMode::Denied => Arc::new(FixedPermissions(PermissionState::Denied)),
        PermissionMode::Unavailable => Arc::new(HostPermissions),
    }
}
