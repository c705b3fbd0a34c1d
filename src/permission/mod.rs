//! Permission module.
//!
//! Provides:
//! - Capability and permission state types
//! - The platform permission broker interface
//! - A gate that caches grants and serializes prompts

pub mod gate;

use std::fmt;

use async_trait::async_trait;

pub use gate::PermissionGate;

/// A named grant required before an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    WriteSharedStorage,
    ReadSharedStorage,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::WriteSharedStorage => write!(f, "write shared storage"),
            Capability::ReadSharedStorage => write!(f, "read shared storage"),
        }
    }
}

/// Capabilities a publish needs.
pub const PUBLISH_CAPABILITIES: &[Capability] = &[Capability::WriteSharedStorage];

/// Whether the process currently holds a capability set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    #[default]
    Unknown,
    Granted,
    Denied,
    /// The host has no permission concept; access is implicitly granted.
    Unavailable,
}

impl PermissionState {
    /// Whether writing shared storage may proceed in this state.
    pub fn allows_write(&self) -> bool {
        matches!(self, PermissionState::Granted | PermissionState::Unavailable)
    }
}

impl fmt::Display for PermissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionState::Unknown => write!(f, "unknown"),
            PermissionState::Granted => write!(f, "granted"),
            PermissionState::Denied => write!(f, "denied"),
            PermissionState::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// Platform side of a permission round-trip.
///
/// `request` may show a native, modal prompt and suspends until the user
/// (or OS) answers. Implementations return `Denied` if any capability is
/// refused and `Unavailable` when the host has no permission concept.
#[async_trait]
pub trait PermissionBroker: Send + Sync {
    async fn request(&self, capabilities: &[Capability]) -> PermissionState;
}
