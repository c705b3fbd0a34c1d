//! Download module.
//!
//! This module provides:
//! - Download requests and outcomes
//! - The coordinator state machine
//! - Progress throttling

pub mod coordinator;
pub mod progress;
pub mod request;
pub mod state;

pub use coordinator::{Dependencies, DownloadCoordinator, DownloadTicket};
pub use progress::ProgressThrottle;
pub use request::{DownloadOutcome, DownloadRequest};
pub use state::Phase;
