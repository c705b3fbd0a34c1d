//! Publish module.
//!
//! This module provides:
//! - Publish target derivation (display name, MIME type, public category)
//! - The storage broker interface
//! - The publisher with its broker-first, legacy-second strategy

pub mod broker;
pub mod publisher;
pub mod target;

pub use broker::{EntryWriter, StorageBroker};
pub use publisher::{copy_chunked, PublishedName, Publisher};
pub use target::{mime_for_name, MediaCategory, PublishTarget, GENERIC_MIME};
