//! Filesystem module.
//!
//! Provides:
//! - Path and directory management
//! - Filename generation and manipulation
//! - The private staging area

pub mod naming;
pub mod paths;
pub mod staging;

pub use naming::{
    coerce_filename, extension_of, make_unique_filename, sanitize_filename, suggested_name,
};
pub use paths::{ensure_dir, join_relative};
pub use staging::{StagedFile, StagingArea};
