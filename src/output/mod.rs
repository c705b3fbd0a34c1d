//! Output module for console output and progress.
//!
//! Provides:
//! - Colored console output
//! - Progress bars
//! - The terminal status sink

pub mod console;
pub mod progress;
pub mod sink;

pub use self::console::{
    print_banner, print_config_summary, print_error, print_info, print_success, print_warning,
};
pub use progress::{create_spinner, set_download_style};
pub use sink::ConsoleSink;
