//! Unified output interface for the CLI
//!
//! User-facing notices go to stdout in normal operation. When the settings
//! fragment itself is printed to stdout, every notice is routed to stderr so
//! the fragment can be piped into a file untouched.

mod config;
mod display;
mod logging;
#[doc(hidden)]
pub mod writer;

pub use config::{OutputConfig, OutputMode};
pub use writer::display_writer;

use once_cell::sync::OnceCell;
use std::sync::RwLock;

static OUTPUT_CONFIG: OnceCell<RwLock<OutputConfig>> = OnceCell::new();

/// Initialize the output system with the specified mode and verbosity
pub fn init_with_verbosity(mode: OutputMode, verbose: bool) {
    let mut config = OutputConfig::new(mode);
    if verbose {
        config.set_verbose();
    }

    config.init_tracing();

    if OUTPUT_CONFIG.set(RwLock::new(config)).is_err() {
        tracing::warn!("Output system already initialized, keeping the first configuration");
    }
}

/// Get current output mode
pub fn current_mode() -> OutputMode {
    OUTPUT_CONFIG
        .get()
        .and_then(|config| config.read().ok().map(|c| c.mode()))
        // Library callers and tests never initialize the output system
        .unwrap_or(OutputMode::Cli)
}
