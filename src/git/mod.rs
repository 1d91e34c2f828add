//! Remote operations for external module repositories: deciding between a
//! fresh clone and an in-place pull, running the command, and redrawing its
//! progress output.

pub mod executor;
pub mod progress;
pub mod remote;
pub mod resolver;

pub use executor::{ModuleSyncer, SyncExecutor, SyncOutcome, SyncResult};
pub use progress::{ProgressFormatter, ProgressPrefixes};
pub use remote::{RemoteCredential, RemoteTemplate};
pub use resolver::{CommandKind, CommandResolver, SyncCommand};

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Failed to launch '{program}': {source}")]
    Launch {
        program: String,
        source: std::io::Error,
    },

    #[error("Failed to read output of '{program}': {source}")]
    Output {
        program: String,
        source: std::io::Error,
    },

    #[error("Timed out after {after:?}")]
    TimedOut { after: Duration },
}
