//! module-sync library
//!
//! Brings external module repositories into a Gradle workspace: clones or
//! pulls each configured module, then registers its build directories with
//! the build graph.

pub mod git;
pub mod output;
pub mod utils;
pub mod workspace;

// Re-export commonly used types
pub use git::{RemoteCredential, SyncExecutor, SyncResult};
pub use workspace::{RunMode, SettingsGraph, SyncConfig, WorkspaceOrchestrator};
