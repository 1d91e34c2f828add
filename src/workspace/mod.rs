mod attacher;
pub mod config;
pub mod constants;
pub mod graph;
mod orchestrator;
mod run_mode;
mod status;

pub use attacher::{AttachOutcome, ModuleAttacher};
pub use config::{ConfigError, ModuleConfig, ModuleTable, SyncConfig};
pub use graph::{BuildGraph, GraphError, Registration, SettingsGraph};
pub use orchestrator::{ModuleReport, ModuleStatus, RunSummary, WorkspaceOrchestrator};
pub use run_mode::{EnvSource, ProcessEnv, RunMode};
pub use status::{collect_status, print_status, EntryState, ModuleState};
