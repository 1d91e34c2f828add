use console::style;
use std::path::PathBuf;

use super::attacher::{AttachOutcome, ModuleAttacher};
use super::config::SyncConfig;
use super::graph::BuildGraph;
use super::run_mode::RunMode;
use crate::git::{
    CommandKind, CommandResolver, ModuleSyncer, RemoteCredential, SyncExecutor,
};
use crate::{display_println, log_debug, log_info};

/// Final state of one module after a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleStatus {
    Attached { paths: Vec<String> },
    Default,
    SyncFailed,
    AttachFailed { reasons: Vec<String> },
}

#[derive(Debug, Clone)]
pub struct ModuleReport {
    pub module: String,
    /// Which remote operation ran, if any
    pub synced: Option<CommandKind>,
    pub status: ModuleStatus,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub mode: RunMode,
    pub reports: Vec<ModuleReport>,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        self.failed_modules().next().is_some()
    }

    pub fn failed_modules(&self) -> impl Iterator<Item = &str> {
        self.reports
            .iter()
            .filter(|r| {
                matches!(
                    r.status,
                    ModuleStatus::SyncFailed | ModuleStatus::AttachFailed { .. }
                )
            })
            .map(|r| r.module.as_str())
    }

    pub fn report(&self, module: &str) -> Option<&ModuleReport> {
        self.reports.iter().find(|r| r.module == module)
    }

    pub fn print(&self) {
        let attached = self
            .reports
            .iter()
            .filter(|r| matches!(r.status, ModuleStatus::Attached { .. }))
            .count();
        let defaulted = self
            .reports
            .iter()
            .filter(|r| r.status == ModuleStatus::Default)
            .count();
        let failed: Vec<&str> = self.failed_modules().collect();

        display_println!(
            "{} {} module(s) processed ({}): {} attached, {} by default, {} failed",
            style("•").blue(),
            self.reports.len(),
            self.mode.as_str(),
            style(attached).green().bold(),
            style(defaulted).yellow(),
            style(failed.len()).red().bold()
        );
        if !failed.is_empty() {
            display_println!("  {} {}", style("Failed:").red(), failed.join(", "));
        }
    }
}

/// Drives sync and attach for every configured module
pub struct WorkspaceOrchestrator<S = SyncExecutor> {
    config: SyncConfig,
    workspace_root: PathBuf,
    credential: RemoteCredential,
    syncer: S,
}

impl WorkspaceOrchestrator<SyncExecutor> {
    pub fn new(config: SyncConfig, workspace_root: PathBuf, credential: RemoteCredential) -> Self {
        let syncer = SyncExecutor::new(workspace_root.clone(), config.progress_prefixes.clone())
            .with_timeout(config.sync_timeout());
        Self::with_syncer(config, workspace_root, credential, syncer)
    }
}

impl<S: ModuleSyncer> WorkspaceOrchestrator<S> {
    pub fn with_syncer(
        config: SyncConfig,
        workspace_root: PathBuf,
        credential: RemoteCredential,
        syncer: S,
    ) -> Self {
        Self {
            config,
            workspace_root,
            credential,
            syncer,
        }
    }

    /// Process every module once, in configuration order.
    ///
    /// Per-module problems are reported and recorded in the summary; they
    /// never stop the run.
    pub fn run(&self, mode: RunMode, graph: &mut dyn BuildGraph) -> RunSummary {
        log_info!(
            "Processing {} module(s) in {} mode",
            self.config.modules.len(),
            mode.as_str()
        );

        let resolver = CommandResolver::new(
            &self.workspace_root,
            &self.config.remote,
            &self.config.git_binary,
        );
        let attacher = ModuleAttacher::new(&self.workspace_root, &self.config.marker_files)
            .continue_after_failure(self.config.continue_after_attach_failure);

        let mut reports = Vec::with_capacity(self.config.modules.len());

        for (module, entries) in &self.config.modules {
            let entries = entries.as_deref();

            let report = match mode {
                RunMode::InteractiveAttach => ModuleReport {
                    module: module.clone(),
                    synced: None,
                    status: status_of(attacher.attach(module, entries, graph)),
                },
                RunMode::SyncAndAttach => {
                    let command = resolver.resolve(module, &self.credential);
                    let result = self.syncer.sync(module, &command);

                    let status = if result.is_success() {
                        status_of(attacher.attach(module, entries, graph))
                    } else {
                        display_println!(
                            "{}",
                            style(format!(
                                "Output of the failed sync for module {module}:\n{}",
                                result.captured_output
                            ))
                            .red()
                        );
                        ModuleStatus::SyncFailed
                    };
                    display_println!();

                    ModuleReport {
                        module: module.clone(),
                        synced: Some(command.kind()),
                        status,
                    }
                }
            };

            log_debug!("Module {} finished: {:?}", report.module, report.status);
            reports.push(report);
        }

        RunSummary { mode, reports }
    }
}

fn status_of(outcome: AttachOutcome) -> ModuleStatus {
    match outcome {
        AttachOutcome::Default => ModuleStatus::Default,
        AttachOutcome::Attached { paths } => ModuleStatus::Attached { paths },
        AttachOutcome::Failed { reasons, .. } => ModuleStatus::AttachFailed { reasons },
    }
}
