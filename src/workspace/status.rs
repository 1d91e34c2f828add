use console::style;
use std::path::{Path, PathBuf};

use super::attacher::ModuleAttacher;
use super::config::SyncConfig;
use crate::display_println;
use crate::git::{CommandResolver, RemoteCredential, SyncCommand};
use crate::utils::git::{get_current_branch, is_git_repository};

/// Local view of one configured module, without touching the network
#[derive(Debug, Clone)]
pub struct ModuleState {
    pub module: String,
    pub present: bool,
    pub branch: Option<String>,
    /// Command a sync run would execute right now
    pub planned: SyncCommand,
    /// `None` when the module has no entries
    pub entries: Option<Vec<EntryState>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryState {
    pub logical_path: String,
    pub local_path: PathBuf,
    pub buildable: bool,
}

pub fn collect_status(
    config: &SyncConfig,
    workspace_root: &Path,
    credential: &RemoteCredential,
) -> Vec<ModuleState> {
    let resolver = CommandResolver::new(workspace_root, &config.remote, &config.git_binary);
    let attacher = ModuleAttacher::new(workspace_root, &config.marker_files);

    config
        .modules
        .iter()
        .map(|(module, entries)| {
            let dir = workspace_root.join(module);
            let branch = if is_git_repository(&dir) {
                get_current_branch(&dir).ok().flatten()
            } else {
                None
            };

            ModuleState {
                module: module.clone(),
                present: dir.is_dir(),
                branch,
                planned: resolver.resolve(module, credential),
                entries: entries.as_ref().map(|entries| {
                    entries
                        .iter()
                        .map(|entry| EntryState {
                            logical_path: entry.logical_path.clone(),
                            local_path: entry.local_path.clone(),
                            buildable: attacher.has_build_marker(&entry.local_path),
                        })
                        .collect()
                }),
            }
        })
        .collect()
}

pub fn print_status(states: &[ModuleState]) {
    for state in states {
        let presence = if state.present {
            style("present").green().to_string()
        } else {
            style("missing").yellow().to_string()
        };
        let branch = state
            .branch
            .as_deref()
            .map(|b| format!(" on {}", style(b).white().bold()))
            .unwrap_or_default();

        display_println!("{} [{}]{}", style(&state.module).cyan().bold(), presence, branch);
        display_println!("  {} {}", style("next sync:").dim(), state.planned);

        match &state.entries {
            None => display_println!("  {}", style("attached by default").dim()),
            Some(entries) => {
                for entry in entries {
                    let mark = if entry.buildable {
                        style("✓").green()
                    } else {
                        style("✗").red()
                    };
                    display_println!(
                        "  {} {} → {}",
                        mark,
                        entry.logical_path,
                        entry.local_path.display()
                    );
                }
            }
        }
    }
}
