//! End-to-end runs against a stand-in `git` script

#![cfg(unix)]

use anyhow::Result;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use module_sync::git::{CommandKind, RemoteCredential, RemoteTemplate};
use module_sync::workspace::{
    ModuleConfig, ModuleStatus, RunMode, SettingsGraph, SyncConfig, WorkspaceOrchestrator,
};

/// Pulls always succeed. Clones succeed for `./fresh` (creating a buildable
/// checkout) and fail for anything else. Every invocation is logged.
const FAKE_GIT: &str = r#"#!/bin/sh
echo "$@" >> "$(dirname "$0")/calls.log"
if [ "$1" = "-C" ]; then
  echo "Already up to date."
  exit 0
fi
if [ "$1" = "clone" ]; then
  echo "Cloning into '$4'..."
  if [ "$4" = "./fresh" ]; then
    printf 'Receiving objects:  50%% (1/2)\rReceiving objects: 100%% (2/2), done.\n'
    mkdir -p "$4/app"
    touch "$4/app/build.gradle.kts"
    exit 0
  fi
  echo "remote: Repository not found." >&2
  echo "fatal: repository not found" >&2
  exit 128
fi
exit 2
"#;

/// Workspace with a stand-in git binary next to it
fn setup_workspace() -> Result<(TempDir, PathBuf, PathBuf)> {
    let temp_dir = TempDir::new()?;
    let tools = temp_dir.path().join("tools");
    let root = temp_dir.path().join("workspace");
    fs::create_dir_all(&tools)?;
    fs::create_dir_all(&root)?;

    let git = tools.join("git");
    fs::write(&git, FAKE_GIT)?;
    fs::set_permissions(&git, fs::Permissions::from_mode(0o755))?;

    Ok((temp_dir, root, git))
}

fn buildable(root: &Path, rel: &str) -> Result<()> {
    let dir = root.join(rel);
    fs::create_dir_all(&dir)?;
    fs::write(dir.join("build.gradle.kts"), "plugins {}\n")?;
    Ok(())
}

fn config_for(git: &Path) -> SyncConfig {
    let mut config = SyncConfig::default();
    config.git_binary = git.display().to_string();
    config.remote = RemoteTemplate {
        host_path: "git.example.com/mobile".to_string(),
        ..RemoteTemplate::default()
    };
    config.modules.clear();
    config
        .modules
        .insert("core".to_string(), Some(vec![ModuleConfig::new("Space-Core", "./core")]));
    config
        .modules
        .insert("fresh".to_string(), Some(vec![ModuleConfig::new("Space-Fresh:App", "./fresh/app")]));
    config
        .modules
        .insert("gone".to_string(), Some(vec![ModuleConfig::new("Space-Gone", "./gone")]));
    config.modules.insert("build-logic".to_string(), None);
    config
}

fn calls(git: &Path) -> Result<Vec<String>> {
    let log = git.with_file_name("calls.log");
    if !log.exists() {
        return Ok(Vec::new());
    }
    Ok(fs::read_to_string(log)?.lines().map(str::to_string).collect())
}

#[tokio::test]
async fn test_sync_run_clones_pulls_and_writes_settings() -> Result<()> {
    let (_temp_dir, root, git) = setup_workspace()?;
    buildable(&root, "core")?;
    fs::create_dir_all(root.join("build-logic"))?;

    let config = config_for(&git);
    let settings_path = config.settings_output_path(&root);
    let orchestrator =
        WorkspaceOrchestrator::new(config, root.clone(), RemoteCredential::new("abc123"));

    let mut graph = SettingsGraph::new();
    let summary = orchestrator.run(RunMode::SyncAndAttach, &mut graph);
    graph.write_to(&settings_path).await?;

    assert_eq!(
        calls(&git)?,
        [
            "-C ./build-logic pull --progress",
            "-C ./core pull --progress",
            "clone --progress https://abc123@git.example.com/mobile/Android-Space-fresh.git ./fresh",
            "clone --progress https://abc123@git.example.com/mobile/Android-Space-gone.git ./gone",
        ]
    );

    assert_eq!(summary.report("build-logic").unwrap().status, ModuleStatus::Default);
    assert_eq!(
        summary.report("core").unwrap().synced,
        Some(CommandKind::Update)
    );
    assert!(matches!(
        summary.report("fresh").unwrap().status,
        ModuleStatus::Attached { .. }
    ));
    assert_eq!(summary.report("gone").unwrap().status, ModuleStatus::SyncFailed);
    assert!(summary.has_failures());

    let settings = fs::read_to_string(&settings_path)?;
    assert!(settings.contains("include(\":Space-Core\")"));
    assert!(settings.contains("project(\":Space-Fresh:App\").projectDir = file(\"./fresh/app\")"));
    assert!(!settings.contains("Space-Gone"));
    assert!(!settings.contains("abc123"));

    Ok(())
}

#[tokio::test]
async fn test_second_run_pulls_what_the_first_cloned() -> Result<()> {
    let (_temp_dir, root, git) = setup_workspace()?;
    let mut config = config_for(&git);
    config.modules.retain(|name, _| name == "fresh");

    let orchestrator = WorkspaceOrchestrator::new(config, root.clone(), RemoteCredential::none());

    let first = orchestrator.run(RunMode::SyncAndAttach, &mut SettingsGraph::new());
    let second = orchestrator.run(RunMode::SyncAndAttach, &mut SettingsGraph::new());

    assert_eq!(first.report("fresh").unwrap().synced, Some(CommandKind::Fetch));
    assert_eq!(second.report("fresh").unwrap().synced, Some(CommandKind::Update));
    assert!(!second.has_failures());

    let calls = calls(&git)?;
    assert_eq!(
        calls[0],
        "clone --progress https://git.example.com/mobile/Android-Space-fresh.git ./fresh"
    );
    assert_eq!(calls[1], "-C ./fresh pull --progress");

    Ok(())
}

#[tokio::test]
async fn test_attach_only_run_never_invokes_git() -> Result<()> {
    let (_temp_dir, root, git) = setup_workspace()?;
    buildable(&root, "core")?;

    let orchestrator =
        WorkspaceOrchestrator::new(config_for(&git), root.clone(), RemoteCredential::none());

    let mut graph = SettingsGraph::new();
    let summary = orchestrator.run(RunMode::InteractiveAttach, &mut graph);

    assert!(calls(&git)?.is_empty());
    assert!(graph.contains("Space-Core"));
    assert_eq!(summary.report("build-logic").unwrap().status, ModuleStatus::Default);
    assert!(matches!(
        summary.report("gone").unwrap().status,
        ModuleStatus::AttachFailed { .. }
    ));

    Ok(())
}
