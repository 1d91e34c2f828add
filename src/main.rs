use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use console::style;
use inquire::Confirm;
use std::path::{Path, PathBuf};

use module_sync::git::RemoteCredential;
use module_sync::output::{self, OutputMode};
use module_sync::utils::git::is_git_available;
use module_sync::workspace::constants::{DEFAULT_CONFIG_FILE, TOKEN_ENV};
use module_sync::workspace::{
    collect_status, print_status, ProcessEnv, RunMode, RunSummary, SettingsGraph, SyncConfig,
    WorkspaceOrchestrator,
};
use module_sync::{display_println, log_debug};

#[derive(Parser)]
#[command(name = "module-sync")]
#[command(
    about = "Clone or pull external module repositories and attach them to the Gradle build",
    long_about = "module-sync prepares a Gradle workspace before the build is configured.\n\
                  Every module listed in modules.yaml is cloned (first run) or pulled, and its\n\
                  build directories are written to a settings fragment that settings.gradle.kts\n\
                  applies.\n\n\
                  Inside an IDE sync (IDEA_SYNC_ACTIVE=true, CI unset) modules are only attached."
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (default: <root>/modules.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Workspace root directory (default: current directory)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Access token for the module repositories
    #[arg(long, global = true, env = TOKEN_ENV, hide_env_values = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync modules and attach them (default)
    Sync(RunArgs),

    /// Attach modules already on disk without syncing
    Attach(RunArgs),

    /// Show each module's local state and the command a sync would run
    Status,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file without asking
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args, Default)]
struct RunArgs {
    /// Skip syncing even outside an IDE sync
    #[arg(long, conflicts_with = "force_sync")]
    attach_only: bool,

    /// Sync even inside an IDE sync
    #[arg(long)]
    force_sync: bool,

    /// Exit with an error when any module fails to sync or attach
    #[arg(long)]
    strict: bool,

    /// Print the settings fragment to stdout instead of writing the file
    #[arg(long)]
    print_settings: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Sync(RunArgs::default()));

    let output_mode = match &command {
        Commands::Sync(args) | Commands::Attach(args) if args.print_settings => OutputMode::Piped,
        _ => OutputMode::Cli,
    };
    output::init_with_verbosity(output_mode, cli.verbose);

    let workspace_root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let config_path = cli
        .config
        .unwrap_or_else(|| workspace_root.join(DEFAULT_CONFIG_FILE));
    log_debug!("Using configuration {}", config_path.display());

    match command {
        Commands::Init { force } => init_config(&config_path, force).await,
        Commands::Status => {
            let config = SyncConfig::load_from_file(&config_path).await?;
            let credential = credential_for(cli.token, &config);
            print_status(&collect_status(&config, &workspace_root, &credential));
            Ok(())
        }
        Commands::Sync(args) => {
            let mode = if args.attach_only {
                RunMode::InteractiveAttach
            } else if args.force_sync {
                RunMode::SyncAndAttach
            } else {
                RunMode::detect(&ProcessEnv)
            };
            run_workspace(&config_path, workspace_root, cli.token, mode, &args).await
        }
        Commands::Attach(args) => {
            run_workspace(
                &config_path,
                workspace_root,
                cli.token,
                RunMode::InteractiveAttach,
                &args,
            )
            .await
        }
    }
}

/// CLI flag or environment first, then the configuration file
fn credential_for(token: Option<String>, config: &SyncConfig) -> RemoteCredential {
    token
        .or_else(|| config.token.clone())
        .map(RemoteCredential::new)
        .unwrap_or_default()
}

async fn run_workspace(
    config_path: &Path,
    workspace_root: PathBuf,
    token: Option<String>,
    mode: RunMode,
    args: &RunArgs,
) -> Result<()> {
    let config = SyncConfig::load_from_file(config_path).await?;
    let credential = credential_for(token, &config);
    let settings_path = config.settings_output_path(&workspace_root);

    if mode.launches_processes() && !is_git_available(&config.git_binary) {
        display_println!(
            "{} '{}' is not available, every module sync will fail",
            style("⚠").yellow(),
            config.git_binary
        );
    }

    let orchestrator = WorkspaceOrchestrator::new(config, workspace_root, credential);
    let (summary, graph): (RunSummary, SettingsGraph) = tokio::task::spawn_blocking(move || {
        let mut graph = SettingsGraph::new();
        let summary = orchestrator.run(mode, &mut graph);
        (summary, graph)
    })
    .await
    .context("Module sync task panicked")?;

    if args.print_settings {
        print!("{}", graph.render());
    } else {
        graph.write_to(&settings_path).await?;
        display_println!(
            "{} Settings written to {}",
            style("✓").green().bold(),
            style(settings_path.display()).dim()
        );
    }

    summary.print();

    if args.strict && summary.has_failures() {
        let failed: Vec<&str> = summary.failed_modules().collect();
        anyhow::bail!("Modules failed to sync or attach: {}", failed.join(", "));
    }

    Ok(())
}

async fn init_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        let overwrite = Confirm::new(&format!(
            "{} already exists. Overwrite it?",
            config_path.display()
        ))
        .with_default(false)
        .prompt()?;

        if !overwrite {
            display_println!("{} Kept existing configuration", style("ℹ").blue());
            return Ok(());
        }
    }

    SyncConfig::default().save_to_file(config_path).await?;

    display_println!(
        "{} Wrote default configuration to {}",
        style("✓").green().bold(),
        style(config_path.display()).dim()
    );
    Ok(())
}
