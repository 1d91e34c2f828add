use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Check if the given git binary can be run
pub fn is_git_available(git_binary: &str) -> bool {
    Command::new(git_binary)
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Check whether `path` is the top of a git checkout
pub fn is_git_repository<P: AsRef<Path>>(path: P) -> bool {
    git2::Repository::open(path.as_ref()).is_ok()
}

/// Current branch of the checkout at `repo_path`, `None` before the first commit
pub fn get_current_branch<P: AsRef<Path>>(repo_path: P) -> Result<Option<String>> {
    let repo_path = repo_path.as_ref();
    let repo = git2::Repository::open(repo_path)
        .with_context(|| format!("Failed to open git repository: {}", repo_path.display()))?;

    let head = match repo.head() {
        Ok(head) => head,
        Err(ref e) if e.code() == git2::ErrorCode::UnbornBranch => {
            debug!("Repository has no commits yet: {}", repo_path.display());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    Ok(head.shorthand().map(|s| s.to_string()))
}
