//! Build-graph registration.
//!
//! The build system owns the project graph; this crate only hands it
//! `include` / project-directory pairs. [`SettingsGraph`] collects them and
//! renders a Gradle settings fragment for `settings.gradle.kts` to apply.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Registration surface of the surrounding build system
pub trait BuildGraph {
    /// Add a project under `logical_path`
    fn include(&mut self, logical_path: &str) -> Result<(), GraphError>;

    /// Point an included project at a directory
    fn set_project_dir(&mut self, logical_path: &str, dir: &Path) -> Result<(), GraphError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Project '{0}' is already registered")]
    AlreadyIncluded(String),

    #[error("Project '{0}' must be included before its directory is set")]
    NotIncluded(String),

    #[error("Project path '{0}' is empty")]
    EmptyPath(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Gradle path with the leading `:`
    pub project_path: String,
    pub project_dir: Option<PathBuf>,
}

/// Records registrations in order and refuses to register a path twice
#[derive(Debug, Default)]
pub struct SettingsGraph {
    registrations: Vec<Registration>,
}

impl SettingsGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn contains(&self, logical_path: &str) -> bool {
        gradle_path(logical_path)
            .map(|path| self.find(&path).is_some())
            .unwrap_or(false)
    }

    /// Kotlin script applying every registration
    pub fn render(&self) -> String {
        let mut script = String::from(
            "// Generated by module-sync. Changes are overwritten on the next run.\n",
        );

        for registration in &self.registrations {
            let path = kotlin_string(&registration.project_path);
            script.push_str(&format!("include({path})\n"));
            if let Some(dir) = &registration.project_dir {
                let dir = kotlin_string(&dir.to_string_lossy().replace('\\', "/"));
                script.push_str(&format!("project({path}).projectDir = file({dir})\n"));
            }
        }

        script
    }

    pub async fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        fs::write(path, self.render())
            .await
            .with_context(|| format!("Failed to write settings fragment: {}", path.display()))
    }

    fn find(&self, project_path: &str) -> Option<usize> {
        self.registrations
            .iter()
            .position(|r| r.project_path == project_path)
    }
}

impl BuildGraph for SettingsGraph {
    fn include(&mut self, logical_path: &str) -> Result<(), GraphError> {
        let project_path = gradle_path(logical_path)?;
        if self.find(&project_path).is_some() {
            return Err(GraphError::AlreadyIncluded(project_path));
        }

        self.registrations.push(Registration {
            project_path,
            project_dir: None,
        });
        Ok(())
    }

    fn set_project_dir(&mut self, logical_path: &str, dir: &Path) -> Result<(), GraphError> {
        let project_path = gradle_path(logical_path)?;
        let index = self
            .find(&project_path)
            .ok_or(GraphError::NotIncluded(project_path))?;

        self.registrations[index].project_dir = Some(dir.to_path_buf());
        Ok(())
    }
}

/// `Space-Core/UI`, `Space-Core:UI` and `:Space-Core:UI` all name `:Space-Core:UI`
pub fn gradle_path(logical_path: &str) -> Result<String, GraphError> {
    let segments: Vec<&str> = logical_path
        .split([':', '/'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if segments.is_empty() {
        return Err(GraphError::EmptyPath(logical_path.to_string()));
    }

    Ok(format!(":{}", segments.join(":")))
}

fn kotlin_string(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "\\$");
    format!("\"{escaped}\"")
}
