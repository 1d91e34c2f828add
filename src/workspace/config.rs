use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

use super::constants::{
    DEFAULT_GIT_BINARY, DEFAULT_MARKER_FILES, DEFAULT_MODULE, DEFAULT_SETTINGS_OUTPUT,
};
use super::graph::gradle_path;
use crate::git::{ProgressPrefixes, RemoteTemplate};

/// Where one part of an external module lives and how the build graph names it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// Gradle project path, with or without the leading `:`; `/` and `:`
    /// both separate segments
    pub logical_path: String,
    /// Directory holding the build file, relative to the workspace root
    pub local_path: PathBuf,
}

impl ModuleConfig {
    pub fn new(logical_path: impl Into<String>, local_path: impl Into<PathBuf>) -> Self {
        Self {
            logical_path: logical_path.into(),
            local_path: local_path.into(),
        }
    }

    /// Last component of the local path, used in notices
    pub fn display_name(&self) -> String {
        self.local_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.local_path.display().to_string())
    }
}

/// Module name to its entries. `None` means the module is attached by
/// convention elsewhere and only needs to be synced.
pub type ModuleTable = BTreeMap<String, Option<Vec<ModuleConfig>>>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid remote '{url}': {source}")]
    InvalidRemote {
        url: String,
        source: url::ParseError,
    },

    #[error("Module name '{name}' must be a single non-empty directory name")]
    InvalidModuleName { name: String },

    #[error("Module '{module}' has an entry with an empty logical path")]
    EmptyLogicalPath { module: String },

    #[error("Module '{module}' lists logical path '{path}' more than once")]
    DuplicateLogicalPath { module: String, path: String },

    #[error("At least one marker file is required")]
    NoMarkerFiles,

    #[error("Progress prefixes must not be empty strings")]
    EmptyProgressPrefix,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub remote: RemoteTemplate,
    #[serde(default = "default_git_binary")]
    pub git_binary: String,
    #[serde(default = "default_marker_files")]
    pub marker_files: Vec<String>,
    #[serde(default)]
    pub progress_prefixes: ProgressPrefixes,
    #[serde(default = "default_settings_output")]
    pub settings_output: PathBuf,
    /// No timeout unless set
    #[serde(default)]
    pub sync_timeout_secs: Option<u64>,
    /// Keep attaching a module's later entries after one of them fails
    #[serde(default)]
    pub continue_after_attach_failure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default = "default_modules")]
    pub modules: ModuleTable,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            remote: RemoteTemplate::default(),
            git_binary: default_git_binary(),
            marker_files: default_marker_files(),
            progress_prefixes: ProgressPrefixes::default(),
            settings_output: default_settings_output(),
            sync_timeout_secs: None,
            continue_after_attach_failure: false,
            token: None,
            modules: default_modules(),
        }
    }
}

impl SyncConfig {
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::from_yaml(&contents)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(contents).context("Failed to parse YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .await
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.remote.base_url();
        url::Url::parse(&base).map_err(|source| ConfigError::InvalidRemote { url: base, source })?;

        if self.marker_files.iter().all(|m| m.trim().is_empty()) {
            return Err(ConfigError::NoMarkerFiles);
        }

        if self.progress_prefixes.iter().any(str::is_empty) {
            return Err(ConfigError::EmptyProgressPrefix);
        }

        for (name, entries) in &self.modules {
            if name.trim().is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
                return Err(ConfigError::InvalidModuleName { name: name.clone() });
            }

            let mut seen = Vec::new();
            for entry in entries.iter().flatten() {
                let path = gradle_path(&entry.logical_path).map_err(|_| {
                    ConfigError::EmptyLogicalPath {
                        module: name.clone(),
                    }
                })?;
                if seen.contains(&path) {
                    return Err(ConfigError::DuplicateLogicalPath {
                        module: name.clone(),
                        path,
                    });
                }
                seen.push(path);
            }
        }

        Ok(())
    }

    pub fn sync_timeout(&self) -> Option<Duration> {
        self.sync_timeout_secs.map(Duration::from_secs)
    }

    pub fn module_entries(&self, module: &str) -> Option<&[ModuleConfig]> {
        self.modules.get(module).and_then(|entries| entries.as_deref())
    }

    pub fn settings_output_path(&self, workspace_root: &Path) -> PathBuf {
        workspace_root.join(&self.settings_output)
    }
}

fn default_git_binary() -> String {
    DEFAULT_GIT_BINARY.to_string()
}

fn default_marker_files() -> Vec<String> {
    DEFAULT_MARKER_FILES.iter().map(|m| m.to_string()).collect()
}

fn default_settings_output() -> PathBuf {
    PathBuf::from(DEFAULT_SETTINGS_OUTPUT)
}

fn default_modules() -> ModuleTable {
    let mut modules = BTreeMap::new();
    modules.insert(DEFAULT_MODULE.to_string(), None);
    modules
}
