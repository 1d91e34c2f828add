use console::style;
use std::path::Path;

use super::config::ModuleConfig;
use super::graph::BuildGraph;
use crate::{display_println, log_debug};

/// What happened to one module's entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachOutcome {
    /// No entries configured; the build includes the module by convention
    Default,
    /// Every entry registered, by logical path
    Attached { paths: Vec<String> },
    /// At least one entry could not be registered
    Failed {
        attached: Vec<String>,
        reasons: Vec<String>,
    },
}

impl AttachOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, AttachOutcome::Failed { .. })
    }
}

pub struct ModuleAttacher<'a> {
    workspace_root: &'a Path,
    marker_files: &'a [String],
    continue_after_failure: bool,
}

impl<'a> ModuleAttacher<'a> {
    pub fn new(workspace_root: &'a Path, marker_files: &'a [String]) -> Self {
        Self {
            workspace_root,
            marker_files,
            continue_after_failure: false,
        }
    }

    pub fn continue_after_failure(mut self, enabled: bool) -> Self {
        self.continue_after_failure = enabled;
        self
    }

    /// True if `local_path` is a directory holding one of the marker files
    pub fn has_build_marker(&self, local_path: &Path) -> bool {
        let dir = self.workspace_root.join(local_path);
        dir.is_dir()
            && self
                .marker_files
                .iter()
                .any(|marker| dir.join(marker).is_file())
    }

    pub fn attach(
        &self,
        module: &str,
        configs: Option<&[ModuleConfig]>,
        graph: &mut dyn BuildGraph,
    ) -> AttachOutcome {
        let Some(configs) = configs else {
            display_println!(
                "{}",
                style(format!(
                    "No specific configuration for module '{module}', attached by default."
                ))
                .yellow()
            );
            return AttachOutcome::Default;
        };

        let mut attached = Vec::new();
        let mut reasons = Vec::new();

        for config in configs {
            match self.attach_entry(config, graph) {
                Ok(()) => {
                    display_println!(
                        "{}",
                        style(format!(
                            "Module '{}' successfully attached at '{}'",
                            config.display_name(),
                            config.logical_path
                        ))
                        .magenta()
                    );
                    attached.push(config.logical_path.clone());
                }
                Err(reason) => {
                    display_println!(
                        "\n{}\n",
                        style(format!(
                            "Failed to attach module '{module}': {reason}. Please ensure the module \
                             configuration is correct and try again. If issues persist, consider \
                             syncing Gradle manually."
                        ))
                        .red()
                    );
                    reasons.push(reason);

                    if !self.continue_after_failure {
                        break;
                    }
                }
            }
        }

        if reasons.is_empty() {
            AttachOutcome::Attached { paths: attached }
        } else {
            AttachOutcome::Failed { attached, reasons }
        }
    }

    fn attach_entry(&self, config: &ModuleConfig, graph: &mut dyn BuildGraph) -> Result<(), String> {
        if !self.has_build_marker(&config.local_path) {
            return Err(format!(
                "no {} found in '{}'",
                self.marker_files.join(" or "),
                config.local_path.display()
            ));
        }

        log_debug!(
            "Registering {} at {}",
            config.logical_path,
            config.local_path.display()
        );
        graph
            .include(&config.logical_path)
            .and_then(|()| graph.set_project_dir(&config.logical_path, &config.local_path))
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::graph::SettingsGraph;
    use std::fs;
    use tempfile::TempDir;

    fn markers() -> Vec<String> {
        vec!["build.gradle.kts".to_string(), "settings.gradle.kts".to_string()]
    }

    fn buildable(root: &Path, rel: &str, marker: &str) {
        let dir = root.join(rel);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(marker), "").unwrap();
    }

    #[test]
    fn test_absent_configuration_is_default_attach() {
        let root = TempDir::new().unwrap();
        let markers = markers();
        let attacher = ModuleAttacher::new(root.path(), &markers);
        let mut graph = SettingsGraph::new();

        let outcome = attacher.attach("build-logic", None, &mut graph);

        assert_eq!(outcome, AttachOutcome::Default);
        assert!(graph.is_empty());
    }

    #[test]
    fn test_entries_with_markers_are_registered() {
        let root = TempDir::new().unwrap();
        buildable(root.path(), "UI/UI-App", "build.gradle.kts");
        buildable(root.path(), "UI/SpaceUI", "settings.gradle.kts");
        let markers = markers();
        let attacher = ModuleAttacher::new(root.path(), &markers);
        let mut graph = SettingsGraph::new();

        let configs = [
            ModuleConfig::new("Space-App-UI", "./UI/UI-App"),
            ModuleConfig::new("Space-Core:UI", "./UI/SpaceUI"),
        ];
        let outcome = attacher.attach("UI", Some(&configs), &mut graph);

        assert_eq!(
            outcome,
            AttachOutcome::Attached {
                paths: vec!["Space-App-UI".to_string(), "Space-Core:UI".to_string()]
            }
        );
        assert_eq!(graph.registrations().len(), 2);
        assert_eq!(
            graph.registrations()[0].project_dir.as_deref(),
            Some(Path::new("./UI/UI-App"))
        );
    }

    #[test]
    fn test_missing_marker_stops_remaining_entries() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("UI/UI-App")).unwrap();
        buildable(root.path(), "UI/SpaceUI", "build.gradle.kts");
        let markers = markers();
        let attacher = ModuleAttacher::new(root.path(), &markers);
        let mut graph = SettingsGraph::new();

        let configs = [
            ModuleConfig::new("Space-App-UI", "./UI/UI-App"),
            ModuleConfig::new("Space-Core:UI", "./UI/SpaceUI"),
        ];
        let outcome = attacher.attach("UI", Some(&configs), &mut graph);

        match outcome {
            AttachOutcome::Failed { attached, reasons } => {
                assert!(attached.is_empty());
                assert_eq!(reasons.len(), 1);
                assert!(reasons[0].contains("UI-App"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(graph.is_empty());
    }

    #[test]
    fn test_continue_after_failure_attempts_later_entries() {
        let root = TempDir::new().unwrap();
        buildable(root.path(), "UI/SpaceUI", "build.gradle.kts");
        let markers = markers();
        let attacher = ModuleAttacher::new(root.path(), &markers).continue_after_failure(true);
        let mut graph = SettingsGraph::new();

        let configs = [
            ModuleConfig::new("Space-App-UI", "./UI/UI-App"),
            ModuleConfig::new("Space-Core:UI", "./UI/SpaceUI"),
        ];
        let outcome = attacher.attach("UI", Some(&configs), &mut graph);

        assert!(outcome.is_failure());
        assert!(graph.contains("Space-Core:UI"));
        assert!(!graph.contains("Space-App-UI"));
    }

    #[test]
    fn test_sibling_module_still_attaches_after_failure() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("broken")).unwrap();
        buildable(root.path(), "feature", "build.gradle.kts");
        let markers = markers();
        let attacher = ModuleAttacher::new(root.path(), &markers);
        let mut graph = SettingsGraph::new();

        let broken = [ModuleConfig::new("broken", "./broken")];
        let feature = [ModuleConfig::new("feature", "./feature")];

        assert!(attacher.attach("broken", Some(&broken), &mut graph).is_failure());
        assert!(!attacher.attach("feature", Some(&feature), &mut graph).is_failure());

        assert!(!graph.contains("broken"));
        assert!(graph.contains("feature"));
    }

    #[test]
    fn test_marker_must_be_a_file() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("odd/build.gradle.kts")).unwrap();
        let markers = markers();
        let attacher = ModuleAttacher::new(root.path(), &markers);

        assert!(!attacher.has_build_marker(Path::new("odd")));
        assert!(!attacher.has_build_marker(Path::new("missing")));
    }

    #[test]
    fn test_duplicate_registration_is_reported_as_failure() {
        let root = TempDir::new().unwrap();
        buildable(root.path(), "a", "build.gradle.kts");
        buildable(root.path(), "b", "build.gradle.kts");
        let markers = markers();
        let attacher = ModuleAttacher::new(root.path(), &markers);
        let mut graph = SettingsGraph::new();

        let first = [ModuleConfig::new("shared", "./a")];
        let second = [ModuleConfig::new("shared", "./b")];

        assert!(!attacher.attach("first", Some(&first), &mut graph).is_failure());
        let outcome = attacher.attach("second", Some(&second), &mut graph);

        assert!(outcome.is_failure());
        assert_eq!(
            graph.registrations()[0].project_dir.as_deref(),
            Some(Path::new("./a"))
        );
    }
}
