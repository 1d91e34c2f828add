//! Constants for module-sync configuration paths and settings

/// Configuration file looked up in the workspace root
pub const DEFAULT_CONFIG_FILE: &str = "modules.yaml";

/// Gradle settings fragment written after every run, relative to the root
pub const DEFAULT_SETTINGS_OUTPUT: &str = "modules.settings.gradle.kts";

pub const DEFAULT_GIT_BINARY: &str = "git";

pub const DEFAULT_REMOTE_SCHEME: &str = "https";
pub const DEFAULT_REMOTE_HOST_PATH: &str = "github.com/SpaceBank";
pub const DEFAULT_REPOSITORY_PREFIX: &str = "Android-Space";

/// Module synced when no configuration file exists
pub const DEFAULT_MODULE: &str = "build-logic";

/// Files whose presence marks a directory as a Gradle build
pub const DEFAULT_MARKER_FILES: &[&str] = &["build.gradle.kts", "settings.gradle.kts"];

/// Environment variable holding the repository access token
pub const TOKEN_ENV: &str = "REPO_TOKEN";

/// Set to "true" by the IDE while it runs a Gradle sync
pub const IDE_SYNC_ENV: &str = "IDEA_SYNC_ACTIVE";

/// The IDE's own property name, accepted when a wrapper exports it as is
pub const IDE_SYNC_PROPERTY: &str = "idea.sync.active";

/// Set to "true" by CI providers
pub const CI_ENV: &str = "CI";
