use std::collections::HashMap;

use super::constants::{CI_ENV, IDE_SYNC_ENV, IDE_SYNC_PROPERTY};

/// How a run treats the configured modules. Computed once when a run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Attach what is already on disk without touching the network
    InteractiveAttach,
    /// Clone or pull every module, then attach the ones that synced
    SyncAndAttach,
}

/// Read access to environment signals
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl RunMode {
    /// Attach-only inside an IDE sync, unless CI says otherwise
    pub fn from_signals(ide_sync: bool, ci: bool) -> Self {
        if ide_sync && !ci {
            RunMode::InteractiveAttach
        } else {
            RunMode::SyncAndAttach
        }
    }

    pub fn detect(env: &impl EnvSource) -> Self {
        let ide_sync = flag_set(env, IDE_SYNC_ENV) || flag_set(env, IDE_SYNC_PROPERTY);
        Self::from_signals(ide_sync, flag_set(env, CI_ENV))
    }

    pub fn launches_processes(self) -> bool {
        self == RunMode::SyncAndAttach
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunMode::InteractiveAttach => "attach only",
            RunMode::SyncAndAttach => "sync and attach",
        }
    }
}

fn flag_set(env: &impl EnvSource, key: &str) -> bool {
    env.var(key)
        .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
}
