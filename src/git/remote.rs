use serde::{Deserialize, Serialize};
use std::fmt;

use crate::workspace::constants::{
    DEFAULT_REMOTE_HOST_PATH, DEFAULT_REMOTE_SCHEME, DEFAULT_REPOSITORY_PREFIX,
};

/// Access token embedded in clone URLs.
///
/// Read once when a run starts and only ever handed out by reference. The
/// `Debug` and `Display` impls never print the token itself.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RemoteCredential(String);

impl RemoteCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `<token>@` for a configured token, empty otherwise.
    ///
    /// A `user:password` token keeps its first `:` as the userinfo separator;
    /// each side is percent-encoded on its own.
    pub fn url_prefix(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        match self.0.split_once(':') {
            Some((user, password)) => format!(
                "{}:{}@",
                urlencoding::encode(user),
                urlencoding::encode(password)
            ),
            None => format!("{}@", urlencoding::encode(&self.0)),
        }
    }

    /// Same shape as [`url_prefix`](Self::url_prefix) with the token masked
    pub fn redacted_url_prefix(&self) -> &'static str {
        if self.is_empty() {
            ""
        } else {
            "***@"
        }
    }
}

impl fmt::Debug for RemoteCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("RemoteCredential(<none>)")
        } else {
            f.write_str("RemoteCredential(***)")
        }
    }
}

impl fmt::Display for RemoteCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_empty() { "<none>" } else { "***" })
    }
}

/// Naming convention for module repositories:
/// `<scheme>://[<credential>@]<host_path>/<repository_prefix>-<module>.git`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTemplate {
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(default = "default_host_path")]
    pub host_path: String,
    #[serde(default = "default_repository_prefix")]
    pub repository_prefix: String,
}

impl Default for RemoteTemplate {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            host_path: default_host_path(),
            repository_prefix: default_repository_prefix(),
        }
    }
}

impl RemoteTemplate {
    pub fn repository_url(&self, module: &str, credential: &RemoteCredential) -> String {
        self.render(module, &credential.url_prefix())
    }

    /// URL safe to print or log
    pub fn redacted_url(&self, module: &str, credential: &RemoteCredential) -> String {
        self.render(module, credential.redacted_url_prefix())
    }

    /// Base URL without credential or repository, used for validation
    pub fn base_url(&self) -> String {
        format!(
            "{}://{}/",
            self.scheme,
            self.host_path.trim_end_matches('/')
        )
    }

    fn render(&self, module: &str, auth: &str) -> String {
        format!(
            "{}://{}{}/{}-{}.git",
            self.scheme,
            auth,
            self.host_path.trim_end_matches('/'),
            self.repository_prefix,
            module
        )
    }
}

fn default_scheme() -> String {
    DEFAULT_REMOTE_SCHEME.to_string()
}

fn default_host_path() -> String {
    DEFAULT_REMOTE_HOST_PATH.to_string()
}

fn default_repository_prefix() -> String {
    DEFAULT_REPOSITORY_PREFIX.to_string()
}
