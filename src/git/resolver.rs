use std::fmt;
use std::path::Path;
use std::process::Command;

use super::remote::{RemoteCredential, RemoteTemplate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// `pull` inside an existing checkout
    Update,
    /// `clone` into a directory that does not exist yet
    Fetch,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Update => "update",
            CommandKind::Fetch => "fetch",
        }
    }
}

/// External command that brings one module up to date.
///
/// Arguments may carry a credential, so the printable form is fixed when the
/// command is built and `Debug` only ever shows that form.
#[derive(Clone, PartialEq, Eq)]
pub struct SyncCommand {
    program: String,
    args: Vec<String>,
    display: String,
    kind: CommandKind,
}

impl SyncCommand {
    /// Build a command whose arguments are safe to print
    pub fn new<I, S>(program: impl Into<String>, args: I, kind: CommandKind) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let program = program.into();
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let display = std::iter::once(program.as_str())
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            program,
            args,
            display,
            kind,
        }
    }

    fn with_display(mut self, display: String) -> Self {
        self.display = display;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn is_fetch(&self) -> bool {
        self.kind == CommandKind::Fetch
    }

    /// Process builder running from `workspace_root`
    pub fn to_process(&self, workspace_root: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).current_dir(workspace_root);
        command
    }
}

impl fmt::Display for SyncCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl fmt::Debug for SyncCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncCommand")
            .field("kind", &self.kind)
            .field("command", &self.display)
            .finish()
    }
}

/// Picks clone or pull for a module based on what exists under the
/// workspace root
pub struct CommandResolver<'a> {
    workspace_root: &'a Path,
    template: &'a RemoteTemplate,
    git_binary: &'a str,
}

impl<'a> CommandResolver<'a> {
    pub fn new(workspace_root: &'a Path, template: &'a RemoteTemplate, git_binary: &'a str) -> Self {
        Self {
            workspace_root,
            template,
            git_binary,
        }
    }

    pub fn resolve(&self, module: &str, credential: &RemoteCredential) -> SyncCommand {
        let local_path = format!("./{module}");

        if self.workspace_root.join(module).exists() {
            SyncCommand::new(
                self.git_binary,
                ["-C", local_path.as_str(), "pull", "--progress"],
                CommandKind::Update,
            )
        } else {
            let url = self.template.repository_url(module, credential);
            let shown = self.template.redacted_url(module, credential);
            let display = format!("{} clone --progress {shown} {local_path}", self.git_binary);

            SyncCommand::new(
                self.git_binary,
                ["clone", "--progress", url.as_str(), local_path.as_str()],
                CommandKind::Fetch,
            )
            .with_display(display)
        }
    }
}
