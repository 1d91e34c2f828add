use console::style;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(20);

use super::progress::{ProgressFormatter, ProgressPrefixes};
use super::resolver::SyncCommand;
use super::SyncError;
use crate::output::display_writer;
use crate::{display_println, log_debug, log_warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Success,
    Failure,
}

/// Result of syncing one module, consumed right away by the attach step
#[derive(Debug, Clone)]
pub struct SyncResult {
    pub module: String,
    pub outcome: SyncOutcome,
    /// Every line the process printed, newline-joined
    pub captured_output: String,
}

impl SyncResult {
    pub fn is_success(&self) -> bool {
        self.outcome == SyncOutcome::Success
    }
}

/// Brings a single module up to date
pub trait ModuleSyncer {
    fn sync(&self, module: &str, command: &SyncCommand) -> SyncResult;
}

/// Runs sync commands as child processes and streams their output
pub struct SyncExecutor {
    workspace_root: PathBuf,
    prefixes: ProgressPrefixes,
    timeout: Option<Duration>,
}

struct Transcript {
    exited_ok: bool,
    text: String,
}

impl SyncExecutor {
    pub fn new(workspace_root: impl Into<PathBuf>, prefixes: ProgressPrefixes) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            prefixes,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run `command` for `module`, drawing its output on the terminal
    pub fn execute(&self, module: &str, command: &SyncCommand) -> SyncResult {
        let mut out = display_writer();
        self.execute_with_writer(module, command, &mut out)
    }

    /// Same as [`execute`](Self::execute) with the process output drawn to `out`.
    ///
    /// Never fails: launch errors, read errors and timeouts all become a
    /// [`SyncOutcome::Failure`] carrying whatever was captured.
    pub fn execute_with_writer<W: Write>(
        &self,
        module: &str,
        command: &SyncCommand,
        out: &mut W,
    ) -> SyncResult {
        display_println!(
            "{}",
            style(format!("Executing command: {command}")).blue()
        );
        log_debug!("Syncing module {} ({})", module, command.kind().as_str());

        let (outcome, captured_output) = match self.stream(command, out) {
            Ok(transcript) if transcript.exited_ok => (SyncOutcome::Success, transcript.text),
            Ok(transcript) => (SyncOutcome::Failure, transcript.text),
            Err((e, mut partial)) => {
                log_warn!("Sync of module {} did not complete: {}", module, e);
                partial.push_str(&e.to_string());
                partial.push('\n');
                (SyncOutcome::Failure, partial)
            }
        };

        if command.is_fetch() {
            let _ = writeln!(out);
        }

        match outcome {
            SyncOutcome::Success => display_println!(
                "{}",
                style(format!(
                    "Operation completed successfully for module {module}."
                ))
                .green()
            ),
            SyncOutcome::Failure => display_println!(
                "{}",
                style(format!("Operation failed for module {module}.")).red()
            ),
        }

        SyncResult {
            module: module.to_string(),
            outcome,
            captured_output,
        }
    }

    fn stream<W: Write>(
        &self,
        command: &SyncCommand,
        out: &mut W,
    ) -> Result<Transcript, (SyncError, String)> {
        let program = command.program().to_string();
        let launch_error = |source| {
            (
                SyncError::Launch {
                    program: program.clone(),
                    source,
                },
                String::new(),
            )
        };

        // stdout and stderr share one pipe so lines keep their emission order
        let (reader, writer) = io::pipe().map_err(launch_error)?;
        let child = {
            let stderr_writer = writer.try_clone().map_err(launch_error)?;
            let mut process = command.to_process(&self.workspace_root);
            process
                .stdin(Stdio::null())
                .stdout(writer)
                .stderr(stderr_writer);
            // Own process group, so a timeout also reaches helpers that
            // inherited the pipe
            #[cfg(unix)]
            {
                use std::os::unix::process::CommandExt;
                if self.timeout.is_some() {
                    process.process_group(0);
                }
            }
            // Dropping `process` at the end of this block closes the parent's
            // copies of the write end, otherwise the reader never sees EOF
            process.spawn().map_err(launch_error)?
        };

        let pid = child.id();
        let child = Arc::new(Mutex::new(child));
        let timed_out = Arc::new(AtomicBool::new(false));
        // Stays open until the child is reaped, the deadline covers reading
        // and waiting alike
        let (done_tx, done_rx) = mpsc::channel::<()>();
        let watchdog = self.timeout.map(|timeout| {
            let child = Arc::clone(&child);
            let timed_out = Arc::clone(&timed_out);
            thread::spawn(move || {
                if let Err(RecvTimeoutError::Timeout) = done_rx.recv_timeout(timeout) {
                    timed_out.store(true, Ordering::SeqCst);
                    terminate(&child, pid);
                }
            })
        });

        let formatter = ProgressFormatter::new(&self.prefixes);
        let mut text = String::new();
        let mut previous_len = 0;
        let mut read_error = None;

        for line in OutputLines::new(BufReader::new(reader)) {
            match line {
                Ok(line) => {
                    text.push_str(&line);
                    text.push('\n');
                    previous_len = match formatter.format(&line, previous_len, out) {
                        Ok(len) => len,
                        Err(e) => {
                            // The terminal is only a side channel, keep capturing
                            log_debug!("Failed to draw process output: {}", e);
                            0
                        }
                    };
                }
                Err(e) => {
                    read_error = Some(e);
                    break;
                }
            }
        }

        let status = wait_for(&child);

        drop(done_tx);
        if let Some(watchdog) = watchdog {
            let _ = watchdog.join();
        }

        let status = status.map_err(|source| {
            (
                SyncError::Output {
                    program: program.clone(),
                    source,
                },
                text.clone(),
            )
        })?;

        if timed_out.load(Ordering::SeqCst) {
            let after = self.timeout.unwrap_or_default();
            return Err((SyncError::TimedOut { after }, text));
        }

        if let Some(source) = read_error {
            return Err((SyncError::Output { program, source }, text));
        }

        Ok(Transcript {
            exited_ok: status.success(),
            text,
        })
    }
}

impl ModuleSyncer for SyncExecutor {
    fn sync(&self, module: &str, command: &SyncCommand) -> SyncResult {
        self.execute(module, command)
    }
}

/// Poll for exit, releasing the lock between polls so the watchdog can kill
fn wait_for(child: &Mutex<Child>) -> io::Result<ExitStatus> {
    loop {
        let exited = child
            .lock()
            .map_err(|_| io::Error::other("child process lock poisoned"))?
            .try_wait()?;
        if let Some(status) = exited {
            return Ok(status);
        }
        thread::sleep(WAIT_POLL_INTERVAL);
    }
}

fn terminate(child: &Mutex<Child>, pid: u32) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        if let Ok(pgid) = i32::try_from(pid) {
            if let Err(e) = killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
                log_debug!("Failed to kill process group {}: {}", pgid, e);
            }
        }
    }
    #[cfg(not(unix))]
    let _ = pid;

    if let Ok(mut child) = child.lock() {
        let _ = child.kill();
    }
}

/// Splits a byte stream into lines ended by `\n`, `\r` or `\r\n`.
///
/// Git separates progress updates with a bare `\r`, so splitting on `\n`
/// alone would hold every update of a phase back until the phase finishes.
struct OutputLines<R> {
    reader: R,
    after_cr: bool,
}

impl<R: BufRead> OutputLines<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            after_cr: false,
        }
    }

    fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut line = Vec::new();

        loop {
            let (consumed, complete) = {
                let available = self.reader.fill_buf()?;
                if available.is_empty() {
                    if line.is_empty() {
                        return Ok(None);
                    }
                    return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
                }

                let start = usize::from(self.after_cr && available[0] == b'\n');
                self.after_cr = false;

                match available[start..]
                    .iter()
                    .position(|b| *b == b'\n' || *b == b'\r')
                {
                    Some(end) => {
                        line.extend_from_slice(&available[start..start + end]);
                        self.after_cr = available[start + end] == b'\r';
                        (start + end + 1, true)
                    }
                    None => {
                        line.extend_from_slice(&available[start..]);
                        (available.len(), false)
                    }
                }
            };

            self.reader.consume(consumed);
            if complete {
                return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
            }
        }
    }
}

impl<R: BufRead> Iterator for OutputLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}
