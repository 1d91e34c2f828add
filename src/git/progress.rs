//! Redraws transient progress lines in place.
//!
//! Git writes its counters separated by carriage returns. Once the output is
//! captured through a pipe that redraw is lost, so progress lines are
//! rewritten here with an explicit erase-line sequence while every other line
//! passes through unchanged.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::{self, Write};

/// Moves to column 0 and clears the rest of the line
const ERASE_LINE: &str = "\r\x1b[K";

pub const DEFAULT_PROGRESS_PREFIXES: &[&str] = &[
    "remote: Counting objects:",
    "remote: Compressing objects:",
    "Receiving objects:",
    "Resolving deltas:",
];

/// Line prefixes that mark an output line as a transient progress update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressPrefixes(BTreeSet<String>);

impl Default for ProgressPrefixes {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_PREFIXES.iter().copied())
    }
}

impl ProgressPrefixes {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(prefixes.into_iter().map(Into::into).collect())
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.0.insert(prefix.into());
        self
    }

    pub fn is_progress(&self, line: &str) -> bool {
        self.0.iter().any(|prefix| line.starts_with(prefix.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub struct ProgressFormatter<'a> {
    prefixes: &'a ProgressPrefixes,
}

impl<'a> ProgressFormatter<'a> {
    pub fn new(prefixes: &'a ProgressPrefixes) -> Self {
        Self { prefixes }
    }

    /// Write one line of process output and return the progress length to
    /// carry into the next call.
    ///
    /// Progress lines are redrawn over the current terminal line and padded
    /// to `previous_len` characters so a shorter update hides a longer one.
    /// Any other line is written with a newline and resets the state to 0.
    pub fn format<W: Write>(&self, line: &str, previous_len: usize, out: &mut W) -> io::Result<usize> {
        if self.prefixes.is_progress(line) {
            write!(out, "{ERASE_LINE}{line:<previous_len$}")?;
            out.flush()?;
            Ok(line.chars().count())
        } else {
            writeln!(out, "{line}")?;
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(formatter: &ProgressFormatter, line: &str, previous: usize) -> (String, usize) {
        let mut out = Vec::new();
        let len = formatter.format(line, previous, &mut out).unwrap();
        (String::from_utf8(out).unwrap(), len)
    }

    #[test]
    fn test_receiving_objects_is_progress() {
        let prefixes = ProgressPrefixes::default();
        let formatter = ProgressFormatter::new(&prefixes);

        let line = "Receiving objects:  42% (420/1000)";
        let (written, len) = render(&formatter, line, 0);

        assert_eq!(len, line.len());
        assert_eq!(written, format!("\r\x1b[K{line}"));
        assert!(!written.ends_with('\n'));
    }

    #[test]
    fn test_cloning_into_is_terminal() {
        let prefixes = ProgressPrefixes::default();
        let formatter = ProgressFormatter::new(&prefixes);

        let (written, len) = render(&formatter, "Cloning into 'x'...", 17);

        assert_eq!(len, 0);
        assert_eq!(written, "Cloning into 'x'...\n");
    }

    #[test]
    fn test_shorter_update_is_padded_over_longer_one() {
        let prefixes = ProgressPrefixes::default();
        let formatter = ProgressFormatter::new(&prefixes);

        let line = "Resolving deltas: 100% ok";
        assert_eq!(line.len(), 25);

        let (written, len) = render(&formatter, line, 40);
        assert_eq!(len, 25);
        assert_eq!(written, format!("\r\x1b[K{line}{}", " ".repeat(15)));
    }

    #[test]
    fn test_longer_update_is_not_truncated() {
        let prefixes = ProgressPrefixes::default();
        let formatter = ProgressFormatter::new(&prefixes);

        let line = "remote: Counting objects: 100% (1234/1234), done.";
        let (written, len) = render(&formatter, line, 10);
        assert_eq!(len, line.len());
        assert_eq!(written, format!("\r\x1b[K{line}"));
    }

    #[test]
    fn test_prefix_must_start_the_line() {
        let prefixes = ProgressPrefixes::default();
        assert!(!prefixes.is_progress("note: Receiving objects: 10%"));
        assert!(prefixes.is_progress("remote: Compressing objects:  10% (1/10)"));
    }

    #[test]
    fn test_custom_prefix_extends_the_set() {
        let prefixes = ProgressPrefixes::default().with_prefix("Updating files:");
        assert_eq!(prefixes.len(), DEFAULT_PROGRESS_PREFIXES.len() + 1);
        assert!(prefixes.is_progress("Updating files:  57% (4/7)"));
    }

    #[test]
    fn test_sequence_resets_after_terminal_line() {
        let prefixes = ProgressPrefixes::default();
        let formatter = ProgressFormatter::new(&prefixes);
        let mut out = Vec::new();

        let mut state = 0;
        for line in [
            "Cloning into 'build-logic'...",
            "Receiving objects:  50% (5/10)",
            "Receiving objects: 100% (10/10), done.",
            "Resolving deltas: 100% (3/3), done.",
            "Updating files: done",
        ] {
            state = formatter.format(line, state, &mut out).unwrap();
        }

        assert_eq!(state, 0);
        let written = String::from_utf8(out).unwrap();
        assert!(written.starts_with("Cloning into 'build-logic'...\n"));
        assert!(written.ends_with("Updating files: done\n"));
    }
}
