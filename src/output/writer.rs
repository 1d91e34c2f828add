//! Low-level writing logic for output routing

use super::config::OutputMode;
use std::io::{self, Write};

/// Write user-facing output to the stream the mode reserves for it
pub fn write_output(mode: OutputMode, args: std::fmt::Arguments) -> io::Result<()> {
    match mode {
        OutputMode::Cli => {
            print!("{args}");
            io::stdout().flush()
        }
        OutputMode::Piped => {
            eprint!("{args}");
            io::stderr().flush()
        }
    }
}

/// Same as [`write_output`] with a trailing newline
pub fn writeln_output(mode: OutputMode, args: std::fmt::Arguments) -> io::Result<()> {
    match mode {
        OutputMode::Cli => {
            println!("{args}");
            io::stdout().flush()
        }
        OutputMode::Piped => {
            eprintln!("{args}");
            io::stderr().flush()
        }
    }
}

/// Raw writer for user-facing output, used where cursor control sequences
/// have to be written without an implicit newline
pub fn display_writer() -> Box<dyn Write> {
    match super::current_mode() {
        OutputMode::Cli => Box::new(io::stdout()),
        OutputMode::Piped => Box::new(io::stderr()),
    }
}
