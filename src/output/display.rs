//! Display macros for user-facing terminal output

/// Print user-facing output without newline
/// Routes to stdout in CLI mode, stderr in piped mode
#[macro_export]
macro_rules! display_print {
    ($($arg:tt)*) => {{
        use $crate::output::{current_mode, writer::write_output};
        let _ = write_output(current_mode(), format_args!($($arg)*));
    }};
}

/// Print user-facing output with newline
/// Routes to stdout in CLI mode, stderr in piped mode
#[macro_export]
macro_rules! display_println {
    () => {
        $crate::display_print!("\n")
    };
    ($($arg:tt)*) => {{
        use $crate::output::{current_mode, writer::writeln_output};
        let _ = writeln_output(current_mode(), format_args!($($arg)*));
    }};
}
