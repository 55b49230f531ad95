//! Terminal output for the command line.
//!
//! Status lines are printed with a bold, colored, fixed-width level label.
//! Package manager output is printed verbatim. Colors are only emitted when
//! the stream supports them.

use crate::bundler::status::{StatusLevel, StatusSink};
use owo_colors::{OwoColorize, Stream};
use std::io::{self, Write};

/// Width the level label is padded to.
const LABEL_WIDTH: usize = 7;

/// Output manager for colored terminal output
#[derive(Debug, Clone, Copy)]
pub struct OutputManager {
    verbose: bool,
    quiet: bool,
}

impl OutputManager {
    /// Create a new output manager
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    /// Print a leveled status line.
    ///
    /// Quiet mode keeps warnings and errors only.
    pub fn status_line(&self, level: StatusLevel, message: &str) -> io::Result<()> {
        if self.quiet && matches!(level, StatusLevel::Info | StatusLevel::Success) {
            return Ok(());
        }

        let line = format!("{:<width$} {}", level.label(), message, width = LABEL_WIDTH);
        match level {
            StatusLevel::Info => {
                let stream = Stream::Stdout;
                writeln!(io::stdout().lock(), "{}", line.if_supports_color(stream, |s| s.bold()))
            }
            StatusLevel::Success => {
                let stream = Stream::Stdout;
                writeln!(
                    io::stdout().lock(),
                    "{}",
                    line.if_supports_color(stream, |s| s.bold().green().to_string())
                )
            }
            StatusLevel::Warning => {
                let stream = Stream::Stderr;
                writeln!(
                    io::stderr().lock(),
                    "{}",
                    line.if_supports_color(stream, |s| s.bold().yellow().to_string())
                )
            }
            StatusLevel::Error => {
                let stream = Stream::Stderr;
                writeln!(
                    io::stderr().lock(),
                    "{}",
                    line.if_supports_color(stream, |s| s.bold().red().to_string())
                )
            }
        }
    }

    /// Print info message if not in quiet mode
    pub fn info(&self, message: &str) -> io::Result<()> {
        self.status_line(StatusLevel::Info, message)
    }

    /// Print success message if not in quiet mode
    pub fn success(&self, message: &str) -> io::Result<()> {
        self.status_line(StatusLevel::Success, message)
    }

    /// Print warning message
    pub fn warn(&self, message: &str) -> io::Result<()> {
        self.status_line(StatusLevel::Warning, message)
    }

    /// Print error message
    pub fn error(&self, message: &str) -> io::Result<()> {
        self.status_line(StatusLevel::Error, message)
    }

    /// Print message only in verbose mode
    pub fn verbose(&self, message: &str) -> io::Result<()> {
        if !self.verbose || self.quiet {
            return Ok(());
        }
        writeln!(
            io::stdout().lock(),
            "{}",
            message.if_supports_color(Stream::Stdout, |s| s.dimmed())
        )
    }

    /// Print indented text
    pub fn indent(&self, message: &str) -> io::Result<()> {
        writeln!(io::stderr().lock(), "  {}", message)
    }

    /// Print a raw line of process output unless quiet
    pub fn raw(&self, line: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln!(io::stdout().lock(), "{}", line)
    }
}

impl StatusSink for OutputManager {
    fn status(&self, level: StatusLevel, message: &str) {
        if let Err(e) = self.status_line(level, message) {
            log::debug!("Failed to write status line: {e}");
        }
    }

    fn output(&self, line: &str) {
        if let Err(e) = self.raw(line) {
            log::debug!("Failed to write process output: {e}");
        }
    }
}
