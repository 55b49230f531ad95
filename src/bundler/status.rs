//! Status reporting for the packaging pipeline.
//!
//! The pipeline never prints. It reports leveled status lines and raw
//! package manager output through a [`StatusSink`] supplied by the caller.

use std::sync::Mutex;

/// Severity of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl StatusLevel {
    /// Fixed-width label used when rendering the line.
    pub fn label(self) -> &'static str {
        match self {
            StatusLevel::Info => "INFO",
            StatusLevel::Success => "SUCCESS",
            StatusLevel::Warning => "WARNING",
            StatusLevel::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for StatusLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Receiver of pipeline progress.
///
/// Implementations must tolerate being called from the task that runs the
/// pipeline while a build is in progress; lines arrive in order.
pub trait StatusSink: Send + Sync {
    /// A leveled status line.
    fn status(&self, level: StatusLevel, message: &str);

    /// A raw line of external process output.
    fn output(&self, line: &str);

    fn info(&self, message: &str) {
        self.status(StatusLevel::Info, message);
    }

    fn success(&self, message: &str) {
        self.status(StatusLevel::Success, message);
    }

    fn warn(&self, message: &str) {
        self.status(StatusLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.status(StatusLevel::Error, message);
    }
}

/// One recorded line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLine {
    Status { level: StatusLevel, message: String },
    Output(String),
}

/// Sink that keeps every line in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<StatusLine>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all lines received so far.
    pub fn lines(&self) -> Vec<StatusLine> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// Messages received at `level`, in order.
    pub fn messages(&self, level: StatusLevel) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter_map(|line| match line {
                StatusLine::Status { level: l, message } if l == level => Some(message),
                _ => None,
            })
            .collect()
    }

    /// Raw process output lines, in order.
    pub fn output_lines(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter_map(|line| match line {
                StatusLine::Output(line) => Some(line),
                StatusLine::Status { .. } => None,
            })
            .collect()
    }

    fn push(&self, line: StatusLine) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line);
        }
    }
}

impl StatusSink for RecordingSink {
    fn status(&self, level: StatusLevel, message: &str) {
        self.push(StatusLine::Status {
            level,
            message: message.to_string(),
        });
    }

    fn output(&self, line: &str) {
        self.push(StatusLine::Output(line.to_string()));
    }
}
