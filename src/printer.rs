//! Printer: process-wide output sink with verbosity filtering.
//!
//! Results go to stdout, diagnostics to stderr. A single mutex serializes
//! writes so spinner redraws do not tear structured output.

use crate::error::CliError;
use crate::render::OutputFormat;
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

pub mod debug;

/// Message levels, ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
            Level::Debug => "debug",
        }
    }
}

/// Output sink shared by every command.
#[derive(Clone)]
pub struct Printer {
    verbosity: Level,
    lock: Arc<Mutex<()>>,
    color: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    /// Printer at the default `info` verbosity.
    pub fn new() -> Self {
        Self::with_verbosity(Level::Info)
    }

    pub fn with_verbosity(verbosity: Level) -> Self {
        Self {
            verbosity,
            lock: Arc::new(Mutex::new(())),
            color: io::stderr().is_terminal(),
        }
    }

    pub fn verbosity(&self) -> Level {
        self.verbosity
    }

    pub fn is_debug(&self) -> bool {
        self.verbosity == Level::Debug
    }

    /// Whether stderr is interactive (spinner eligibility).
    pub fn stderr_is_interactive(&self) -> bool {
        io::stderr().is_terminal()
    }

    /// Guard serializing stream writes; held by the spinner while redrawing.
    pub(crate) fn stream_guard(&self) -> parking_lot::MutexGuard<'_, ()> {
        self.lock.lock()
    }

    /// Write a command result line to stdout. Not subject to verbosity.
    pub fn outputln(&self, message: &str) {
        let _guard = self.lock.lock();
        println!("{message}");
    }

    /// Write a command result fragment to stdout without a trailing newline.
    pub fn output(&self, message: &str) {
        let _guard = self.lock.lock();
        let mut out = io::stdout();
        let _ = out.write_all(message.as_bytes());
        let _ = out.flush();
    }

    /// Informational message on stdout, filtered at `info`.
    pub fn info(&self, message: &str) {
        if self.verbosity >= Level::Info {
            let _guard = self.lock.lock();
            println!("{message}");
        }
    }

    /// Warning on stderr, filtered at `warn`.
    pub fn warn(&self, message: &str) {
        if self.verbosity >= Level::Warn {
            let _guard = self.lock.lock();
            if self.color {
                eprintln!("{} {message}", "Warning:".yellow());
            } else {
                eprintln!("Warning: {message}");
            }
        }
    }

    /// Error on stderr. Never filtered.
    pub fn error(&self, message: &str) {
        let _guard = self.lock.lock();
        if self.color {
            eprintln!("{}", message.red());
        } else {
            eprintln!("{message}");
        }
    }

    /// Debug line on stderr, printed only at `debug` verbosity.
    ///
    /// Debug output shares stderr with warnings and errors so that
    /// `--output-format json|yaml` keeps stdout parseable.
    pub fn debug(&self, message: &str) {
        if self.verbosity == Level::Debug {
            let _guard = self.lock.lock();
            if self.color {
                eprintln!("{} {message}", "debug:".dimmed());
            } else {
                eprintln!("debug: {message}");
            }
        }
    }

    /// Render `value` in the user-chosen format, delegating to the renderer.
    pub fn output_result<T: Serialize>(
        &self,
        format: OutputFormat,
        value: &T,
        pretty: impl FnOnce(&Printer) -> Result<(), CliError>,
    ) -> Result<(), CliError> {
        crate::render::output(self, format, value, pretty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Debug > Level::Info);
        assert!(Level::Info > Level::Warn);
        assert!(Level::Warn > Level::Error);
    }

    #[test]
    fn test_default_verbosity_is_info() {
        let p = Printer::new();
        assert_eq!(p.verbosity(), Level::Info);
        assert!(!p.is_debug());
    }

    #[test]
    fn test_debug_printer_reports_debug() {
        let p = Printer::with_verbosity(Level::Debug);
        assert!(p.is_debug());
    }

    #[test]
    fn test_level_names() {
        assert_eq!(Level::Error.as_str(), "error");
        assert_eq!(Level::Debug.as_str(), "debug");
    }
}
