//! Output formatting module for colint
//!
//! Formatters render outcomes as they are produced and the final run report.

use crate::report::{Outcome, RunReport};
use std::io::{self, Write};

pub mod formatters;

pub use formatters::*;

/// Trait for output formatters
pub trait OutputFormatter {
    /// Render one outcome as soon as it is known. `None` prints nothing.
    fn format_outcome(&self, outcome: &Outcome) -> Option<String>;

    /// Render the end-of-run report.
    fn format_report(&self, report: &RunReport) -> Option<String>;

    /// Whether this formatter should use colors
    fn use_colors(&self) -> bool {
        false
    }
}

/// Available output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Per-file messages followed by a per-operation summary
    Text,
    /// A single JSON document describing the run
    Json,
}

impl OutputFormat {
    /// Create a formatter instance for this format
    pub fn create_formatter(&self, use_colors: bool) -> Box<dyn OutputFormatter> {
        match self {
            OutputFormat::Text if use_colors => Box::new(TextFormatter::new()),
            OutputFormat::Text => Box::new(TextFormatter::without_colors()),
            OutputFormat::Json => Box::new(JsonFormatter::new()),
        }
    }
}

impl From<crate::cli_types::OutputFormatArg> for OutputFormat {
    fn from(arg: crate::cli_types::OutputFormatArg) -> Self {
        match arg {
            crate::cli_types::OutputFormatArg::Text => OutputFormat::Text,
            crate::cli_types::OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Routes results to stdout and problems to stderr
pub struct OutputWriter {
    quiet: bool,
}

impl OutputWriter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Write a per-file line; suppressed in quiet mode
    pub fn write_detail(&self, content: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.writeln(content)
    }

    /// Write a line to stdout
    pub fn writeln(&self, content: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{content}")?;
        stdout.flush()
    }
}
