//! Default text output formatter with colors

use crate::file_processor::to_display_path;
use crate::output::OutputFormatter;
use crate::report::{Diagnostic, Outcome, OutcomeStatus, RunReport};
use colored::*;

/// Default human-readable formatter with colors
pub struct TextFormatter {
    use_colors: bool,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self { use_colors: true }
    }
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_colors() -> Self {
        Self { use_colors: false }
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> ColoredString) -> String {
        if self.use_colors {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_diagnostic(&self, path: &str, diagnostic: &Diagnostic) -> String {
        let mut location = path.to_string();
        if let Some(cell) = diagnostic.cell {
            location.push(':');
            location.push_str(&self.paint(&format!("Cell{cell}"), |s| s.reversed()));
        }
        format!(
            "{} {location}:{}:{} - {}",
            self.paint(&diagnostic.code, |s| s.red().bold()),
            diagnostic.line,
            diagnostic.column,
            diagnostic.message
        )
    }
}

impl OutputFormatter for TextFormatter {
    fn format_outcome(&self, outcome: &Outcome) -> Option<String> {
        let path = to_display_path(&outcome.path);

        if !outcome.diagnostics.is_empty() {
            let lines: Vec<String> = outcome
                .diagnostics
                .iter()
                .map(|d| self.format_diagnostic(&path, d))
                .collect();
            return Some(lines.join("\n"));
        }

        let message = outcome.message.as_deref()?;
        let path = self.paint(&path, |s| s.bold());
        Some(match outcome.status {
            OutcomeStatus::Clean => return None,
            OutcomeStatus::Error => format!(
                "{path}: {} {message}",
                self.paint(&format!("{} failed:", outcome.operation), |s| s.red())
            ),
            OutcomeStatus::Modified | OutcomeStatus::Violation => format!("{path}: {message}"),
        })
    }

    fn format_report(&self, report: &RunReport) -> Option<String> {
        let mut lines = Vec::new();

        for (operation, summary) in report.summaries() {
            let mut parts = vec![format!("{} file(s)", summary.files())];
            if summary.clean > 0 {
                parts.push(format!("{} clean", summary.clean));
            }
            if summary.modified > 0 {
                parts.push(self.paint(&format!("{} modified", summary.modified), |s| s.green()));
            }
            if summary.violations > 0 {
                parts.push(self.paint(&format!("{} with violations", summary.violations), |s| s.yellow()));
            }
            if summary.errors > 0 {
                parts.push(self.paint(&format!("{} failed", summary.errors), |s| s.red()));
            }
            lines.push(format!("{}: {}", self.paint(operation, |s| s.bold()), parts.join(", ")));
        }

        let total = report.total();
        let verdict = if report.has_errors() {
            self.paint(&format!("Finished with {} error(s).", total.errors), |s| s.red().bold())
        } else if report.has_violations() {
            let hint = if report.mode().is_check() {
                ""
            } else {
                " Some of them cannot be fixed automatically."
            };
            self.paint(
                &format!("Found violations in {} file(s).{hint}", total.violations),
                |s| s.yellow().bold(),
            )
        } else {
            self.paint("All done!", |s| s.green().bold())
        };
        lines.push(verdict);

        Some(lines.join("\n"))
    }

    fn use_colors(&self) -> bool {
        self.use_colors
    }
}
