//! Outcomes of running operations and their aggregation into a run report.

use crate::cli_types::Mode;
use crate::exit_codes;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeStatus {
    Clean,
    Modified,
    Violation,
    Error,
}

impl OutcomeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeStatus::Clean => "clean",
            OutcomeStatus::Modified => "modified",
            OutcomeStatus::Violation => "violation",
            OutcomeStatus::Error => "error",
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single style-checker finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub line: usize,
    pub column: usize,
    /// 1-based notebook cell number, for findings inside notebooks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell: Option<usize>,
    pub code: String,
    pub message: String,
}

/// Result of one operation on one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub path: PathBuf,
    pub operation: &'static str,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl Outcome {
    pub fn new(path: &Path, operation: &'static str, status: OutcomeStatus) -> Self {
        Self {
            path: path.to_path_buf(),
            operation,
            status,
            message: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Vec<Diagnostic>) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

/// Per-operation counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OperationSummary {
    pub clean: usize,
    pub modified: usize,
    pub violations: usize,
    pub errors: usize,
}

impl OperationSummary {
    fn record(&mut self, status: OutcomeStatus) {
        match status {
            OutcomeStatus::Clean => self.clean += 1,
            OutcomeStatus::Modified => self.modified += 1,
            OutcomeStatus::Violation => self.violations += 1,
            OutcomeStatus::Error => self.errors += 1,
        }
    }

    pub fn files(&self) -> usize {
        self.clean + self.modified + self.violations + self.errors
    }
}

/// All outcomes of a single invocation, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    mode: Mode,
    /// Operations in the order they ran, including those that found no files
    operations: Vec<&'static str>,
    outcomes: Vec<Outcome>,
}

impl RunReport {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            operations: Vec::new(),
            outcomes: Vec::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn begin_operation(&mut self, name: &'static str) {
        if !self.operations.contains(&name) {
            self.operations.push(name);
        }
    }

    pub fn push(&mut self, outcome: Outcome) {
        self.begin_operation(outcome.operation);
        self.outcomes.push(outcome);
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn operations(&self) -> &[&'static str] {
        &self.operations
    }

    pub fn summaries(&self) -> IndexMap<&'static str, OperationSummary> {
        let mut summaries: IndexMap<&'static str, OperationSummary> = self
            .operations
            .iter()
            .map(|name| (*name, OperationSummary::default()))
            .collect();
        for outcome in &self.outcomes {
            summaries.entry(outcome.operation).or_default().record(outcome.status);
        }
        summaries
    }

    pub fn total(&self) -> OperationSummary {
        let mut total = OperationSummary::default();
        for outcome in &self.outcomes {
            total.record(outcome.status);
        }
        total
    }

    pub fn has_errors(&self) -> bool {
        self.outcomes.iter().any(|o| o.status == OutcomeStatus::Error)
    }

    pub fn has_violations(&self) -> bool {
        self.outcomes.iter().any(|o| o.status == OutcomeStatus::Violation)
    }

    /// Process exit code: tool errors dominate violations; modified files are a success.
    pub fn exit_code(&self) -> i32 {
        if self.has_errors() {
            exit_codes::TOOL_ERROR
        } else if self.has_violations() {
            exit_codes::VIOLATIONS_FOUND
        } else {
            exit_codes::SUCCESS
        }
    }
}
