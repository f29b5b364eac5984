//!
//! Operations are the units of work a command expands to. Each one declares the
//! files it wants and implements the two-mode contract: `check` never touches the
//! file, `apply` rewrites it in place.

pub mod clean_notebook;
pub mod code_format;
pub mod docformat;
pub mod grammar_check;
pub mod newline_fix;
mod rewrite;
pub mod sort_imports;

pub use clean_notebook::CleanNotebook;
pub use code_format::CodeFormat;
pub use docformat::Docformat;
pub use grammar_check::GrammarCheck;
pub use newline_fix::NewlineFix;
pub use sort_imports::SortImports;

use crate::cli_types::Mode;
use crate::file_processor::FileFilter;
use crate::notebook::NotebookError;
use crate::report::{Diagnostic, Outcome, OutcomeStatus};
use crate::tools::ExecutorError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("Failed to access {path}: {source}")]
    FileAccess { path: PathBuf, source: io::Error },
    #[error("{path} is not valid UTF-8")]
    InvalidUtf8 { path: PathBuf },
    #[error(transparent)]
    Tool(#[from] ExecutorError),
    #[error(transparent)]
    Notebook(#[from] NotebookError),
}

/// What an operation found in a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub status: OutcomeStatus,
    pub message: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Finding {
    fn with_status(status: OutcomeStatus, message: Option<String>) -> Self {
        Self {
            status,
            message,
            diagnostics: Vec::new(),
        }
    }

    pub fn clean() -> Self {
        Self::with_status(OutcomeStatus::Clean, None)
    }

    pub fn modified(message: impl Into<String>) -> Self {
        Self::with_status(OutcomeStatus::Modified, Some(message.into()))
    }

    pub fn violation(message: impl Into<String>) -> Self {
        Self::with_status(OutcomeStatus::Violation, Some(message.into()))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_status(OutcomeStatus::Error, Some(message.into()))
    }

    /// Violation carrying checker diagnostics; clean when there are none.
    pub fn from_diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        if diagnostics.is_empty() {
            return Self::clean();
        }
        Self {
            status: OutcomeStatus::Violation,
            message: None,
            diagnostics,
        }
    }
}

pub trait Operation {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn file_filter(&self) -> FileFilter;

    /// Whether `apply` can change files. Pure checkers behave the same in both modes.
    fn fixable(&self) -> bool {
        true
    }

    /// Report what `apply` would do without modifying the file.
    fn check(&self, path: &Path) -> Result<Finding, OperationError>;

    /// Bring the file in line with the operation's rule.
    fn apply(&self, path: &Path) -> Result<Finding, OperationError>;
}

/// Run `operation` on one file and turn the result into an outcome.
pub fn run_operation(operation: &dyn Operation, path: &Path, mode: Mode) -> Outcome {
    let result = if mode.is_check() || !operation.fixable() {
        operation.check(path)
    } else {
        operation.apply(path)
    };

    match result {
        Ok(finding) => {
            let mut outcome = Outcome::new(path, operation.name(), finding.status).with_diagnostics(finding.diagnostics);
            outcome.message = finding.message;
            outcome
        }
        Err(err) => {
            log::debug!("{} failed on {}: {err}", operation.name(), path.display());
            Outcome::new(path, operation.name(), OutcomeStatus::Error).with_message(err.to_string())
        }
    }
}

pub(crate) fn read_bytes(path: &Path) -> Result<Vec<u8>, OperationError> {
    fs::read(path).map_err(|source| OperationError::FileAccess {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn read_text(path: &Path) -> Result<String, OperationError> {
    String::from_utf8(read_bytes(path)?).map_err(|_| OperationError::InvalidUtf8 {
        path: path.to_path_buf(),
    })
}

pub(crate) fn write_bytes(path: &Path, content: &[u8]) -> Result<(), OperationError> {
    fs::write(path, content).map_err(|source| OperationError::FileAccess {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Recording {
        fixable: bool,
        applied: Cell<bool>,
    }

    impl Operation for Recording {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn description(&self) -> &'static str {
            "Records which mode ran"
        }

        fn file_filter(&self) -> FileFilter {
            FileFilter::Text
        }

        fn fixable(&self) -> bool {
            self.fixable
        }

        fn check(&self, _path: &Path) -> Result<Finding, OperationError> {
            Ok(Finding::violation("would change"))
        }

        fn apply(&self, _path: &Path) -> Result<Finding, OperationError> {
            self.applied.set(true);
            Ok(Finding::modified("changed"))
        }
    }

    struct Failing;

    impl Operation for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn description(&self) -> &'static str {
            "Always fails"
        }

        fn file_filter(&self) -> FileFilter {
            FileFilter::Text
        }

        fn check(&self, path: &Path) -> Result<Finding, OperationError> {
            read_text(path).map(|_| Finding::clean())
        }

        fn apply(&self, path: &Path) -> Result<Finding, OperationError> {
            self.check(path)
        }
    }

    #[test]
    fn test_mode_selects_method() {
        let op = Recording {
            fixable: true,
            applied: Cell::new(false),
        };
        let outcome = run_operation(&op, Path::new("a.py"), Mode::Check);
        assert_eq!(outcome.status, OutcomeStatus::Violation);
        assert!(!op.applied.get());

        let outcome = run_operation(&op, Path::new("a.py"), Mode::Apply);
        assert_eq!(outcome.status, OutcomeStatus::Modified);
        assert_eq!(outcome.message.as_deref(), Some("changed"));
        assert!(op.applied.get());
    }

    #[test]
    fn test_non_fixable_only_checks() {
        let op = Recording {
            fixable: false,
            applied: Cell::new(false),
        };
        let outcome = run_operation(&op, Path::new("a.py"), Mode::Apply);
        assert_eq!(outcome.status, OutcomeStatus::Violation);
        assert!(!op.applied.get());
    }

    #[test]
    fn test_errors_become_outcomes() {
        let outcome = run_operation(&Failing, Path::new("/definitely/not/here.py"), Mode::Check);
        assert_eq!(outcome.status, OutcomeStatus::Error);
        assert_eq!(outcome.operation, "failing");
        assert!(outcome.message.unwrap().contains("/definitely/not/here.py"));
    }

    #[test]
    fn test_from_diagnostics() {
        assert_eq!(Finding::from_diagnostics(Vec::new()), Finding::clean());
        let finding = Finding::from_diagnostics(vec![Diagnostic {
            line: 1,
            column: 1,
            cell: None,
            code: "F401".to_string(),
            message: "unused".to_string(),
        }]);
        assert_eq!(finding.status, OutcomeStatus::Violation);
        assert_eq!(finding.diagnostics.len(), 1);
    }
}
