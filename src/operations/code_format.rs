use super::rewrite::StdinRewrite;
use super::{Finding, Operation, OperationError};
use crate::cli_types::Mode;
use crate::file_processor::FileFilter;
use crate::notebook::Cell;
use crate::tools::{ToolDefinition, ToolExecutor};
use std::path::Path;
use std::sync::Arc;

/// Formats code with black.
pub struct CodeFormat {
    rewrite: StdinRewrite,
}

fn non_empty_code(cell: &Cell) -> bool {
    cell.is_code() && !cell.source().trim().is_empty()
}

impl CodeFormat {
    pub fn new(tool: ToolDefinition, executor: Arc<ToolExecutor>) -> Self {
        Self {
            rewrite: StdinRewrite {
                tool,
                executor,
                select_cell: non_empty_code,
                would_change: "would have been reformatted.",
                changed: "has been reformatted.",
            },
        }
    }
}

impl Operation for CodeFormat {
    fn name(&self) -> &'static str {
        "code-format"
    }

    fn description(&self) -> &'static str {
        "Format code with black"
    }

    fn file_filter(&self) -> FileFilter {
        FileFilter::PythonOrNotebook
    }

    fn check(&self, path: &Path) -> Result<Finding, OperationError> {
        self.rewrite.run(path, Mode::Check)
    }

    fn apply(&self, path: &Path) -> Result<Finding, OperationError> {
        self.rewrite.run(path, Mode::Apply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::OutcomeStatus;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_cell_selection() {
        let cell = |cell_type: &str, source: &str| {
            let notebook = crate::notebook::Notebook::parse(
                &serde_json::json!({
                    "cells": [{"cell_type": cell_type, "metadata": {}, "outputs": [], "source": source}]
                })
                .to_string(),
            )
            .unwrap();
            notebook.cells()[0].clone()
        };

        assert!(non_empty_code(&cell("code", "x=1")));
        assert!(non_empty_code(&cell("code", "# comment only")));
        assert!(!non_empty_code(&cell("code", "  \n\n")));
        assert!(!non_empty_code(&cell("markdown", "x=1")));
    }

    #[test]
    #[ignore = "requires black on PATH"]
    fn test_real_black() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("a.py");
        fs::write(&path, "x=1\n").unwrap();

        let registry = crate::tools::ToolRegistry::default();
        let op = CodeFormat::new(
            registry.get(crate::tools::registry::BLACK).unwrap().clone(),
            Arc::new(ToolExecutor::default()),
        );

        assert_eq!(op.check(&path).unwrap().status, OutcomeStatus::Violation);
        assert_eq!(fs::read_to_string(&path).unwrap(), "x=1\n");
        assert_eq!(op.apply(&path).unwrap().status, OutcomeStatus::Modified);
        assert_eq!(fs::read_to_string(&path).unwrap(), "x = 1\n");
        assert_eq!(op.check(&path).unwrap().status, OutcomeStatus::Clean);
    }
}
