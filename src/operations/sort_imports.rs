use super::rewrite::StdinRewrite;
use super::{Finding, Operation, OperationError};
use crate::cli_types::Mode;
use crate::file_processor::FileFilter;
use crate::notebook::Cell;
use crate::tools::{ToolDefinition, ToolExecutor};
use std::path::Path;
use std::sync::Arc;

/// Sorts imports with isort.
pub struct SortImports {
    rewrite: StdinRewrite,
}

impl SortImports {
    pub fn new(tool: ToolDefinition, executor: Arc<ToolExecutor>) -> Self {
        Self {
            rewrite: StdinRewrite {
                tool,
                executor,
                select_cell: Cell::has_code,
                would_change: "Imports are incorrectly sorted and/or formatted.",
                changed: "Imports have been sorted.",
            },
        }
    }
}

impl Operation for SortImports {
    fn name(&self) -> &'static str {
        "sort-libraries"
    }

    fn description(&self) -> &'static str {
        "Sort imports with isort"
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
