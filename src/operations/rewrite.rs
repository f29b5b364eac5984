//! Shared driver for tools that rewrite source read from stdin.

use super::{Finding, OperationError, read_text, write_bytes};
use crate::cli_types::Mode;
use crate::file_processor::is_notebook;
use crate::notebook::{Cell, Notebook};
use crate::tools::{ExecutorError, ToolDefinition, ToolExecutor};
use crate::utils::line_ending::ensure_consistent_line_endings;
use std::path::Path;
use std::sync::Arc;

pub(crate) struct StdinRewrite {
    pub tool: ToolDefinition,
    pub executor: Arc<ToolExecutor>,
    /// Notebook cells handed to the tool
    pub select_cell: fn(&Cell) -> bool,
    pub would_change: &'static str,
    pub changed: &'static str,
}

impl StdinRewrite {
    pub fn run(&self, path: &Path, mode: Mode) -> Result<Finding, OperationError> {
        if is_notebook(path) {
            self.run_notebook(path, mode)
        } else {
            self.run_source(path, mode)
        }
    }

    fn run_source(&self, path: &Path, mode: Mode) -> Result<Finding, OperationError> {
        let original = read_text(path)?;
        let output = self.executor.run(&self.tool, &original, path)?;
        let output = ensure_consistent_line_endings(&original, &output);

        if output == original {
            return Ok(Finding::clean());
        }
        if mode.is_check() {
            return Ok(Finding::violation(self.would_change));
        }
        write_bytes(path, output.as_bytes())?;
        Ok(Finding::modified(self.changed))
    }

    fn run_notebook(&self, path: &Path, mode: Mode) -> Result<Finding, OperationError> {
        let mut notebook = Notebook::read(path)?;
        // tools pick their parser from the extension
        let hint = path.with_extension("py");
        let mut changed = false;
        let mut failures = Vec::new();

        for (index, cell) in notebook.cells_mut().iter_mut().enumerate() {
            if !(self.select_cell)(cell) {
                continue;
            }
            let source = cell.source();
            match self.executor.run(&self.tool, &source, &hint) {
                Ok(output) => {
                    let output = output.trim_end_matches(['\n', '\r']);
                    if output != source.trim_end_matches(['\n', '\r']) {
                        cell.set_source(output);
                        changed = true;
                    }
                }
                Err(err @ ExecutorError::ToolNotFound { .. }) => return Err(err.into()),
                Err(err) => failures.push(format!("cell {}: {err}", index + 1)),
            }
        }

        if changed && !mode.is_check() {
            notebook.save(path)?;
        }

        if !failures.is_empty() {
            return Ok(Finding::error(format!(
                "Failed to process {} cell(s): {}",
                failures.len(),
                failures.join("; ")
            )));
        }

        Ok(match (changed, mode) {
            (false, _) => Finding::clean(),
            (true, Mode::Check) => Finding::violation(self.would_change),
            (true, Mode::Apply) => Finding::modified(self.changed),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::report::OutcomeStatus;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    fn rewrite(command: &[&str]) -> StdinRewrite {
        StdinRewrite {
            tool: ToolDefinition::new(command.iter().copied()),
            executor: Arc::new(ToolExecutor::default()),
            select_cell: Cell::has_code,
            would_change: "would change",
            changed: "changed",
        }
    }

    fn upper() -> StdinRewrite {
        rewrite(&["tr", "a-z", "A-Z"])
    }

    fn notebook_json(sources: &[&str]) -> String {
        let cells: Vec<_> = sources
            .iter()
            .map(|source| {
                json!({
                    "cell_type": "code",
                    "execution_count": null,
                    "metadata": {},
                    "outputs": [],
                    "source": source,
                })
            })
            .collect();
        serde_json::to_string(&json!({"cells": cells, "metadata": {}, "nbformat": 4, "nbformat_minor": 5})).unwrap()
    }

    #[test]
    fn test_source_check_and_apply() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("a.py");
        fs::write(&path, "x = 1\n").unwrap();

        let finding = upper().run(&path, Mode::Check).unwrap();
        assert_eq!(finding.status, OutcomeStatus::Violation);
        assert_eq!(fs::read_to_string(&path).unwrap(), "x = 1\n");

        let finding = upper().run(&path, Mode::Apply).unwrap();
        assert_eq!(finding.status, OutcomeStatus::Modified);
        assert_eq!(fs::read_to_string(&path).unwrap(), "X = 1\n");

        let finding = upper().run(&path, Mode::Apply).unwrap();
        assert_eq!(finding, Finding::clean());
    }

    #[test]
    fn test_crlf_is_preserved() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("a.py");
        fs::write(&path, "X = 1\r\nY = 2\r\n").unwrap();

        // a tool that only emits LF must not cause a spurious change
        let finding = rewrite(&["sh", "-c", "tr -d '\\r'"]).run(&path, Mode::Check).unwrap();
        assert_eq!(finding, Finding::clean());
    }

    #[test]
    fn test_mixed_endings_untouched_by_noop_tool() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("a.py");
        let original = "import os\r\nimport sys\nx = 1\n";
        fs::write(&path, original).unwrap();

        assert_eq!(rewrite(&["cat"]).run(&path, Mode::Check).unwrap(), Finding::clean());
        assert_eq!(rewrite(&["cat"]).run(&path, Mode::Apply).unwrap(), Finding::clean());
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_tool_failure_is_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("a.py");
        fs::write(&path, "x = (\n").unwrap();

        let err = rewrite(&["sh", "-c", "echo 'cannot parse' >&2; exit 123"])
            .run(&path, Mode::Apply)
            .unwrap_err();
        assert!(err.to_string().contains("cannot parse"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "x = (\n");
    }

    #[test]
    fn test_notebook_cells() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nb.ipynb");
        let original = notebook_json(&["x = 1\n", "# only a comment", "y = 2"]);
        fs::write(&path, &original).unwrap();

        let finding = upper().run(&path, Mode::Check).unwrap();
        assert_eq!(finding.status, OutcomeStatus::Violation);
        assert_eq!(fs::read_to_string(&path).unwrap(), original);

        let finding = upper().run(&path, Mode::Apply).unwrap();
        assert_eq!(finding.status, OutcomeStatus::Modified);
        let notebook = Notebook::read(&path).unwrap();
        let sources: Vec<String> = notebook.cells().iter().map(Cell::source).collect();
        assert_eq!(sources, vec!["X = 1", "# only a comment", "Y = 2"]);
    }

    #[test]
    fn test_trailing_newline_difference_is_ignored_in_cells() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nb.ipynb");
        fs::write(&path, notebook_json(&["x = 1"])).unwrap();

        // cat plus a newline mimics a formatter terminating its output
        let finding = rewrite(&["sh", "-c", "cat; echo"]).run(&path, Mode::Check).unwrap();
        assert_eq!(finding, Finding::clean());
    }

    #[test]
    fn test_failing_cell_does_not_block_others() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nb.ipynb");
        fs::write(&path, notebook_json(&["bad", "good"])).unwrap();

        let tool = rewrite(&["sh", "-c", "read line; [ \"$line\" = bad ] && exit 1; echo GOOD"]);
        let finding = tool.run(&path, Mode::Apply).unwrap();
        assert_eq!(finding.status, OutcomeStatus::Error);
        assert!(finding.message.unwrap().contains("cell 1"));

        let notebook = Notebook::read(&path).unwrap();
        let sources: Vec<String> = notebook.cells().iter().map(Cell::source).collect();
        assert_eq!(sources, vec!["bad", "GOOD"]);
    }

    #[test]
    fn test_missing_tool_aborts_notebook() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nb.ipynb");
        fs::write(&path, notebook_json(&["x = 1", "y = 2"])).unwrap();

        let err = rewrite(&["colint-test-no-such-tool"]).run(&path, Mode::Check).unwrap_err();
        assert!(matches!(err, OperationError::Tool(ExecutorError::ToolNotFound { .. })));
    }
}
