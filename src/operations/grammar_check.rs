//! Style checking with flake8.
//!
//! flake8 is asked for `row:col:code:text` lines (see [`FLAKE8_FORMAT`]) which are
//! parsed into [`Diagnostic`]s. Notebooks are checked as one document built from
//! their code cells; each finding is mapped back to the cell it came from.
//!
//! [`FLAKE8_FORMAT`]: crate::tools::registry::FLAKE8_FORMAT

use super::{Finding, Operation, OperationError, read_text};
use crate::config::Flake8Settings;
use crate::file_processor::{FileFilter, is_notebook};
use crate::notebook::Notebook;
use crate::report::Diagnostic;
use crate::tools::{ExecutorError, ToolDefinition, ToolExecutor};
use regex::Regex;
use std::path::Path;
use std::sync::{Arc, LazyLock};

static DIAGNOSTIC_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+):(\d+):([A-Z]+\d+):\s?(.*)$").expect("valid regex"));

pub struct GrammarCheck {
    tool: ToolDefinition,
    executor: Arc<ToolExecutor>,
    settings: Flake8Settings,
}

impl GrammarCheck {
    pub fn new(tool: ToolDefinition, executor: Arc<ToolExecutor>, settings: Flake8Settings) -> Self {
        Self {
            tool,
            executor,
            settings,
        }
    }

    fn run_checker(&self, source: &str, path: &Path) -> Result<Vec<Diagnostic>, OperationError> {
        let output = self.executor.execute(&self.tool, source, path)?;
        let diagnostics = parse_diagnostics(&output.stdout);

        if !output.success && diagnostics.is_empty() {
            let detail = if output.stderr.trim().is_empty() {
                output.stdout.trim()
            } else {
                output.stderr.trim()
            };
            return Err(ExecutorError::ExecutionFailed {
                tool: self.tool.program().unwrap_or_default().to_string(),
                message: format!("Exit code {}: {detail}", output.exit_code),
            }
            .into());
        }

        Ok(diagnostics)
    }

    fn check_notebook(&self, path: &Path) -> Result<Vec<Diagnostic>, OperationError> {
        let notebook = Notebook::read(path)?;
        let (cell_numbers, sources): (Vec<usize>, Vec<String>) = notebook
            .cells()
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.has_code())
            .map(|(index, cell)| (index + 1, cell.source().trim_end_matches(['\n', '\r']).to_string()))
            .unzip();
        if sources.is_empty() {
            return Ok(Vec::new());
        }

        let mut document = sources.join("\n");
        document.push('\n');
        let cell_sizes: Vec<usize> = sources.iter().map(|source| source.lines().count()).collect();

        let mut diagnostics = self.run_checker(&document, &path.with_extension("py"))?;
        for diagnostic in &mut diagnostics {
            if let Some((position, line)) = locate_cell(&cell_sizes, diagnostic.line) {
                diagnostic.cell = Some(cell_numbers[position]);
                diagnostic.line = line;
            }
        }
        Ok(diagnostics)
    }

    fn is_ignored(&self, path: &Path, code: &str) -> bool {
        if self.settings.extend_ignore.iter().any(|prefix| code.starts_with(prefix.as_str())) {
            return true;
        }
        let Some(basename) = path.file_name().and_then(|name| name.to_str()) else {
            return false;
        };
        self.settings
            .per_file_ignores
            .get(basename)
            .is_some_and(|prefixes| prefixes.iter().any(|prefix| code.starts_with(prefix.as_str())))
    }
}

impl Operation for GrammarCheck {
    fn name(&self) -> &'static str {
        "grammar-check"
    }

    fn description(&self) -> &'static str {
        "Check code style with flake8"
    }

    fn file_filter(&self) -> FileFilter {
        FileFilter::PythonOrNotebook
    }

    fn fixable(&self) -> bool {
        false
    }

    fn check(&self, path: &Path) -> Result<Finding, OperationError> {
        let diagnostics = if is_notebook(path) {
            self.check_notebook(path)?
        } else {
            let source = read_text(path)?;
            self.run_checker(&source, path)?
        };

        let diagnostics = diagnostics
            .into_iter()
            .filter(|d| !self.is_ignored(path, &d.code))
            .collect();
        Ok(Finding::from_diagnostics(diagnostics))
    }

    fn apply(&self, path: &Path) -> Result<Finding, OperationError> {
        self.check(path)
    }
}

/// Parse `row:col:code:text` lines; anything else in the output is skipped.
pub fn parse_diagnostics(output: &str) -> Vec<Diagnostic> {
    output
        .lines()
        .filter_map(|line| {
            let caps = DIAGNOSTIC_LINE.captures(line.trim_end())?;
            Some(Diagnostic {
                line: caps[1].parse().ok()?,
                column: caps[2].parse().ok()?,
                cell: None,
                code: caps[3].to_string(),
                message: caps[4].to_string(),
            })
        })
        .collect()
}

/// Map a line of the concatenated notebook to (position of the checked cell, line within cell).
fn locate_cell(cell_sizes: &[usize], line: usize) -> Option<(usize, usize)> {
    let mut preceding = 0;
    for (position, size) in cell_sizes.iter().enumerate() {
        if line <= preceding + size {
            return Some((position, line - preceding));
        }
        preceding += size;
    }
    None
}
