use super::{Finding, Operation, OperationError};
use crate::file_processor::FileFilter;
use crate::notebook::Notebook;
use std::path::Path;

/// Clears outputs, execution counts and volatile cell metadata from notebooks.
pub struct CleanNotebook {
    strip_metadata_keys: Vec<String>,
}

impl CleanNotebook {
    pub fn new(strip_metadata_keys: Vec<String>) -> Self {
        Self { strip_metadata_keys }
    }
}

impl Operation for CleanNotebook {
    fn name(&self) -> &'static str {
        "clean-jupyter"
    }

    fn description(&self) -> &'static str {
        "Clear notebook outputs and execution counts"
    }

    fn file_filter(&self) -> FileFilter {
        FileFilter::Notebook
    }

    fn check(&self, path: &Path) -> Result<Finding, OperationError> {
        let mut notebook = Notebook::read(path)?;
        Ok(if notebook.clean(&self.strip_metadata_keys) {
            Finding::violation("has not been cleared of its outputs.")
        } else {
            Finding::clean()
        })
    }

    fn apply(&self, path: &Path) -> Result<Finding, OperationError> {
        let mut notebook = Notebook::read(path)?;
        if !notebook.clean(&self.strip_metadata_keys) {
            return Ok(Finding::clean());
        }
        notebook.save(path)?;
        Ok(Finding::modified("has been cleared of its outputs."))
    }
}
