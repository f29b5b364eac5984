//! Configuration types for external tools.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Placeholder substituted with the path of the file being processed.
pub const FILENAME_PLACEHOLDER: &str = "{filename}";

/// Definition of an external tool.
///
/// Every tool reads the content to process on stdin and writes its result
/// (rewritten content or diagnostics) on stdout.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ToolDefinition {
    /// Command to run (first element is the binary, rest are arguments)
    pub command: Vec<String>,
}

impl ToolDefinition {
    pub fn new<I, S>(command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into_iter().map(Into::into).collect(),
        }
    }

    /// Binary name, if the command is not empty.
    pub fn program(&self) -> Option<&str> {
        self.command.first().map(String::as_str)
    }

    /// Arguments with `{filename}` replaced by `filename`.
    pub fn args_for(&self, filename: &Path) -> Vec<String> {
        let display = filename.to_string_lossy();
        self.command
            .iter()
            .skip(1)
            .map(|arg| arg.replace(FILENAME_PLACEHOLDER, &display))
            .collect()
    }
}
