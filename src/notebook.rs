//! Jupyter notebook document model.
//!
//! The document is kept as a JSON object with its original key order so that
//! rewriting a notebook only changes the fields colint touches. Cells are
//! validated when the notebook is parsed.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotebookError {
    #[error("invalid notebook JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("notebook document is not a JSON object")]
    NotAnObject,
    #[error("cannot find 'cells' in notebook")]
    MissingCells,
    #[error("invalid cell {index}: {reason}")]
    InvalidCell { index: usize, reason: String },
    #[error("failed to access notebook {path}: {source}")]
    Io { path: String, source: std::io::Error },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellType {
    Code,
    Markdown,
    Raw,
    Other(String),
}

impl CellType {
    fn parse(value: &str) -> Self {
        match value {
            "code" => CellType::Code,
            "markdown" => CellType::Markdown,
            "raw" => CellType::Raw,
            other => CellType::Other(other.to_string()),
        }
    }
}

/// A single notebook cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    cell_type: CellType,
    data: Map<String, Value>,
}

impl Cell {
    fn from_value(index: usize, value: Value) -> Result<Self, NotebookError> {
        let invalid = |reason: &str| NotebookError::InvalidCell {
            index,
            reason: reason.to_string(),
        };

        let Value::Object(data) = value else {
            return Err(invalid("cell is not an object"));
        };
        let cell_type = data
            .get("cell_type")
            .and_then(Value::as_str)
            .map(CellType::parse)
            .ok_or_else(|| invalid("missing 'cell_type'"))?;
        match data.get("source") {
            Some(Value::String(_)) => {}
            Some(Value::Array(lines)) if lines.iter().all(Value::is_string) => {}
            Some(_) => return Err(invalid("'source' must be a string or a list of strings")),
            None => return Err(invalid("missing 'source'")),
        }
        if cell_type == CellType::Code && !data.get("outputs").is_some_and(Value::is_array) {
            return Err(invalid("code cell without 'outputs'"));
        }

        Ok(Self { cell_type, data })
    }

    pub fn cell_type(&self) -> &CellType {
        &self.cell_type
    }

    pub fn is_code(&self) -> bool {
        self.cell_type == CellType::Code
    }

    /// Cell source as a single string.
    pub fn source(&self) -> String {
        match self.data.get("source") {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Array(lines)) => lines.iter().filter_map(Value::as_str).collect(),
            _ => String::new(),
        }
    }

    /// Replace the cell source, keeping the representation (string or line list) it had.
    pub fn set_source(&mut self, text: &str) {
        let value = match self.data.get("source") {
            Some(Value::String(_)) => Value::String(text.to_string()),
            _ => Value::Array(
                text.split_inclusive('\n')
                    .map(|line| Value::String(line.to_string()))
                    .collect(),
            ),
        };
        self.data.insert("source".to_string(), value);
    }

    /// Whether a code cell contains anything besides blank lines and comments.
    pub fn has_code(&self) -> bool {
        self.is_code()
            && self.source().lines().any(|line| {
                let trimmed = line.trim();
                !trimmed.is_empty() && !trimmed.starts_with('#')
            })
    }

    pub fn outputs_len(&self) -> usize {
        self.data.get("outputs").and_then(Value::as_array).map_or(0, Vec::len)
    }

    pub fn execution_count(&self) -> Option<&Value> {
        self.data.get("execution_count").filter(|v| !v.is_null())
    }

    /// Outputs or an execution count are present.
    pub fn has_output(&self) -> bool {
        self.outputs_len() > 0 || self.execution_count().is_some()
    }

    pub fn metadata(&self) -> Option<&Map<String, Value>> {
        self.data.get("metadata").and_then(Value::as_object)
    }

    /// Remove outputs, the execution count and the given metadata keys.
    ///
    /// Returns whether anything changed. Non-code cells only lose metadata keys.
    pub fn clean(&mut self, strip_metadata_keys: &[String]) -> bool {
        let mut changed = false;

        if self.is_code() {
            if self.outputs_len() > 0 {
                self.data.insert("outputs".to_string(), Value::Array(Vec::new()));
                changed = true;
            }
            if self.execution_count().is_some() {
                self.data.insert("execution_count".to_string(), Value::Null);
                changed = true;
            }
        }

        if let Some(Value::Object(metadata)) = self.data.get_mut("metadata") {
            for key in strip_metadata_keys {
                // shift_remove keeps the order of the remaining keys
                if metadata.shift_remove(key).is_some() {
                    changed = true;
                }
            }
        }

        changed
    }

    fn to_value(&self) -> Value {
        Value::Object(self.data.clone())
    }
}

/// A parsed notebook document.
#[derive(Debug, Clone, PartialEq)]
pub struct Notebook {
    /// Top-level object; its `cells` entry is rebuilt from `cells` on serialization.
    root: Map<String, Value>,
    cells: Vec<Cell>,
}

impl Notebook {
    /// Parse a notebook. An empty (or whitespace-only) document is an empty notebook.
    pub fn parse(text: &str) -> Result<Self, NotebookError> {
        if text.trim().is_empty() {
            return Ok(Self {
                root: Map::new(),
                cells: Vec::new(),
            });
        }

        let Value::Object(mut root) = serde_json::from_str::<Value>(text)? else {
            return Err(NotebookError::NotAnObject);
        };
        let Some(Value::Array(raw_cells)) = root.get_mut("cells").map(Value::take) else {
            return Err(NotebookError::MissingCells);
        };
        let cells = raw_cells
            .into_iter()
            .enumerate()
            .map(|(index, value)| Cell::from_value(index, value))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { root, cells })
    }

    pub fn read(path: &Path) -> Result<Self, NotebookError> {
        let text = fs::read_to_string(path).map_err(|source| NotebookError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Clean every cell, returning whether anything changed.
    pub fn clean(&mut self, strip_metadata_keys: &[String]) -> bool {
        let mut changed = false;
        for cell in &mut self.cells {
            changed |= cell.clean(strip_metadata_keys);
        }
        changed
    }

    pub fn to_value(&self) -> Value {
        let mut root = self.root.clone();
        // insert on an existing key keeps its position
        root.insert(
            "cells".to_string(),
            Value::Array(self.cells.iter().map(Cell::to_value).collect()),
        );
        Value::Object(root)
    }

    /// Serialize in Jupyter's on-disk layout: one-space indentation and a trailing newline.
    pub fn to_json_string(&self) -> Result<String, NotebookError> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b" ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.to_value().serialize(&mut serializer)?;
        buf.push(b'\n');
        // serde_json only emits valid UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub fn save(&self, path: &Path) -> Result<(), NotebookError> {
        let text = self.to_json_string()?;
        fs::write(path, text).map_err(|source| NotebookError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}
