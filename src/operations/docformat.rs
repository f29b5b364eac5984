//! Experimental reflow of over-long full-line comments.
//!
//! Only comment lines longer than the configured line length are touched. Their
//! words are re-wrapped onto consecutive comment lines sharing the original
//! indentation and comment marker. Comments inside triple-quoted strings, the
//! shebang and tool directives (`noqa`, `type:`, `fmt:`, `pragma`) are kept verbatim.

use super::{Finding, Operation, OperationError, read_text, write_bytes};
use crate::file_processor::FileFilter;
use crate::utils::line_ending::dominant_line_ending;
use std::path::Path;

/// Narrower than this and wrapping would produce mostly single-word lines.
const MIN_TEXT_WIDTH: usize = 10;

const DIRECTIVES: &[&str] = &["noqa", "type:", "fmt:", "pragma"];

pub struct Docformat {
    line_length: usize,
}

impl Docformat {
    pub fn new(line_length: usize) -> Self {
        Self { line_length }
    }
}

impl Operation for Docformat {
    fn name(&self) -> &'static str {
        "docformat"
    }

    fn description(&self) -> &'static str {
        "Reflow over-long comments (experimental)"
    }

    fn file_filter(&self) -> FileFilter {
        FileFilter::Python
    }

    fn check(&self, path: &Path) -> Result<Finding, OperationError> {
        let original = read_text(path)?;
        Ok(if reflow_comments(&original, self.line_length) == original {
            Finding::clean()
        } else {
            Finding::violation("comments would have been reflowed.")
        })
    }

    fn apply(&self, path: &Path) -> Result<Finding, OperationError> {
        let original = read_text(path)?;
        let reflowed = reflow_comments(&original, self.line_length);
        if reflowed == original {
            return Ok(Finding::clean());
        }
        write_bytes(path, reflowed.as_bytes())?;
        Ok(Finding::modified("comments have been reflowed."))
    }
}

/// Reflow every eligible comment line of `source` to fit within `line_length` characters.
pub fn reflow_comments(source: &str, line_length: usize) -> String {
    let ending = dominant_line_ending(source.as_bytes());
    let mut scanner = StringScanner::default();
    let mut output = String::with_capacity(source.len());

    for (index, raw_line) in source.split_inclusive('\n').enumerate() {
        let line = raw_line.trim_end_matches(['\n', '\r']);
        let terminator = &raw_line[line.len()..];

        let eligible = !scanner.in_string()
            && !(index == 0 && line.starts_with("#!"))
            && line.chars().count() > line_length;

        match eligible.then(|| wrap_comment(line, line_length)).flatten() {
            Some(wrapped) => {
                output.push_str(&wrapped.join(ending));
                output.push_str(terminator);
            }
            None => {
                scanner.scan_line(line);
                output.push_str(raw_line);
            }
        }
    }

    output
}

/// Wrap a full-line comment, or `None` when the line must stay as it is.
fn wrap_comment(line: &str, line_length: usize) -> Option<Vec<String>> {
    let body = line.trim_start();
    if !body.starts_with('#') {
        return None;
    }
    let indent = &line[..line.len() - body.len()];
    let marker_len = body.len() - body.trim_start_matches('#').len();
    let marker = &body[..marker_len];
    let text = body[marker_len..].trim();

    if text.is_empty() || DIRECTIVES.iter().any(|d| text.starts_with(d)) {
        return None;
    }

    let prefix = format!("{indent}{marker} ");
    let width = line_length.checked_sub(prefix.chars().count())?;
    if width < MIN_TEXT_WIDTH {
        return None;
    }

    Some(
        wrap_words(text, width)
            .into_iter()
            .map(|wrapped| format!("{prefix}{wrapped}"))
            .collect(),
    )
}

/// Greedy word wrap. Words longer than `width` get a line of their own.
fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for word in text.split_whitespace() {
        let word_width = word.chars().count();
        if !current.is_empty() && current_width + 1 + word_width > width {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_width += 1;
        }
        current.push_str(word);
        current_width += word_width;
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Tracks whether the scan position is inside a triple-quoted string.
#[derive(Debug, Default)]
struct StringScanner {
    open_triple: Option<&'static str>,
}

impl StringScanner {
    fn in_string(&self) -> bool {
        self.open_triple.is_some()
    }

    fn scan_line(&mut self, line: &str) {
        let mut rest = line;
        while !rest.is_empty() {
            if let Some(delimiter) = self.open_triple {
                match find_unescaped(rest, delimiter) {
                    Some(end) => {
                        rest = &rest[end + delimiter.len()..];
                        self.open_triple = None;
                    }
                    None => return,
                }
                continue;
            }

            let Some(start) = rest.find(['#', '"', '\'']) else {
                return;
            };
            rest = &rest[start..];
            if rest.starts_with('#') {
                return;
            }
            if let Some(delimiter) = ["\"\"\"", "'''"].into_iter().find(|d| rest.starts_with(d)) {
                self.open_triple = Some(delimiter);
                rest = &rest[3..];
                continue;
            }

            // single-quoted string literal; an unterminated one ends at the line end
            let quote = &rest[..1];
            rest = match find_unescaped(&rest[1..], quote) {
                Some(end) => &rest[end + 2..],
                None => return,
            };
        }
    }
}

/// Byte offset of the first `needle` in `haystack` not preceded by a backslash escape.
fn find_unescaped(haystack: &str, needle: &str) -> Option<usize> {
    let mut escaped = false;
    for (offset, ch) in haystack.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
            continue;
        }
        if haystack[offset..].starts_with(needle) {
            return Some(offset);
        }
    }
    None
}
