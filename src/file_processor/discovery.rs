//! File discovery and path utilities

use crate::config::ColintSettings;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directories that are never descended into.
pub const IGNORED_DIRECTORIES: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "venv",
    ".venv",
    "env",
    ".env",
    "__pycache__",
    ".tox",
    ".nox",
    ".mypy_cache",
    ".pytest_cache",
    ".ipynb_checkpoints",
    "node_modules",
];

/// Number of leading bytes inspected when deciding whether a file is text.
const BINARY_SNIFF_LEN: usize = 8000;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Path '{0}' does not exist")]
    NotFound(String),
    #[error("Invalid exclude pattern '{pattern}': {source}")]
    InvalidPattern { pattern: String, source: globset::Error },
}

/// Which files an operation wants to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFilter {
    /// `*.py`
    Python,
    /// `*.ipynb`
    Notebook,
    /// `*.py` and `*.ipynb`
    PythonOrNotebook,
    /// Any file that does not look binary
    Text,
}

impl FileFilter {
    pub fn matches(self, path: &Path) -> bool {
        match self {
            FileFilter::Python => has_extension(path, "py"),
            FileFilter::Notebook => has_extension(path, "ipynb"),
            FileFilter::PythonOrNotebook => has_extension(path, "py") || has_extension(path, "ipynb"),
            FileFilter::Text => is_text_file(path),
        }
    }
}

pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|ext| ext == extension)
}

pub fn is_notebook(path: &Path) -> bool {
    has_extension(path, "ipynb")
}

/// A file is text when its first bytes contain no NUL byte. Unreadable files count as text
/// so that the operation reports the access error.
pub fn is_text_file(path: &Path) -> bool {
    let Ok(file) = File::open(path) else {
        return true;
    };
    let mut head = Vec::with_capacity(BINARY_SNIFF_LEN);
    match file.take(BINARY_SNIFF_LEN as u64).read_to_end(&mut head) {
        Ok(_) => !head.contains(&0),
        Err(_) => true,
    }
}

/// Expands directory-style patterns to also match files within them.
/// Pattern "dir/path" becomes ["dir/path", "dir/path/**"] to match both
/// the directory itself and all contents recursively.
///
/// Patterns containing glob characters (*, ?, [) are returned unchanged.
fn expand_directory_pattern(pattern: &str) -> Vec<String> {
    if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
        return vec![pattern.to_string()];
    }

    let base = pattern.trim_end_matches('/');
    vec![base.to_string(), format!("{base}/**")]
}

/// Walks target paths and yields the files an operation should process.
pub struct Discoverer {
    exclude: GlobSet,
    respect_gitignore: bool,
}

impl Discoverer {
    pub fn new(settings: &ColintSettings) -> Result<Self, DiscoveryError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in settings.exclude.iter().flat_map(|p| expand_directory_pattern(p)) {
            let glob = Glob::new(&pattern).map_err(|source| DiscoveryError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }
        let exclude = builder.build().map_err(|source| DiscoveryError::InvalidPattern {
            pattern: settings.exclude.join(", "),
            source,
        })?;

        Ok(Self {
            exclude,
            respect_gitignore: settings.respect_gitignore,
        })
    }

    fn is_excluded(&self, root: &Path, path: &Path) -> bool {
        let relative = path.strip_prefix(root).unwrap_or(path);
        self.exclude.is_match(relative)
    }

    /// Lazily yield the files under `root` accepted by `filter`.
    ///
    /// A file root yields itself when it matches the filter; exclude patterns do not
    /// apply to a file that was named explicitly.
    pub fn walk<'a>(
        &'a self,
        root: &Path,
        filter: FileFilter,
    ) -> Result<Box<dyn Iterator<Item = PathBuf> + 'a>, DiscoveryError> {
        if !root.exists() {
            return Err(DiscoveryError::NotFound(root.display().to_string()));
        }

        if root.is_file() {
            let single = filter.matches(root).then(|| root.to_path_buf());
            return Ok(Box::new(single.into_iter()));
        }

        let use_gitignore = self.respect_gitignore;
        let mut walk_builder = WalkBuilder::new(root);
        walk_builder.ignore(use_gitignore); // Enable/disable .ignore
        walk_builder.git_ignore(use_gitignore); // Enable/disable .gitignore
        walk_builder.git_global(use_gitignore); // Enable/disable global gitignore
        walk_builder.git_exclude(use_gitignore); // Enable/disable .git/info/exclude
        walk_builder.parents(use_gitignore); // Enable/disable parent ignores
        walk_builder.hidden(false); // Include hidden files and directories
        walk_builder.require_git(false); // Process git ignores even if no repo detected
        walk_builder.sort_by_file_name(|a, b| a.cmp(b));
        walk_builder.filter_entry(|entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !(is_dir
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| IGNORED_DIRECTORIES.contains(&name)))
        });

        let root = root.to_path_buf();
        let files = walk_builder.build().filter_map(move |result| match result {
            Ok(entry) => {
                let path = entry.path();
                if !entry.file_type().is_some_and(|t| t.is_file()) {
                    return None;
                }
                if self.is_excluded(&root, path) {
                    log::debug!("Excluded by pattern: {}", path.display());
                    return None;
                }
                filter.matches(path).then(|| path.to_path_buf())
            }
            Err(err) => {
                log::warn!("Error walking directory: {err}");
                None
            }
        });

        Ok(Box::new(files))
    }

    /// Collect and sort the files under `root` accepted by `filter`.
    pub fn discover(&self, root: &Path, filter: FileFilter) -> Result<Vec<PathBuf>, DiscoveryError> {
        let mut files: Vec<PathBuf> = self.walk(root, filter)?.collect();
        files.sort();
        files.dedup();
        Ok(files)
    }
}

/// Convert a file path to a path relative to the current directory for display purposes.
pub fn to_display_path(file_path: &Path) -> String {
    let canonical_file = file_path.canonicalize().ok();
    let effective_path = canonical_file.as_deref().unwrap_or(file_path);

    if let Ok(cwd) = std::env::current_dir()
        && let Some(relative) = strip_base_prefix(effective_path, &cwd)
    {
        return relative;
    }

    file_path.display().to_string()
}

/// Try to strip a base path prefix from a file path.
/// Handles canonicalization of the base path to resolve symlinks.
fn strip_base_prefix(file_path: &Path, base: &Path) -> Option<String> {
    let canonical_base = base.canonicalize().ok()?;

    if let Ok(relative) = file_path.strip_prefix(&canonical_base) {
        return Some(relative.to_string_lossy().to_string());
    }

    if let Ok(relative) = file_path.strip_prefix(base) {
        return Some(relative.to_string_lossy().to_string());
    }

    None
}
