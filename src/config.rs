//!
//! Configuration loading for colint.
//!
//! The configuration file uses the `pyproject.toml` layout: colint's own
//! settings live under `[tool.colint]`, and the settings forwarded to the
//! external tools under `[tool.isort]`, `[tool.black]` and `[tool.flake8]`.

use crate::tools::ToolDefinition;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Configuration file names searched for, in order of precedence.
pub const CONFIG_FILES: &[&str] = &[".colint.toml", "colint.toml", "pyproject.toml"];

/// Default cell metadata keys removed by the notebook cleaner.
pub const DEFAULT_STRIP_METADATA_KEYS: &[&str] = &["execution", "ExecuteTime", "collapsed", "scrolled"];

const MAX_DEPTH: usize = 100;

/// Sections whose keys are checked for typos.
const CHECKED_SECTIONS: &[&str] = &["colint", "isort", "black", "flake8"];

/// Keys understood in a `[tool.*]` section, including snake_case aliases.
fn known_keys(section: &str) -> &'static [&'static str] {
    match section {
        "colint" => &["exclude", "respect-gitignore", "timeout", "strip-metadata-keys", "tools"],
        "isort" => &["profile"],
        "black" => &["line-length", "line_length", "target-version", "target_version", "preview", "unstable"],
        "flake8" => &[
            "max-complexity",
            "max_complexity",
            "extend-ignore",
            "extend_ignore",
            "per-file-ignores",
            "per_file_ignores",
        ],
        _ => &[],
    }
}

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file at {path}: {source}")]
    IoError { source: io::Error, path: String },

    /// Failed to parse the configuration content
    #[error("Failed to parse config file at {path}: {message}")]
    ParseError { path: String, message: String },
}

/// Complete colint configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub tool: ToolSections,

    /// `(section, key)` pairs present in the file but not understood
    #[serde(skip)]
    unknown_keys: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ToolSections {
    #[serde(default)]
    pub colint: ColintSettings,
    #[serde(default)]
    pub isort: IsortSettings,
    #[serde(default)]
    pub black: BlackSettings,
    #[serde(default)]
    pub flake8: Flake8Settings,
}

/// Settings of colint itself (`[tool.colint]`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ColintSettings {
    /// Glob patterns, relative to the target root, that are never processed
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Honor .gitignore / .ignore files while walking directories
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// Timeout per tool invocation in milliseconds (0 waits indefinitely)
    #[serde(default)]
    pub timeout: u64,

    /// Cell metadata keys removed by clean-jupyter
    #[serde(default = "default_strip_metadata_keys")]
    pub strip_metadata_keys: Vec<String>,

    /// Tool command overrides keyed by tool id (isort, black, flake8)
    #[serde(default)]
    pub tools: HashMap<String, ToolDefinition>,
}

fn default_true() -> bool {
    true
}

fn default_strip_metadata_keys() -> Vec<String> {
    DEFAULT_STRIP_METADATA_KEYS.iter().map(|k| k.to_string()).collect()
}

impl Default for ColintSettings {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            respect_gitignore: true,
            timeout: 0,
            strip_metadata_keys: default_strip_metadata_keys(),
            tools: HashMap::new(),
        }
    }
}

/// Settings forwarded to isort (`[tool.isort]`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct IsortSettings {
    #[serde(default)]
    pub profile: Option<String>,
}

/// Settings forwarded to black (`[tool.black]`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", try_from = "RawBlackSettings")]
pub struct BlackSettings {
    pub line_length: usize,
    /// Target versions in black's spelling (e.g. `py310`)
    pub target_version: Vec<String>,
    pub preview: bool,
    pub unstable: bool,
}

impl Default for BlackSettings {
    fn default() -> Self {
        Self {
            line_length: 88,
            target_version: vec!["py310".to_string()],
            preview: false,
            unstable: false,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawBlackSettings {
    #[serde(default, alias = "line_length")]
    line_length: Option<usize>,
    #[serde(default, alias = "target_version")]
    target_version: Option<OneOrMany>,
    #[serde(default)]
    preview: bool,
    #[serde(default)]
    unstable: bool,
}

impl TryFrom<RawBlackSettings> for BlackSettings {
    type Error = String;

    fn try_from(raw: RawBlackSettings) -> Result<Self, Self::Error> {
        let defaults = BlackSettings::default();
        let target_version = match raw.target_version {
            None => defaults.target_version,
            Some(OneOrMany::One(v)) => vec![normalize_target_version(&v)?],
            Some(OneOrMany::Many(vs)) => vs
                .iter()
                .map(|v| normalize_target_version(v))
                .collect::<Result<Vec<_>, _>>()?,
        };
        let line_length = raw.line_length.unwrap_or(defaults.line_length);
        if line_length == 0 {
            return Err("black line-length must be greater than 0".to_string());
        }

        Ok(Self {
            line_length,
            target_version,
            preview: raw.preview,
            unstable: raw.unstable,
        })
    }
}

/// Accepts the short form (`py3`..`py13`) as well as black's own spelling (`py33`..`py313`).
pub fn normalize_target_version(value: &str) -> Result<String, String> {
    let lowered = value.trim().to_ascii_lowercase();
    let minor = lowered
        .strip_prefix("py")
        .and_then(|rest| rest.parse::<u32>().ok())
        .and_then(|n| match n {
            3..=13 => Some(n),
            33..=39 => Some(n - 30),
            310..=313 => Some(n - 300),
            _ => None,
        })
        .ok_or_else(|| format!("Unsupported target version: {value}"))?;
    Ok(format!("py3{minor}"))
}

/// Settings forwarded to flake8 (`[tool.flake8]`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", try_from = "RawFlake8Settings")]
pub struct Flake8Settings {
    /// McCabe complexity threshold, disabled when <= 0
    pub max_complexity: i64,
    /// Code prefixes ignored everywhere
    pub extend_ignore: Vec<String>,
    /// Code prefixes ignored per file basename
    pub per_file_ignores: IndexMap<String, Vec<String>>,
}

impl Default for Flake8Settings {
    fn default() -> Self {
        Self {
            max_complexity: -1,
            extend_ignore: Vec::new(),
            per_file_ignores: IndexMap::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPerFileIgnores {
    Lines(String),
    Table(IndexMap<String, OneOrMany>),
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawFlake8Settings {
    #[serde(default = "default_max_complexity", alias = "max_complexity")]
    max_complexity: i64,
    #[serde(default, alias = "extend_ignore")]
    extend_ignore: Option<OneOrMany>,
    #[serde(default, alias = "per_file_ignores")]
    per_file_ignores: Option<RawPerFileIgnores>,
}

fn default_max_complexity() -> i64 {
    -1
}

fn split_codes(codes: &str) -> Vec<String> {
    codes
        .split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

impl TryFrom<RawFlake8Settings> for Flake8Settings {
    type Error = String;

    fn try_from(raw: RawFlake8Settings) -> Result<Self, Self::Error> {
        let extend_ignore = match raw.extend_ignore {
            None => Vec::new(),
            Some(OneOrMany::One(codes)) => split_codes(&codes),
            Some(OneOrMany::Many(codes)) => codes.into_iter().map(|c| c.trim().to_string()).collect(),
        };

        let per_file_ignores = match raw.per_file_ignores {
            None => IndexMap::new(),
            Some(RawPerFileIgnores::Lines(text)) => parse_per_file_ignores(&text)?,
            Some(RawPerFileIgnores::Table(table)) => table
                .into_iter()
                .map(|(file, codes)| {
                    let codes = match codes {
                        OneOrMany::One(codes) => split_codes(&codes),
                        OneOrMany::Many(codes) => codes,
                    };
                    (file, codes)
                })
                .collect(),
        };

        Ok(Self {
            max_complexity: raw.max_complexity,
            extend_ignore,
            per_file_ignores,
        })
    }
}

/// Parses flake8's multi-line `file: CODE, CODE` syntax.
pub fn parse_per_file_ignores(text: &str) -> Result<IndexMap<String, Vec<String>>, String> {
    let mut map = IndexMap::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let Some((file, codes)) = line.split_once(':') else {
            return Err(format!("Invalid per-file-ignores entry: '{}'", line.trim()));
        };
        if file.trim().is_empty() || codes.contains(':') {
            return Err(format!("Invalid per-file-ignores entry: '{}'", line.trim()));
        }
        map.entry(file.trim().to_string())
            .or_insert_with(Vec::new)
            .extend(split_codes(codes));
    }
    Ok(map)
}

impl Config {
    /// Parse configuration from TOML text. `path` is only used in error messages.
    pub fn from_toml_str(content: &str, path: &str) -> Result<Self, ConfigError> {
        let parse_error = |e: toml::de::Error| ConfigError::ParseError {
            path: path.to_string(),
            message: e.to_string(),
        };
        let mut config: Self = toml::from_str(content).map_err(parse_error)?;
        let document: toml::Table = toml::from_str(content).map_err(parse_error)?;
        config.unknown_keys = collect_unknown_keys(&document);
        Ok(config)
    }

    /// Keys of the `[tool.colint]`, `[tool.isort]`, `[tool.black]` and `[tool.flake8]`
    /// sections that are ignored, as `(section, key)`.
    pub fn unknown_keys(&self) -> &[(String, String)] {
        &self.unknown_keys
    }

    /// Load a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display_path = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            source,
            path: display_path.clone(),
        })?;
        let config = Self::from_toml_str(&content, &display_path)?;
        for (section, key) in config.unknown_keys() {
            log::warn!("Unknown key '{key}' in [tool.{section}] of {display_path}");
        }
        log::debug!("Loaded config from {display_path}");
        Ok(config)
    }

    /// Load the explicit config file if given, otherwise search upward from `target`.
    ///
    /// Returns the configuration together with the file it was read from, if any.
    pub fn load(explicit: Option<&Path>, target: &Path) -> Result<(Self, Option<PathBuf>), ConfigError> {
        if let Some(path) = explicit {
            return Ok((Self::from_file(path)?, Some(path.to_path_buf())));
        }

        match discover_config_upward(target) {
            Some(path) => Ok((Self::from_file(&path)?, Some(path))),
            None => {
                log::debug!("No configuration file found, using defaults");
                Ok((Self::default(), None))
            }
        }
    }

    pub fn colint(&self) -> &ColintSettings {
        &self.tool.colint
    }

    pub fn isort(&self) -> &IsortSettings {
        &self.tool.isort
    }

    pub fn black(&self) -> &BlackSettings {
        &self.tool.black
    }

    pub fn flake8(&self) -> &Flake8Settings {
        &self.tool.flake8
    }
}

fn collect_unknown_keys(document: &toml::Table) -> Vec<(String, String)> {
    let Some(tool) = document.get("tool").and_then(toml::Value::as_table) else {
        return Vec::new();
    };
    let mut unknown = Vec::new();
    for section in CHECKED_SECTIONS {
        let Some(table) = tool.get(*section).and_then(toml::Value::as_table) else {
            continue;
        };
        for key in table.keys() {
            if !known_keys(section).contains(&key.as_str()) {
                unknown.push((section.to_string(), key.clone()));
            }
        }
    }
    unknown
}

/// Discover a configuration file by traversing up the directory tree from `target`.
///
/// The search stops at the first directory containing `.git`.
pub fn discover_config_upward(target: &Path) -> Option<PathBuf> {
    let start = match target.parent() {
        // a bare file name has an empty parent
        Some(parent) if target.is_file() && parent.as_os_str().is_empty() => Path::new("."),
        Some(parent) if target.is_file() => parent,
        _ => target,
    };
    let mut current_dir = match start.canonicalize() {
        Ok(dir) => dir,
        Err(e) => {
            log::debug!("Failed to resolve {}: {e}", start.display());
            return None;
        }
    };

    for _ in 0..MAX_DEPTH {
        log::debug!("Searching for config in: {}", current_dir.display());

        for config_name in CONFIG_FILES {
            let config_path = current_dir.join(config_name);
            if !config_path.is_file() {
                continue;
            }
            // pyproject.toml only counts when it has a colint section
            if *config_name == "pyproject.toml" {
                match fs::read_to_string(&config_path) {
                    Ok(content) if content.contains("[tool.colint") => return Some(config_path),
                    _ => {
                        log::debug!("Found pyproject.toml but no [tool.colint] section");
                        continue;
                    }
                }
            }
            log::debug!("Found config file: {}", config_path.display());
            return Some(config_path);
        }

        if current_dir.join(".git").exists() {
            log::debug!("Stopping at .git directory");
            return None;
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return None,
        }
    }

    None
}
