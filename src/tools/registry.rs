//! Tool registry with the invocations of the supported external tools.
//!
//! Built-in definitions are derived from the `[tool.isort]`, `[tool.black]`
//! and `[tool.flake8]` settings. Users can replace a definition entirely with
//! `[tool.colint.tools.<id>]`.

use super::config::{FILENAME_PLACEHOLDER, ToolDefinition};
use crate::config::Config;
use std::collections::HashMap;

/// Import sorter.
pub const ISORT: &str = "isort";
/// Code formatter.
pub const BLACK: &str = "black";
/// Style checker.
pub const FLAKE8: &str = "flake8";

/// Format string handed to flake8 so diagnostics can be parsed back.
pub const FLAKE8_FORMAT: &str = "%(row)d:%(col)d:%(code)s:%(text)s";

/// Registry of tool definitions.
pub struct ToolRegistry {
    /// Built-in definitions derived from the configuration
    builtin: HashMap<&'static str, ToolDefinition>,
    /// User-defined tools (override built-ins)
    user_tools: HashMap<String, ToolDefinition>,
}

impl ToolRegistry {
    /// Create a registry from the loaded configuration.
    pub fn new(config: &Config) -> Self {
        let mut builtin = HashMap::new();
        builtin.insert(ISORT, isort_definition(config));
        builtin.insert(BLACK, black_definition(config));
        builtin.insert(FLAKE8, flake8_definition(config));

        Self {
            builtin,
            user_tools: config.colint().tools.clone(),
        }
    }

    /// Get a tool definition by ID.
    ///
    /// Checks user tools first, then falls back to built-in tools.
    pub fn get(&self, tool_id: &str) -> Option<&ToolDefinition> {
        self.user_tools.get(tool_id).or_else(|| self.builtin.get(tool_id))
    }

    /// Whether the definition for `tool_id` comes from the user configuration.
    pub fn is_overridden(&self, tool_id: &str) -> bool {
        self.user_tools.contains_key(tool_id)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

fn isort_definition(config: &Config) -> ToolDefinition {
    let mut command = vec![ISORT.to_string(), "--quiet".to_string()];
    if let Some(profile) = &config.isort().profile {
        command.push("--profile".to_string());
        command.push(profile.clone());
    }
    command.push("--filename".to_string());
    command.push(FILENAME_PLACEHOLDER.to_string());
    command.push("-".to_string());
    ToolDefinition { command }
}

fn black_definition(config: &Config) -> ToolDefinition {
    let black = config.black();
    let mut command = vec![
        BLACK.to_string(),
        "--quiet".to_string(),
        "--line-length".to_string(),
        black.line_length.to_string(),
    ];
    for version in &black.target_version {
        command.push("--target-version".to_string());
        command.push(version.clone());
    }
    if black.preview {
        command.push("--preview".to_string());
    }
    if black.unstable {
        command.push("--unstable".to_string());
    }
    command.push("--stdin-filename".to_string());
    command.push(FILENAME_PLACEHOLDER.to_string());
    command.push("-".to_string());
    ToolDefinition { command }
}

fn flake8_definition(config: &Config) -> ToolDefinition {
    let mut command = vec![FLAKE8.to_string(), format!("--format={FLAKE8_FORMAT}")];
    let max_complexity = config.flake8().max_complexity;
    if max_complexity > 0 {
        command.push(format!("--max-complexity={max_complexity}"));
    }
    command.push("--stdin-display-name".to_string());
    command.push(FILENAME_PLACEHOLDER.to_string());
    command.push("-".to_string());
    ToolDefinition { command }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(toml: &str) -> Config {
        Config::from_toml_str(toml, "test.toml").unwrap()
    }

    #[test]
    fn test_builtin_tools() {
        let registry = ToolRegistry::default();
        assert!([ISORT, BLACK, FLAKE8].iter().all(|id| registry.get(id).is_some()));

        let isort = registry.get(ISORT).unwrap();
        assert_eq!(isort.command, vec!["isort", "--quiet", "--filename", "{filename}", "-"]);

        let black = registry.get(BLACK).unwrap();
        assert_eq!(
            black.command,
            vec![
                "black",
                "--quiet",
                "--line-length",
                "88",
                "--target-version",
                "py310",
                "--stdin-filename",
                "{filename}",
                "-"
            ]
        );

        let flake8 = registry.get(FLAKE8).unwrap();
        assert_eq!(
            flake8.command,
            vec![
                "flake8",
                "--format=%(row)d:%(col)d:%(code)s:%(text)s",
                "--stdin-display-name",
                "{filename}",
                "-"
            ]
        );
    }

    #[test]
    fn test_settings_reach_command_line() {
        let config = config_from(
            r#"
[tool.isort]
profile = "black"

[tool.black]
line-length = 100
target-version = ["py311", "py312"]
preview = true
unstable = true

[tool.flake8]
max-complexity = 12
"#,
        );
        let registry = ToolRegistry::new(&config);

        let isort = &registry.get(ISORT).unwrap().command;
        assert!(isort.windows(2).any(|w| *w == ["--profile", "black"]));

        let black = &registry.get(BLACK).unwrap().command;
        assert!(black.windows(2).any(|w| *w == ["--line-length", "100"]));
        assert!(black.windows(2).any(|w| *w == ["--target-version", "py311"]));
        assert!(black.windows(2).any(|w| *w == ["--target-version", "py312"]));
        assert!(black.contains(&"--preview".to_string()));
        assert!(black.contains(&"--unstable".to_string()));

        let flake8 = &registry.get(FLAKE8).unwrap().command;
        assert!(flake8.contains(&"--max-complexity=12".to_string()));
    }

    #[test]
    fn test_user_override() {
        let config = config_from(
            r#"
[tool.colint.tools.black]
command = ["cat"]

[tool.colint.tools.my-tool]
command = ["my-tool", "-"]
"#,
        );
        let registry = ToolRegistry::new(&config);

        assert!(registry.is_overridden(BLACK));
        assert!(!registry.is_overridden(ISORT));
        assert_eq!(registry.get(BLACK).unwrap().command, vec!["cat"]);
        assert!(registry.get("my-tool").is_some());
        assert!(registry.get("unknown").is_none());
    }
}
