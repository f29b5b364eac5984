use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Execution mode: mutate files or only report what would change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    #[default]
    Apply,
    Check,
}

impl Mode {
    pub fn from_check_flag(check: bool) -> Self {
        if check { Mode::Check } else { Mode::Apply }
    }

    pub fn is_check(self) -> bool {
        self == Mode::Check
    }
}

/// User-facing commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandName {
    SortLibraries,
    CodeFormat,
    GrammarCheck,
    NewlineFix,
    CleanJupyter,
    Lint,
    Docformat,
}

impl CommandName {
    pub const ALL: [CommandName; 7] = [
        CommandName::SortLibraries,
        CommandName::CodeFormat,
        CommandName::GrammarCheck,
        CommandName::NewlineFix,
        CommandName::CleanJupyter,
        CommandName::Lint,
        CommandName::Docformat,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CommandName::SortLibraries => "sort-libraries",
            CommandName::CodeFormat => "code-format",
            CommandName::GrammarCheck => "grammar-check",
            CommandName::NewlineFix => "newline-fix",
            CommandName::CleanJupyter => "clean-jupyter",
            CommandName::Lint => "lint",
            CommandName::Docformat => "docformat",
        }
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown command '{name}'. Expected one of: {}", CommandName::ALL.map(CommandName::as_str).join(", "))]
pub struct UnknownCommandError {
    pub name: String,
}

impl FromStr for CommandName {
    type Err = UnknownCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandName::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCommandError { name: s.to_string() })
    }
}

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormatArg {
    #[default]
    Text,
    Json,
}
