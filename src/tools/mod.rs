//! External tool invocation.
//!
//! colint delegates import sorting, formatting and style checking to
//! `isort`, `black` and `flake8`. Every tool is driven through stdin/stdout:
//! the content to process is written to the tool and its output is read back.
//!
//! # Configuration
//!
//! The built-in invocations are derived from `[tool.isort]`, `[tool.black]`
//! and `[tool.flake8]`. A whole invocation can be replaced per tool:
//!
//! ```toml
//! [tool.colint]
//! timeout = 30000   # ms per invocation, 0 (default) waits indefinitely
//!
//! [tool.colint.tools.black]
//! command = ["python", "-m", "black", "--quiet", "--stdin-filename", "{filename}", "-"]
//! ```
//!
//! `{filename}` is replaced by the path of the file being processed.

pub mod config;
pub mod executor;
pub mod registry;

pub use config::ToolDefinition;
pub use executor::{ExecutorError, ToolExecutor, ToolOutput};
pub use registry::ToolRegistry;
