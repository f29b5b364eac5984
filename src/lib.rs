//! colint runs isort, black and flake8 over a Python project, together with
//! newline and notebook hygiene fixes, and reports the results with a single exit code.

pub mod cli_types;
pub mod config;
pub mod dispatch;
pub mod exit_codes;
pub mod file_processor;
pub mod notebook;
pub mod operations;
pub mod output;
pub mod report;
pub mod tools;
pub mod utils;

pub use crate::cli_types::{CommandName, Mode};
pub use crate::config::Config;
pub use crate::report::{Outcome, OutcomeStatus, RunReport};
