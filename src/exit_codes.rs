/// Exit codes for colint
///
/// These exit codes allow users and CI/CD systems to distinguish between
/// different types of failures.

/// Success - Every file was clean or has been fixed
pub const SUCCESS: i32 = 0;

/// Violations found - A check reported at least one file that does not comply
pub const VIOLATIONS_FOUND: i32 = 1;

/// Tool error - Configuration error, file access error, or an external tool failure
pub const TOOL_ERROR: i32 = 2;

/// Helper functions for consistent exit behavior
pub mod exit {
    use super::TOOL_ERROR;

    /// Exit with tool error code (2)
    pub fn tool_error() -> ! {
        std::process::exit(TOOL_ERROR);
    }

    /// Exit with an arbitrary code computed from a run report
    pub fn with_code(code: i32) -> ! {
        std::process::exit(code);
    }
}
