//! Tool execution engine for running external formatters and linters.
//!
//! Content is handed to the tool on stdin and the tool's stdout/stderr are
//! captured. Missing binaries are remembered so a tool that is not installed
//! is only probed once per run.

use super::config::ToolDefinition;
use std::collections::HashSet;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

/// Result of executing a tool.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Standard output from the tool.
    pub stdout: String,
    /// Standard error from the tool.
    pub stderr: String,
    /// Exit code (0 typically means success).
    pub exit_code: i32,
    /// Whether the tool executed successfully (exit code 0).
    pub success: bool,
}

/// Error during tool execution.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExecutorError {
    /// Tool binary not found in PATH.
    #[error("Tool '{tool}' not found in PATH")]
    ToolNotFound { tool: String },
    /// Tool execution failed.
    #[error("Tool '{tool}' failed: {message}")]
    ExecutionFailed { tool: String, message: String },
    /// Tool execution timed out.
    #[error("Tool '{tool}' timed out after {timeout_ms}ms")]
    Timeout { tool: String, timeout_ms: u64 },
    /// I/O error during execution.
    #[error("I/O error: {message}")]
    IoError { message: String },
}

/// Executor for running external tools.
pub struct ToolExecutor {
    /// Binaries that failed to spawn because they do not exist.
    missing_tools: Mutex<HashSet<String>>,
    /// Timeout in milliseconds, 0 waits indefinitely.
    timeout_ms: u64,
}

impl ToolExecutor {
    /// Create a new executor with the given timeout (0 disables the timeout).
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            missing_tools: Mutex::new(HashSet::new()),
            timeout_ms,
        }
    }

    fn is_known_missing(&self, tool_name: &str) -> bool {
        self.missing_tools
            .lock()
            .map(|missing| missing.contains(tool_name))
            .unwrap_or(false)
    }

    fn mark_missing(&self, tool_name: &str) {
        if let Ok(mut missing) = self.missing_tools.lock() {
            missing.insert(tool_name.to_string());
        }
    }

    /// Execute a tool, feeding `input` on stdin.
    ///
    /// `filename` is substituted for `{filename}` in the tool arguments. A
    /// non-zero exit status is not an error here; see [`ToolExecutor::run`].
    pub fn execute(&self, tool_def: &ToolDefinition, input: &str, filename: &Path) -> Result<ToolOutput, ExecutorError> {
        let Some(tool_name) = tool_def.program() else {
            return Err(ExecutorError::ExecutionFailed {
                tool: "unknown".to_string(),
                message: "Empty command".to_string(),
            });
        };

        if self.is_known_missing(tool_name) {
            return Err(ExecutorError::ToolNotFound {
                tool: tool_name.to_string(),
            });
        }

        let args = tool_def.args_for(filename);
        log::debug!("Running {tool_name} {}", args.join(" "));

        let mut cmd = Command::new(tool_name);
        cmd.args(&args);
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.mark_missing(tool_name);
                return Err(ExecutorError::ToolNotFound {
                    tool: tool_name.to_string(),
                });
            }
            Err(e) => {
                return Err(ExecutorError::IoError {
                    message: format!("Failed to spawn '{tool_name}': {e}"),
                });
            }
        };

        let mut stdout_handle = child
            .stdout
            .take()
            .map(|stdout| thread::spawn(move || read_pipe_to_string(stdout)));
        let mut stderr_handle = child
            .stderr
            .take()
            .map(|stderr| thread::spawn(move || read_pipe_to_string(stderr)));

        // The writer owns stdin and drops it when done so the tool sees EOF.
        let mut stdin_handle = child.stdin.take().map(|mut stdin| {
            let input = input.to_owned();
            thread::spawn(move || match stdin.write_all(input.as_bytes()) {
                // The tool exited without consuming its input; its exit status tells the rest.
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
                result => result,
            })
        });

        let timeout = Duration::from_millis(self.timeout_ms);
        let status = if timeout.is_zero() {
            child.wait().map_err(|e| ExecutorError::IoError {
                message: format!("Failed to wait for '{tool_name}': {e}"),
            })?
        } else {
            let start = Instant::now();
            loop {
                if let Some(status) = child.try_wait().map_err(|e| ExecutorError::IoError {
                    message: format!("Failed to poll '{tool_name}': {e}"),
                })? {
                    break status;
                }
                if start.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    let _ = join_writer(stdin_handle.take());
                    let _ = join_reader(stdout_handle.take());
                    let _ = join_reader(stderr_handle.take());
                    return Err(ExecutorError::Timeout {
                        tool: tool_name.to_string(),
                        timeout_ms: self.timeout_ms,
                    });
                }
                thread::sleep(Duration::from_millis(10));
            }
        };

        join_writer(stdin_handle.take()).map_err(|e| ExecutorError::IoError { message: e })?;
        let stdout = join_reader(stdout_handle.take()).map_err(|e| ExecutorError::IoError { message: e })?;
        let stderr = join_reader(stderr_handle.take()).map_err(|e| ExecutorError::IoError { message: e })?;
        let exit_code = status.code().unwrap_or(-1);

        Ok(ToolOutput {
            stdout,
            stderr,
            exit_code,
            success: status.success(),
        })
    }

    /// Execute a rewriting tool and return its stdout, failing on a non-zero exit.
    pub fn run(&self, tool_def: &ToolDefinition, input: &str, filename: &Path) -> Result<String, ExecutorError> {
        let output = self.execute(tool_def, input, filename)?;

        if output.success {
            Ok(output.stdout)
        } else {
            let exit_code = output.exit_code;
            let detail = if output.stderr.trim().is_empty() {
                output.stdout.trim().to_string()
            } else {
                output.stderr.trim().to_string()
            };
            Err(ExecutorError::ExecutionFailed {
                tool: tool_def.program().unwrap_or_default().to_string(),
                message: format!("Exit code {exit_code}: {detail}"),
            })
        }
    }
}

fn read_pipe_to_string<R: Read>(mut pipe: R) -> std::io::Result<String> {
    let mut buf = Vec::new();
    pipe.read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).to_string())
}

fn join_reader(handle: Option<thread::JoinHandle<std::io::Result<String>>>) -> Result<String, String> {
    match handle {
        Some(handle) => match handle.join() {
            Ok(res) => res.map_err(|e| format!("Failed to read output: {e}")),
            Err(_) => Err("Output reader thread panicked".to_string()),
        },
        None => Ok(String::new()),
    }
}

fn join_writer(handle: Option<thread::JoinHandle<std::io::Result<()>>>) -> Result<(), String> {
    match handle {
        Some(handle) => match handle.join() {
            Ok(res) => res.map_err(|e| format!("Failed to write to stdin: {e}")),
            Err(_) => Err("Input writer thread panicked".to_string()),
        },
        None => Ok(()),
    }
}

impl Default for ToolExecutor {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executor_creation() {
        let executor = ToolExecutor::new(10_000);
        assert_eq!(executor.timeout_ms, 10_000);
        assert_eq!(ToolExecutor::default().timeout_ms, 0);
    }

    #[test]
    fn test_tool_not_found_is_remembered() {
        let executor = ToolExecutor::default();
        let tool_def = ToolDefinition::new(["nonexistent-tool-xyz123"]);

        let result = executor.execute(&tool_def, "test", Path::new("a.py"));
        assert!(matches!(result, Err(ExecutorError::ToolNotFound { .. })));
        assert!(executor.is_known_missing("nonexistent-tool-xyz123"));

        let again = executor.execute(&tool_def, "test", Path::new("a.py"));
        assert!(matches!(again, Err(ExecutorError::ToolNotFound { .. })));
    }

    #[test]
    fn test_empty_command() {
        let executor = ToolExecutor::default();
        let result = executor.execute(&ToolDefinition::default(), "test", Path::new("a.py"));
        assert!(matches!(result, Err(ExecutorError::ExecutionFailed { .. })));
    }

    #[test]
    #[cfg(unix)]
    fn test_execute_cat() {
        let executor = ToolExecutor::default();
        let tool_def = ToolDefinition::new(["cat"]);

        let output = executor
            .execute(&tool_def, "hello world", Path::new("a.py"))
            .expect("cat should succeed");
        assert!(output.success);
        assert_eq!(output.stdout, "hello world");
    }

    #[test]
    #[cfg(unix)]
    fn test_filename_reaches_tool() {
        let executor = ToolExecutor::default();
        let tool_def = ToolDefinition::new(["sh", "-c", "echo \"$0\"", "{filename}"]);

        let stdout = executor
            .run(&tool_def, "", Path::new("dir/file.py"))
            .expect("sh should succeed");
        assert_eq!(stdout.trim(), "dir/file.py");
    }

    #[test]
    #[cfg(unix)]
    fn test_run_reports_non_zero_exit() {
        let executor = ToolExecutor::default();
        let tool_def = ToolDefinition::new(["sh", "-c", "echo 'cannot parse' >&2; exit 123"]);

        let err = executor
            .run(&tool_def, "x = (", Path::new("a.py"))
            .expect_err("non-zero exit must fail");
        match err {
            ExecutorError::ExecutionFailed { tool, message } => {
                assert_eq!(tool, "sh");
                assert!(message.contains("123"));
                assert!(message.contains("cannot parse"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    #[cfg(unix)]
    fn test_tool_ignoring_stdin() {
        let executor = ToolExecutor::default();
        let tool_def = ToolDefinition::new(["true"]);
        let big_input = "x = 1\n".repeat(50_000);

        let output = executor
            .execute(&tool_def, &big_input, Path::new("a.py"))
            .expect("a tool that ignores stdin is not an error");
        assert!(output.success);
        assert!(output.stdout.is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn test_timeout() {
        let executor = ToolExecutor::new(5);
        let tool_def = ToolDefinition::new(["sleep", "2"]);

        let result = executor.execute(&tool_def, "", Path::new("a.py"));
        assert!(matches!(result, Err(ExecutorError::Timeout { .. })));
    }

    #[test]
    #[cfg(unix)]
    fn test_timeout_with_unread_input() {
        // more input than a pipe buffer holds, never read by the tool
        let executor = ToolExecutor::new(100);
        let tool_def = ToolDefinition::new(["sleep", "3"]);
        let big_input = "x = 1\n".repeat(200_000);

        let start = Instant::now();
        let result = executor.execute(&tool_def, &big_input, Path::new("a.py"));
        assert!(matches!(result, Err(ExecutorError::Timeout { timeout_ms: 100, .. })));
        assert!(start.elapsed() < Duration::from_secs(2));
    }
}
