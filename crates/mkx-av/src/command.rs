//! Builder for executing external tool commands.
//!
//! Mux and edit operations are one-shot authoring runs with no cancellation
//! semantics, so commands run without a timeout unless one is requested
//! (probes opt in to a short one).

use std::future::Future;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Command;

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

/// A builder for constructing and executing external tool invocations.
///
/// # Example
///
/// ```no_run
/// use mkx_av::ToolCommand;
/// use std::path::PathBuf;
///
/// # fn example() -> mkx_core::Result<()> {
/// let output = ToolCommand::new(PathBuf::from("ffprobe"))
///     .arg("-v").arg("quiet")
///     .arg("-print_format").arg("json")
///     .arg("-show_format")
///     .arg("-show_streams")
///     .arg("/path/to/video.mkv")
///     .execute_blocking()?;
/// println!("{}", output.stdout);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
            timeout: None,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Set a maximum execution time. Commands run unbounded by default.
    pub fn timeout(&mut self, d: Duration) -> &mut Self {
        self.timeout = Some(d);
        self
    }

    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Execute the command, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// - Returns [`mkx_core::Error::Tool`] if spawning the process fails.
    /// - Returns [`mkx_core::Error::Tool`] if the process exits with a
    ///   non-zero status (message includes trimmed stderr).
    /// - Returns [`mkx_core::Error::Tool`] if a configured timeout elapses.
    pub async fn execute(&self) -> mkx_core::Result<ToolOutput> {
        let program_name = self.program_name();
        tracing::debug!(tool = %program_name, args = ?self.args, "executing");

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());

        let child = cmd.spawn().map_err(|e| mkx_core::Error::Tool {
            tool: program_name.clone(),
            message: format!("failed to spawn: {e}"),
        })?;

        let waited = child.wait_with_output();
        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, waited).await {
                Ok(result) => result,
                Err(_elapsed) => {
                    return Err(mkx_core::Error::Tool {
                        tool: program_name,
                        message: format!("timed out after {limit:?}"),
                    });
                }
            },
            None => waited.await,
        };

        let output = output.map_err(|e| mkx_core::Error::Tool {
            tool: program_name.clone(),
            message: format!("I/O error waiting for process: {e}"),
        })?;

        let tool_output = ToolOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !output.status.success() {
            return Err(mkx_core::Error::Tool {
                tool: program_name,
                message: format!(
                    "exited with status {}: {}",
                    output.status,
                    tool_output.stderr.trim()
                ),
            });
        }

        Ok(tool_output)
    }

    /// Execute the command with inherited stdio, so the tool's own progress
    /// output (e.g. mkvmerge's progress meter) reaches the terminal.
    ///
    /// # Errors
    ///
    /// Returns [`mkx_core::Error::Tool`] if the process cannot be spawned or
    /// exits with a non-zero status.
    pub async fn execute_foreground(&self) -> mkx_core::Result<ExitStatus> {
        let program_name = self.program_name();
        tracing::info!(tool = %program_name, "running in foreground");

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.stdout(std::process::Stdio::inherit());
        cmd.stderr(std::process::Stdio::inherit());

        let mut child = cmd.spawn().map_err(|e| mkx_core::Error::Tool {
            tool: program_name.clone(),
            message: format!("failed to spawn: {e}"),
        })?;

        let status = child.wait().await.map_err(|e| mkx_core::Error::Tool {
            tool: program_name.clone(),
            message: format!("I/O error waiting for process: {e}"),
        })?;

        if !status.success() {
            return Err(mkx_core::Error::Tool {
                tool: program_name,
                message: format!("exited with status {status}"),
            });
        }

        Ok(status)
    }

    /// Synchronous wrapper around [`ToolCommand::execute`].
    pub fn execute_blocking(&self) -> mkx_core::Result<ToolOutput> {
        block_on("execute", self.execute())
    }

    /// Synchronous wrapper around [`ToolCommand::execute_foreground`].
    pub fn execute_foreground_blocking(&self) -> mkx_core::Result<ExitStatus> {
        block_on("execute_foreground", self.execute_foreground())
    }
}

/// Drive a future to completion from a synchronous context.
///
/// Inside an existing tokio runtime this uses `block_in_place`; otherwise a
/// temporary runtime is created for the duration of the call.
pub fn block_on<T>(
    what: &str,
    fut: impl Future<Output = mkx_core::Result<T>>,
) -> mkx_core::Result<T> {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => tokio::task::block_in_place(|| handle.block_on(fut)),
        Err(_) => {
            let rt = tokio::runtime::Runtime::new().map_err(|e| mkx_core::Error::Tool {
                tool: what.to_string(),
                message: format!("failed to create tokio runtime: {e}"),
            })?;
            rt.block_on(fut)
        }
    }
}
