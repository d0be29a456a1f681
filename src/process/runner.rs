//! Spawning a single external process.

use crate::process::CommandLine;
use crate::{InstallError, Outcome, RunnerOptions, Sink};
use futures::future::{BoxFuture, FutureExt};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

/// How a single process invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The process exited with the given code.
    Exited {
        /// Exit code reported by the OS.
        code: i32,
    },
    /// The process ended without an exit code (killed by a signal).
    Signaled,
    /// The executable could not be located.
    NotFound,
    /// The executable was found but could not be started.
    SpawnFailed {
        /// OS error description.
        message: String,
    },
    /// The process was killed after exceeding the runner's timeout.
    TimedOut {
        /// The timeout that was exceeded.
        after: Duration,
    },
}

impl ProcessOutcome {
    /// A successful exit (code zero).
    pub const SUCCESS: Self = Self::Exited { code: 0 };

    /// Whether the process exited with code zero.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Exited { code: 0 })
    }

    /// Convert into an [`Outcome`], attributing failures to `program`.
    pub fn into_outcome(self, program: &str) -> Outcome {
        let program = program.to_string();
        match self {
            Self::Exited { code: 0 } => Ok(()),
            Self::Exited { code } => Err(InstallError::NonZeroExit { program, code }),
            Self::Signaled => Err(InstallError::Terminated { program }),
            Self::NotFound => Err(InstallError::ToolUnavailable { program }),
            Self::SpawnFailed { message } => Err(InstallError::SpawnFailed { program, message }),
            Self::TimedOut { after } => Err(InstallError::Timeout { program, after }),
        }
    }
}

/// Capability to run one external program to completion.
///
/// Implementations stream the program's output into `sink` as it is
/// produced and resolve exactly once. A missing program is reported as
/// [`ProcessOutcome::NotFound`], never as a panic.
pub trait ProcessRunner: Send + Sync {
    /// Run `command` in `cwd`, forwarding stdout and stderr lines to `sink`.
    fn run<'a>(
        &'a self,
        command: &'a CommandLine,
        cwd: &'a Path,
        sink: &'a dyn Sink,
    ) -> BoxFuture<'a, ProcessOutcome>;
}

/// [`ProcessRunner`] backed by real OS processes.
///
/// # Example
///
/// ```rust,no_run
/// use install_pipeline::{CommandLine, ConsoleSink, ProcessRunner, SystemRunner};
/// use std::path::Path;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let runner = SystemRunner::default();
///     let cmd = CommandLine::new("git", ["--version"]);
///     let outcome = runner.run(&cmd, Path::new("."), &ConsoleSink).await;
///     println!("{:?}", outcome);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    options: RunnerOptions,
}

impl SystemRunner {
    /// Create a runner with the given options.
    pub fn new(options: RunnerOptions) -> Self {
        Self { options }
    }

    /// The options this runner was created with.
    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    async fn run_inner(&self, command: &CommandLine, cwd: &Path, sink: &dyn Sink) -> ProcessOutcome {
        let program = match resolve_program(&command.program, cwd) {
            Some(path) => path,
            None => return ProcessOutcome::NotFound,
        };

        // The program resolved, so a bad cwd is a spawn failure, not a missing tool.
        match tokio::fs::metadata(cwd).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return ProcessOutcome::SpawnFailed {
                    message: format!("working directory {} is not a directory", cwd.display()),
                };
            }
            Err(e) => {
                return ProcessOutcome::SpawnFailed {
                    message: format!("working directory {}: {}", cwd.display(), e),
                };
            }
        }

        let mut cmd = Command::new(&program);
        cmd.args(&command.args)
            .current_dir(cwd)
            .envs(self.options.env.iter().cloned())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                return ProcessOutcome::SpawnFailed {
                    message: e.to_string(),
                };
            }
        };

        let stdout = child.stdout.take().map(BufReader::new);
        let stderr = child.stderr.take().map(BufReader::new);

        let finished = async {
            forward_output(stdout, stderr, sink).await;
            child.wait().await
        };

        let status = match self.options.timeout {
            Some(limit) => match tokio::time::timeout(limit, finished).await {
                Ok(status) => status,
                Err(_) => {
                    tracing::warn!(program = %command.program, timeout = ?limit, "Killing process after timeout");
                    let _ = child.kill().await;
                    return ProcessOutcome::TimedOut { after: limit };
                }
            },
            None => finished.await,
        };

        match status {
            Ok(status) => match status.code() {
                Some(code) => ProcessOutcome::Exited { code },
                None => ProcessOutcome::Signaled,
            },
            Err(e) => ProcessOutcome::SpawnFailed {
                message: e.to_string(),
            },
        }
    }
}

impl ProcessRunner for SystemRunner {
    fn run<'a>(
        &'a self,
        command: &'a CommandLine,
        cwd: &'a Path,
        sink: &'a dyn Sink,
    ) -> BoxFuture<'a, ProcessOutcome> {
        self.run_inner(command, cwd, sink).boxed()
    }
}

/// Locate `program` on `PATH`, or relative to `cwd` when it contains a path
/// separator.
fn resolve_program(program: &str, cwd: &Path) -> Option<PathBuf> {
    which::which_in(program, std::env::var_os("PATH"), cwd).ok()
}

/// Result of one read from either of the child's output streams.
enum OutputLine {
    Stdout(std::io::Result<usize>),
    Stderr(std::io::Result<usize>),
}

/// Forward both output streams line by line until both reach EOF.
///
/// Lines are read as raw bytes and decoded lossily. A stream is only
/// dropped at EOF or on a read error, never on undecodable bytes.
async fn forward_output<O, E>(
    mut stdout: Option<BufReader<O>>,
    mut stderr: Option<BufReader<E>>,
    sink: &dyn Sink,
) where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    // Kept across iterations: a read cancelled by select! leaves its partial
    // line here and the next read_until appends to it.
    let mut out_buf = Vec::new();
    let mut err_buf = Vec::new();

    loop {
        let read = match (stdout.as_mut(), stderr.as_mut()) {
            (None, None) => break,
            (Some(out), None) => OutputLine::Stdout(out.read_until(b'\n', &mut out_buf).await),
            (None, Some(err)) => OutputLine::Stderr(err.read_until(b'\n', &mut err_buf).await),
            (Some(out), Some(err)) => tokio::select! {
                n = out.read_until(b'\n', &mut out_buf) => OutputLine::Stdout(n),
                n = err.read_until(b'\n', &mut err_buf) => OutputLine::Stderr(n),
            },
        };

        match read {
            OutputLine::Stdout(Ok(0)) => stdout = None,
            OutputLine::Stderr(Ok(0)) => stderr = None,
            OutputLine::Stdout(Ok(_)) => sink.stdout(&take_line(&mut out_buf)),
            OutputLine::Stderr(Ok(_)) => sink.stderr(&take_line(&mut err_buf)),
            OutputLine::Stdout(Err(e)) => {
                tracing::warn!("Error reading stdout: {}", e);
                stdout = None;
            }
            OutputLine::Stderr(Err(e)) => {
                tracing::warn!("Error reading stderr: {}", e);
                stderr = None;
            }
        }
    }
}

/// Decode a buffered line, strip its terminator and reset the buffer.
fn take_line(buf: &mut Vec<u8>) -> String {
    let mut end = buf.len();
    if end > 0 && buf[end - 1] == b'\n' {
        end -= 1;
        if end > 0 && buf[end - 1] == b'\r' {
            end -= 1;
        }
    }
    let line = String::from_utf8_lossy(&buf[..end]).into_owned();
    buf.clear();
    line
}
