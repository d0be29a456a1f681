//! Lazy command descriptors.

use crate::process::ProcessRunner;
use crate::{InstallError, Outcome, Sink};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A program and its arguments, with no side effects attached.
///
/// # Example
///
/// ```rust
/// use install_pipeline::CommandLine;
///
/// let cmd = CommandLine::new("curl", ["-fL", "-o", "a.zip", "http://x/f.zip"]);
/// assert_eq!(cmd.display(), "curl -fL -o a.zip http://x/f.zip");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandLine {
    /// The program to execute (e.g., "git", "wget").
    pub program: String,

    /// Arguments passed to the program.
    pub args: Vec<String>,
}

impl CommandLine {
    /// Build a command line from a program and arguments.
    pub fn new<P, I, S>(program: P, args: I) -> Self
    where
        P: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Human-readable form for logs. Arguments containing spaces are
    /// quoted.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(|part| {
                if part.contains(' ') {
                    format!("\"{}\"", part)
                } else {
                    part.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Cheap checks that can be done without touching the system.
    pub fn validate(&self) -> Result<(), InstallError> {
        if self.program.trim().is_empty() {
            return Err(InstallError::InvalidCommand {
                reason: "program name is empty".to_string(),
            });
        }
        if self.program.contains('\0') || self.args.iter().any(|a| a.contains('\0')) {
            return Err(InstallError::InvalidCommand {
                reason: format!("`{}` contains a NUL byte", self.program),
            });
        }
        Ok(())
    }
}

/// A [`CommandLine`] bound to an execution context.
///
/// Holds the working directory, the runner and the sink of the context it
/// was created from. Creating a job performs no I/O; only [`Job::run`]
/// spawns the process. Fallback groups build all their candidates up front
/// and run only the ones they select.
#[derive(Clone)]
pub struct Job {
    command: CommandLine,
    cwd: PathBuf,
    runner: Arc<dyn ProcessRunner>,
    sink: Arc<dyn Sink>,
    echo: bool,
}

impl Job {
    pub(crate) fn new(
        command: CommandLine,
        cwd: PathBuf,
        runner: Arc<dyn ProcessRunner>,
        sink: Arc<dyn Sink>,
        echo: bool,
    ) -> Self {
        Self {
            command,
            cwd,
            runner,
            sink,
            echo,
        }
    }

    /// The command this job will run.
    pub fn command(&self) -> &CommandLine {
        &self.command
    }

    /// Working directory the process will start in.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Spawn the process and wait for it.
    ///
    /// When the context echoes commands, `$ <command line>` is written to
    /// the standard channel first. On failure the reason is written to the
    /// error channel before the error is returned.
    pub async fn run(&self) -> Outcome {
        if let Err(e) = self.command.validate() {
            self.sink.stderr(&e.to_string());
            return Err(e);
        }

        let line = self.command.display();
        tracing::debug!(command = %line, cwd = %self.cwd.display(), "Running command");
        if self.echo {
            self.sink.stdout(&format!("$ {}", line));
        }

        let outcome = self
            .runner
            .run(&self.command, &self.cwd, self.sink.as_ref())
            .await;

        tracing::debug!(program = %self.command.program, ?outcome, "Command finished");

        let result = outcome.into_outcome(&self.command.program);
        if let Err(e) = &result {
            self.sink.stderr(&e.to_string());
        }
        result
    }
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("command", &self.command)
            .field("cwd", &self.cwd)
            .finish_non_exhaustive()
    }
}
