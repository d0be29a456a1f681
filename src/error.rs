//! Error types for installer steps.
//!
//! Every failure a step can hit is a value of [`InstallError`]. Combinators
//! inspect, propagate, absorb or race these away; nothing in a pipeline
//! raises. The one exception is an exhaustive platform dispatch that has no
//! branch for the current platform, which is a defect in the recipe and
//! panics.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// The result every installer resolves to.
pub type Outcome = Result<(), InstallError>;

/// Reasons an installer step can fail.
///
/// # Example
///
/// ```rust
/// use install_pipeline::InstallError;
///
/// let error = InstallError::ToolUnavailable { program: "wget".to_string() };
/// assert!(error.is_tool_unavailable());
/// assert_eq!(error.to_string(), "wget: command not found");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum InstallError {
    /// The requested executable could not be located.
    #[error("{program}: command not found")]
    ToolUnavailable {
        /// Program that was requested.
        program: String,
    },

    /// The process ran and exited with a non-zero code.
    #[error("{program} exited with code {code}")]
    NonZeroExit {
        /// Program that failed.
        program: String,
        /// Exit code reported by the OS.
        code: i32,
    },

    /// The process was terminated without an exit code (e.g. by a signal).
    #[error("{program} was terminated before exiting")]
    Terminated {
        /// Program that was terminated.
        program: String,
    },

    /// The executable was found but could not be started.
    #[error("{program} failed to start: {message}")]
    SpawnFailed {
        /// Program that failed to start.
        program: String,
        /// OS error description.
        message: String,
    },

    /// The process did not finish within the configured timeout.
    #[error("{program} timed out after {after:?}")]
    Timeout {
        /// Program that timed out.
        program: String,
        /// How long it was allowed to run.
        after: Duration,
    },

    /// A filesystem operation used by a step failed.
    #[error("{operation} failed for {}: {message}", .path.display())]
    Filesystem {
        /// The operation ("remove", "rename", ...).
        operation: &'static str,
        /// Path the operation targeted.
        path: PathBuf,
        /// OS error description.
        message: String,
    },

    /// A queued command failed validation before anything was run.
    #[error("invalid command: {reason}")]
    InvalidCommand {
        /// Why the command was rejected.
        reason: String,
    },

    /// Every candidate of a fallback group failed.
    #[error("all {attempted} candidates failed")]
    AllCandidatesFailed {
        /// How many candidates were tried.
        attempted: usize,
        /// Failure of the last candidate tried, if any were tried.
        last: Option<Box<InstallError>>,
    },
}

impl InstallError {
    /// Whether the failure was caused by a missing executable.
    ///
    /// For a fallback group this is true when the last candidate was
    /// missing.
    pub fn is_tool_unavailable(&self) -> bool {
        match self {
            Self::ToolUnavailable { .. } => true,
            Self::AllCandidatesFailed { last: Some(last), .. } => last.is_tool_unavailable(),
            _ => false,
        }
    }

    /// The program involved in the failure, if the failure came from a
    /// process.
    pub fn program(&self) -> Option<&str> {
        match self {
            Self::ToolUnavailable { program }
            | Self::NonZeroExit { program, .. }
            | Self::Terminated { program }
            | Self::SpawnFailed { program, .. }
            | Self::Timeout { program, .. } => Some(program),
            _ => None,
        }
    }

    pub(crate) fn filesystem(
        operation: &'static str,
        path: impl Into<PathBuf>,
        err: &std::io::Error,
    ) -> Self {
        Self::Filesystem {
            operation,
            path: path.into(),
            message: err.to_string(),
        }
    }
}
