//! Process runner options.
//!
//! This module provides the [`RunnerOptions`] struct for configuring how the
//! system runner spawns external tools.

use std::time::Duration;

/// Configuration options for [`SystemRunner`](crate::SystemRunner).
///
/// # Default Behavior
///
/// By default processes may run as long as they need (downloads and builds
/// have no natural upper bound) and inherit the caller's environment
/// unchanged.
///
/// # Example
///
/// ```rust
/// use install_pipeline::RunnerOptions;
/// use std::time::Duration;
///
/// let opts = RunnerOptions::default();
/// assert!(opts.timeout.is_none());
///
/// let opts = RunnerOptions {
///     timeout: Some(Duration::from_secs(600)),
///     env: vec![("GIT_TERMINAL_PROMPT".to_string(), "0".to_string())],
/// };
/// ```
#[derive(Debug, Clone, Default)]
pub struct RunnerOptions {
    /// Maximum time a single process may run.
    ///
    /// A process that exceeds it is killed and the step fails with
    /// [`InstallError::Timeout`](crate::InstallError::Timeout).
    ///
    /// Default: `None` (no limit)
    pub timeout: Option<Duration>,

    /// Extra environment variables set on every spawned process.
    ///
    /// Default: empty
    pub env: Vec<(String, String)>,
}

impl RunnerOptions {
    /// Options with the given per-process timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..Default::default()
        }
    }
}
