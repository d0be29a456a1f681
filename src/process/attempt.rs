//! Sequential trial-with-fallback over command candidates.

use crate::executor::resolve_with;
use crate::process::Job;
use crate::{InstallError, Outcome};
use tokio::task::JoinHandle;

/// Run `jobs` one at a time until one succeeds.
///
/// Candidates are tried strictly in the order given and never
/// concurrently, so two tools never race on the same output file. As soon
/// as one succeeds the remaining candidates are dropped without being
/// spawned. If every candidate fails (or the list is empty) the result is
/// [`InstallError::AllCandidatesFailed`].
///
/// # Example
///
/// ```rust,no_run
/// use install_pipeline::{attempt, InstallContext};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let ctx = InstallContext::builder("/tmp/work").build();
///     let result = attempt([
///         ctx.command("wget", ["-O", "a.zip", "http://x/f.zip"]),
///         ctx.command("curl", ["-fL", "-o", "a.zip", "http://x/f.zip"]),
///     ])
///     .await;
///     println!("downloaded: {}", result.is_ok());
/// }
/// ```
pub async fn attempt<I>(jobs: I) -> Outcome
where
    I: IntoIterator<Item = Job>,
{
    let mut attempted = 0;
    let mut last = None;

    for job in jobs {
        attempted += 1;
        match job.run().await {
            Ok(()) => {
                tracing::debug!(program = %job.command().program, attempted, "Candidate succeeded");
                return Ok(());
            }
            Err(e) => {
                tracing::debug!(program = %job.command().program, error = %e, "Candidate failed, trying next");
                last = Some(Box::new(e));
            }
        }
    }

    Err(InstallError::AllCandidatesFailed { attempted, last })
}

/// Continuation form of [`attempt`].
///
/// Runs the candidates on a tokio task and calls `on_finish` exactly once
/// with the result.
pub fn attempt_then<F>(jobs: Vec<Job>, on_finish: F) -> JoinHandle<()>
where
    F: FnOnce(Outcome) + Send + 'static,
{
    resolve_with(attempt(jobs), on_finish)
}
