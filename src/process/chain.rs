//! Sequential command chains.

use crate::executor::resolve_with;
use crate::process::{CommandLine, Job};
use crate::{InstallContext, InstallError, Outcome};
use tokio::task::JoinHandle;

/// Builder for a sequence of commands that share one context.
///
/// Commands are queued with [`Chain::run`] and executed in order by
/// [`Chain::execute`] or [`Chain::spawn`]. Execution stops at the first
/// failing command; later commands never start and earlier ones are never
/// re-run.
///
/// Queuing validates each command without running it. The first invalid
/// command poisons the chain: nothing runs and the recorded error is the
/// chain's result.
///
/// # Example
///
/// ```rust,no_run
/// use install_pipeline::{Chain, InstallContext};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let ctx = InstallContext::builder("/tmp/work").build();
///     let mut chain = Chain::new(&ctx);
///     chain
///         .run("git", ["clone", "https://example.com/repo.git", "repo"])
///         .run("git", ["-C", "repo", "fetch", "origin", "v1.2.0"])
///         .run("git", ["-C", "repo", "checkout", "FETCH_HEAD"]);
///     let result = chain.execute().await;
///     println!("checked out: {}", result.is_ok());
/// }
/// ```
#[derive(Debug)]
pub struct Chain {
    ctx: InstallContext,
    jobs: Vec<Job>,
    error: Option<InstallError>,
}

impl Chain {
    /// Start an empty chain in `ctx`.
    pub fn new(ctx: &InstallContext) -> Self {
        Self {
            ctx: ctx.clone(),
            jobs: Vec::new(),
            error: None,
        }
    }

    /// Queue a command. Nothing is spawned until the chain executes.
    pub fn run<P, I, S>(&mut self, program: P, args: I) -> &mut Self
    where
        P: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(CommandLine::new(program, args))
    }

    /// Queue a prepared command line.
    pub fn push(&mut self, command: CommandLine) -> &mut Self {
        if self.error.is_some() {
            tracing::debug!(command = %command.display(), "Chain already invalid, ignoring command");
            return self;
        }
        match command.validate() {
            Ok(()) => self.jobs.push(self.ctx.job(command)),
            Err(e) => self.error = Some(e),
        }
        self
    }

    /// Number of commands queued.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether no command has been queued.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// The validation error recorded while queuing, if any.
    pub fn error(&self) -> Option<&InstallError> {
        self.error.as_ref()
    }

    /// Run every queued command in order.
    pub async fn execute(self) -> Outcome {
        if let Some(e) = self.error {
            self.ctx.sink().stderr(&e.to_string());
            return Err(e);
        }

        let total = self.jobs.len();
        for (index, job) in self.jobs.iter().enumerate() {
            tracing::debug!(step = index + 1, total, command = %job.command().display(), "Chain step");
            job.run().await?;
        }
        Ok(())
    }

    /// Continuation form of [`Chain::execute`].
    ///
    /// Runs the chain on a tokio task and calls `on_finish` exactly once.
    pub fn spawn<F>(self, on_finish: F) -> JoinHandle<()>
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        resolve_with(self.execute(), on_finish)
    }
}
