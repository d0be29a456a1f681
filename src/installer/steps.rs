//! Leaf installers built from process invocations.

use super::{BoxedInstaller, Installer};
use crate::process::{attempt, Chain, CommandLine};
use crate::{InstallContext, Outcome};
use futures::future::{BoxFuture, FutureExt};
use std::future::Future;

/// Runs a single command. See [`exec`].
#[derive(Debug, Clone)]
pub struct Exec {
    command: CommandLine,
}

impl Installer for Exec {
    fn install<'a>(&'a self, ctx: &'a InstallContext) -> BoxFuture<'a, Outcome> {
        async move { ctx.job(self.command.clone()).run().await }.boxed()
    }
}

/// Installer that runs one command in the context's root directory and
/// succeeds iff it exits with code zero.
pub fn exec<P, I, S>(program: P, args: I) -> BoxedInstaller
where
    P: Into<String>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Box::new(Exec {
        command: CommandLine::new(program, args),
    })
}

/// Tries command candidates in order. See [`attempt_commands`].
#[derive(Debug, Clone)]
pub struct AttemptCommands {
    candidates: Vec<CommandLine>,
}

impl Installer for AttemptCommands {
    fn install<'a>(&'a self, ctx: &'a InstallContext) -> BoxFuture<'a, Outcome> {
        // Jobs are only descriptors; attempt() decides which ones to spawn.
        let jobs: Vec<_> = self
            .candidates
            .iter()
            .cloned()
            .map(|command| ctx.job(command))
            .collect();
        attempt(jobs).boxed()
    }
}

/// Installer that tries alternative tools for the same job, in order,
/// until one succeeds (e.g. `wget`, then `curl`).
pub fn attempt_commands(candidates: impl IntoIterator<Item = CommandLine>) -> BoxedInstaller {
    Box::new(AttemptCommands {
        candidates: candidates.into_iter().collect(),
    })
}

/// Runs commands in order. See [`chain_commands`].
#[derive(Debug, Clone)]
pub struct ChainCommands {
    steps: Vec<CommandLine>,
}

impl Installer for ChainCommands {
    fn install<'a>(&'a self, ctx: &'a InstallContext) -> BoxFuture<'a, Outcome> {
        let mut chain = Chain::new(ctx);
        for step in &self.steps {
            chain.push(step.clone());
        }
        chain.execute().boxed()
    }
}

/// Installer that runs a fixed sequence of commands, stopping at the first
/// failure.
pub fn chain_commands(steps: impl IntoIterator<Item = CommandLine>) -> BoxedInstaller {
    Box::new(ChainCommands {
        steps: steps.into_iter().collect(),
    })
}

/// Installer backed by a closure. See [`from_fn`].
pub struct FnStep<F> {
    f: F,
}

impl<F, Fut> Installer for FnStep<F>
where
    F: Fn(InstallContext) -> Fut + Send + Sync,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    fn install<'a>(&'a self, ctx: &'a InstallContext) -> BoxFuture<'a, Outcome> {
        (self.f)(ctx.clone()).boxed()
    }
}

/// Installer that runs an async closure.
///
/// The closure receives a handle to the shared context; use it for steps
/// that need to build their commands from the requested version.
///
/// # Example
///
/// ```rust
/// use install_pipeline::{from_fn, InstallContext};
///
/// let checkout = from_fn(|ctx: InstallContext| async move {
///     let tag = format!("v{}", ctx.version().unwrap_or("0.0.0"));
///     ctx.command("git", ["checkout", tag.as_str()]).run().await
/// });
/// ```
pub fn from_fn<F, Fut>(f: F) -> BoxedInstaller
where
    F: Fn(InstallContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    Box::new(FnStep { f })
}
