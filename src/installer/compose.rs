//! Sequential, fallback and outcome-absorbing combinators.

use super::{BoxedInstaller, Installer};
use crate::{InstallContext, InstallError, Outcome};
use futures::future::{BoxFuture, FutureExt};

/// Sequential composition. See [`pipe`].
pub struct Pipe {
    steps: Vec<BoxedInstaller>,
}

impl Installer for Pipe {
    fn install<'a>(&'a self, ctx: &'a InstallContext) -> BoxFuture<'a, Outcome> {
        async move {
            let total = self.steps.len();
            for (index, step) in self.steps.iter().enumerate() {
                tracing::debug!(step = index + 1, total, "Pipe step");
                if let Err(e) = step.install(ctx).await {
                    tracing::debug!(step = index + 1, total, error = %e, "Pipe aborted");
                    return Err(e);
                }
            }
            Ok(())
        }
        .boxed()
    }
}

/// Run `steps` in order against the same context.
///
/// Succeeds only if every step succeeds. The first failing step's error is
/// returned and the steps after it are never started. An empty pipe
/// succeeds.
pub fn pipe(steps: impl IntoIterator<Item = BoxedInstaller>) -> BoxedInstaller {
    Box::new(Pipe {
        steps: steps.into_iter().collect(),
    })
}

/// Outcome-absorbing wrapper. See [`always_succeed`].
pub struct AlwaysSucceed {
    inner: BoxedInstaller,
}

impl Installer for AlwaysSucceed {
    fn install<'a>(&'a self, ctx: &'a InstallContext) -> BoxFuture<'a, Outcome> {
        async move {
            if let Err(e) = self.inner.install(ctx).await {
                tracing::warn!(error = %e, "Ignoring failure of best-effort step");
            }
            Ok(())
        }
        .boxed()
    }
}

/// Run `inner` for its side effects and succeed regardless of its outcome.
///
/// Typical use is best-effort cleanup, such as deleting a downloaded
/// archive, that must not abort the surrounding pipeline. Output the inner
/// step writes to the sink, including its failure reason, is kept.
pub fn always_succeed(inner: BoxedInstaller) -> BoxedInstaller {
    Box::new(AlwaysSucceed { inner })
}

/// Step with guaranteed cleanup. See [`finally`].
pub struct Finally {
    step: BoxedInstaller,
    cleanup: BoxedInstaller,
}

impl Installer for Finally {
    fn install<'a>(&'a self, ctx: &'a InstallContext) -> BoxFuture<'a, Outcome> {
        async move {
            let result = self.step.install(ctx).await;
            if let Err(e) = self.cleanup.install(ctx).await {
                tracing::warn!(error = %e, "Ignoring failure of cleanup step");
            }
            result
        }
        .boxed()
    }
}

/// Run `step`, then run `cleanup` whatever `step`'s outcome was.
///
/// Resolves to `step`'s outcome; `cleanup`'s outcome is ignored as with
/// [`always_succeed`]. Use it where a temporary file must go away even if
/// the work that consumed it failed.
pub fn finally(step: BoxedInstaller, cleanup: BoxedInstaller) -> BoxedInstaller {
    Box::new(Finally { step, cleanup })
}

/// Fallback over whole installers. See [`first_successful`].
pub struct FirstSuccessful {
    variants: Vec<BoxedInstaller>,
}

impl Installer for FirstSuccessful {
    fn install<'a>(&'a self, ctx: &'a InstallContext) -> BoxFuture<'a, Outcome> {
        async move {
            let mut attempted = 0;
            let mut last = None;
            for variant in &self.variants {
                attempted += 1;
                match variant.install(ctx).await {
                    Ok(()) => {
                        tracing::debug!(variant = attempted, "Variant succeeded");
                        return Ok(());
                    }
                    Err(e) => {
                        tracing::debug!(variant = attempted, error = %e, "Variant failed, trying next");
                        last = Some(Box::new(e));
                    }
                }
            }
            let error = InstallError::AllCandidatesFailed { attempted, last };
            ctx.sink().stderr(&error.to_string());
            Err(error)
        }
        .boxed()
    }
}

/// Try installer `variants` in order until one succeeds.
///
/// Each variant may be a whole pipeline with its own side effects; a
/// variant only starts after the previous one has failed, and none start
/// after one succeeds. Fails with
/// [`InstallError::AllCandidatesFailed`] when every variant fails.
pub fn first_successful(variants: impl IntoIterator<Item = BoxedInstaller>) -> BoxedInstaller {
    Box::new(FirstSuccessful {
        variants: variants.into_iter().collect(),
    })
}
