//! Top-level installer execution.
//!
//! This module provides the [`install`] function that runs a composed
//! installer tree once against a context, and [`launch`], its
//! continuation-passing form.

use crate::installer::Installer;
use crate::{InstallContext, Outcome};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;

/// Run an installer tree to completion.
///
/// The tree is evaluated depth-first; every leaf is a process invocation
/// or filesystem call, every inner node applies its own success policy.
/// The final outcome is logged and returned.
///
/// # Example
///
/// ```rust,no_run
/// use install_pipeline::{always_succeed, exec, install, pipe, remove, InstallContext};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let ctx = InstallContext::builder("/tmp/work").version("1.2.0").build();
///     let installer = pipe(vec![
///         exec("curl", ["-fLo", "src.tar.gz", "https://example.com/src-1.2.0.tar.gz"]),
///         exec("tar", ["xzf", "src.tar.gz"]),
///         always_succeed(remove("src.tar.gz")),
///     ]);
///
///     match install(&installer, &ctx).await {
///         Ok(()) => println!("Installed"),
///         Err(e) => println!("Failed: {}", e),
///     }
/// }
/// ```
pub async fn install<I>(installer: &I, ctx: &InstallContext) -> Outcome
where
    I: Installer + ?Sized,
{
    let start = Instant::now();
    tracing::info!(root = %ctx.root().display(), version = ?ctx.version(), platform = %ctx.platform(), "Starting installation");

    let result = installer.install(ctx).await;

    match &result {
        Ok(()) => tracing::info!(elapsed = ?start.elapsed(), "Installation completed"),
        Err(e) => tracing::warn!(elapsed = ?start.elapsed(), error = %e, "Installation failed"),
    }
    result
}

/// Run an installer tree on a tokio task and report through a callback.
///
/// `on_finish` is an `FnOnce`, so it is invoked exactly once, after every
/// step of the tree has resolved.
pub fn launch<I, F>(installer: Arc<I>, ctx: InstallContext, on_finish: F) -> JoinHandle<()>
where
    I: Installer + ?Sized + 'static,
    F: FnOnce(Outcome) + Send + 'static,
{
    resolve_with(
        async move { install(installer.as_ref(), &ctx).await },
        on_finish,
    )
}

/// Drive `future` on a tokio task and hand its output to `on_finish`.
pub(crate) fn resolve_with<Fut, F>(future: Fut, on_finish: F) -> JoinHandle<()>
where
    Fut: Future<Output = Outcome> + Send + 'static,
    F: FnOnce(Outcome) + Send + 'static,
{
    tokio::spawn(async move {
        let outcome = future.await;
        on_finish(outcome);
    })
}
