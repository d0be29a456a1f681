//! Installer capability and combinators.
//!
//! An [`Installer`] is a unit of work that, given an [`InstallContext`],
//! eventually resolves to success or failure exactly once. Installers are
//! built from leaves (process invocations and filesystem calls) and
//! combined with:
//!
//! - [`pipe`]: all must succeed, in order, stop at the first failure
//! - [`first_successful`]: try variants in order until one succeeds
//! - [`always_succeed`]: run for side effects, ignore the outcome
//! - [`finally`]: run a cleanup step after a step, whatever its outcome
//! - [`when`] / [`on`]: dispatch on the platform tag
//!
//! # Example
//!
//! ```rust,no_run
//! use install_pipeline::{
//!     always_succeed, attempt_commands, exec, first_successful, on, pipe, remove, when,
//!     Branches, CommandLine,
//! };
//!
//! let unpack = pipe(vec![
//!     when(
//!         Branches::new()
//!             .unix(exec("unzip", ["-o", "a.zip", "-d", "dest"]))
//!             .windows(first_successful(vec![
//!                 exec("7z", ["x", "a.zip", "-odest"]),
//!                 exec("wzunzip", ["-d", "a.zip", "dest"]),
//!             ])),
//!     ),
//!     always_succeed(remove("a.zip")),
//!     on(Branches::new().unix(exec("chmod", ["+x", "dest/bin/tool"]))),
//! ]);
//! ```

mod compose;
mod dispatch;
mod fs;
mod steps;

pub use compose::{
    always_succeed, finally, first_successful, pipe, AlwaysSucceed, Finally, FirstSuccessful, Pipe,
};
pub use dispatch::{on, when, Branches, On, When};
pub use fs::{create_dir, remove, rename, CreateDir, Remove, Rename};
pub use steps::{
    attempt_commands, chain_commands, exec, from_fn, AttemptCommands, ChainCommands, Exec, FnStep,
};

use crate::{InstallContext, Outcome};
use futures::future::BoxFuture;
use std::sync::Arc;

/// A composable unit of installation work.
///
/// `install` returns a future that resolves exactly once. Composite
/// installers never resolve before the children their policy depends on
/// have resolved, and never start a child before the previous one has
/// resolved.
pub trait Installer: Send + Sync {
    /// Run this installer against `ctx`.
    fn install<'a>(&'a self, ctx: &'a InstallContext) -> BoxFuture<'a, Outcome>;
}

/// A type-erased installer, as stored by the combinators.
pub type BoxedInstaller = Box<dyn Installer>;

impl<T: Installer + ?Sized> Installer for Box<T> {
    fn install<'a>(&'a self, ctx: &'a InstallContext) -> BoxFuture<'a, Outcome> {
        (**self).install(ctx)
    }
}

impl<T: Installer + ?Sized> Installer for Arc<T> {
    fn install<'a>(&'a self, ctx: &'a InstallContext) -> BoxFuture<'a, Outcome> {
        (**self).install(ctx)
    }
}

/// Conversion helpers for installers.
pub trait InstallerExt: Installer + Sized + 'static {
    /// Erase the installer's type.
    fn boxed(self) -> BoxedInstaller {
        Box::new(self)
    }
}

impl<T: Installer + 'static> InstallerExt for T {}
