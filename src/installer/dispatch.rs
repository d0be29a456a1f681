//! Platform-conditional dispatch.

use super::{BoxedInstaller, Installer};
use crate::{InstallContext, Outcome, Platform};
use futures::future::{BoxFuture, FutureExt};

/// One optional installer per [`Platform`].
///
/// # Example
///
/// ```rust
/// use install_pipeline::{exec, Branches, Platform};
///
/// let branches = Branches::new()
///     .unix(exec("chmod", ["+x", "bin/tool"]));
/// assert!(branches.covers(Platform::Unix));
/// assert!(!branches.covers(Platform::Windows));
/// ```
#[derive(Default)]
pub struct Branches {
    unix: Option<BoxedInstaller>,
    windows: Option<BoxedInstaller>,
}

impl Branches {
    /// No branches.
    pub fn new() -> Self {
        Self::default()
    }

    /// A branch for every platform. Use this to have the compiler check
    /// that a dispatch is exhaustive.
    pub fn exhaustive(unix: BoxedInstaller, windows: BoxedInstaller) -> Self {
        Self {
            unix: Some(unix),
            windows: Some(windows),
        }
    }

    /// Set the branch for [`Platform::Unix`].
    pub fn unix(mut self, installer: BoxedInstaller) -> Self {
        self.unix = Some(installer);
        self
    }

    /// Set the branch for [`Platform::Windows`].
    pub fn windows(mut self, installer: BoxedInstaller) -> Self {
        self.windows = Some(installer);
        self
    }

    /// Whether a branch exists for `platform`.
    pub fn covers(&self, platform: Platform) -> bool {
        self.get(platform).is_some()
    }

    fn get(&self, platform: Platform) -> Option<&BoxedInstaller> {
        match platform {
            Platform::Unix => self.unix.as_ref(),
            Platform::Windows => self.windows.as_ref(),
        }
    }
}

/// Exhaustive platform dispatch. See [`when`].
pub struct When {
    branches: Branches,
}

impl Installer for When {
    fn install<'a>(&'a self, ctx: &'a InstallContext) -> BoxFuture<'a, Outcome> {
        let platform = ctx.platform();
        match self.branches.get(platform) {
            Some(branch) => {
                tracing::debug!(%platform, "Dispatching platform branch");
                branch.install(ctx)
            }
            None => panic!(
                "installer recipe defect: `when` has no branch for platform `{}`",
                platform
            ),
        }
    }
}

/// Run the branch for the context's platform.
///
/// `when` is meant to be exhaustive: running it on a platform without a
/// branch is a defect in the recipe, not a runtime failure.
///
/// # Panics
///
/// Panics when run on a platform that has no branch. Build the branches
/// with [`Branches::exhaustive`] to rule this out at compile time.
pub fn when(branches: Branches) -> BoxedInstaller {
    Box::new(When { branches })
}

/// Optional platform dispatch. See [`on`].
pub struct On {
    branches: Branches,
}

impl Installer for On {
    fn install<'a>(&'a self, ctx: &'a InstallContext) -> BoxFuture<'a, Outcome> {
        let platform = ctx.platform();
        match self.branches.get(platform) {
            Some(branch) => branch.install(ctx),
            None => {
                tracing::debug!(%platform, "No branch for platform, skipping");
                futures::future::ready(Ok(())).boxed()
            }
        }
    }
}

/// Run the branch for the context's platform, or succeed without doing
/// anything when there is none.
///
/// For steps that are meaningless on some platforms, such as setting the
/// executable bit on Windows.
pub fn on(branches: Branches) -> BoxedInstaller {
    Box::new(On { branches })
}
