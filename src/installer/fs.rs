//! Filesystem steps used for staging and cleanup.
//!
//! Paths are resolved against the context's root directory. Failures are
//! reported as [`InstallError::Filesystem`] outcomes and written to the
//! sink's error channel; they never panic.

use super::{BoxedInstaller, Installer};
use crate::{InstallContext, InstallError, Outcome};
use futures::future::{BoxFuture, FutureExt};
use std::path::PathBuf;

/// Deletes a file or directory tree. See [`remove`].
#[derive(Debug, Clone)]
pub struct Remove {
    path: PathBuf,
}

impl Installer for Remove {
    fn install<'a>(&'a self, ctx: &'a InstallContext) -> BoxFuture<'a, Outcome> {
        async move {
            let target = ctx.resolve(&self.path);
            tracing::debug!(path = %target.display(), "Removing");

            let result = match tokio::fs::symlink_metadata(&target).await {
                Ok(meta) if meta.is_dir() => tokio::fs::remove_dir_all(&target).await,
                Ok(_) => tokio::fs::remove_file(&target).await,
                Err(e) => Err(e),
            };

            result.map_err(|e| {
                let error = InstallError::filesystem("remove", &target, &e);
                ctx.sink().stderr(&error.to_string());
                error
            })
        }
        .boxed()
    }
}

/// Installer that deletes `path` (a file, or a directory and its
/// contents). A missing path is a failure; wrap in
/// [`always_succeed`](crate::always_succeed) for best-effort cleanup.
pub fn remove(path: impl Into<PathBuf>) -> BoxedInstaller {
    Box::new(Remove { path: path.into() })
}

/// Creates a directory and its parents. See [`create_dir`].
#[derive(Debug, Clone)]
pub struct CreateDir {
    path: PathBuf,
}

impl Installer for CreateDir {
    fn install<'a>(&'a self, ctx: &'a InstallContext) -> BoxFuture<'a, Outcome> {
        async move {
            let target = ctx.resolve(&self.path);
            tokio::fs::create_dir_all(&target).await.map_err(|e| {
                let error = InstallError::filesystem("create_dir", &target, &e);
                ctx.sink().stderr(&error.to_string());
                error
            })
        }
        .boxed()
    }
}

/// Installer that creates `path` and any missing parents. An existing
/// directory is a success.
pub fn create_dir(path: impl Into<PathBuf>) -> BoxedInstaller {
    Box::new(CreateDir { path: path.into() })
}

/// Moves a file or directory. See [`rename`].
#[derive(Debug, Clone)]
pub struct Rename {
    from: PathBuf,
    to: PathBuf,
}

impl Installer for Rename {
    fn install<'a>(&'a self, ctx: &'a InstallContext) -> BoxFuture<'a, Outcome> {
        async move {
            let from = ctx.resolve(&self.from);
            let to = ctx.resolve(&self.to);
            tracing::debug!(from = %from.display(), to = %to.display(), "Renaming");

            tokio::fs::rename(&from, &to).await.map_err(|e| {
                let error = InstallError::filesystem("rename", &from, &e);
                ctx.sink().stderr(&error.to_string());
                error
            })
        }
        .boxed()
    }
}

/// Installer that renames `from` to `to`, both relative to the root.
pub fn rename(from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> BoxedInstaller {
    Box::new(Rename {
        from: from.into(),
        to: to.into(),
    })
}
