//! # install-pipeline
//!
//! Declarative installer pipelines for external tools.
//!
//! An installation is described as a tree of small steps (run a program,
//! delete a file, create a directory) glued together with combinators, and
//! executed against an [`InstallContext`] that carries the working root,
//! the requested version, the platform and an output [`Sink`].
//!
//! ## Features
//!
//! - [`SystemRunner`] spawns external programs and streams their output
//!   line by line into the sink
//! - [`Chain`] and [`attempt`] run lazy [`Job`]s in order, as "all must
//!   succeed" and "first that succeeds" respectively
//! - [`pipe`], [`first_successful`], [`always_succeed`], [`finally`],
//!   [`when`] and [`on`] compose whole installers
//! - [`recipes`] bundles common download, unpack and checkout steps
//!
//! ## Example
//!
//! ```rust,no_run
//! use install_pipeline::recipes::{fetch_zip, make_executable};
//! use install_pipeline::{install, pipe, ConsoleSink, InstallContext};
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let ctx = InstallContext::builder("/opt/tools/ninja")
//!         .version("1.12.1")
//!         .sink(Arc::new(ConsoleSink))
//!         .build();
//!
//!     let installer = pipe(vec![
//!         fetch_zip(
//!             "https://github.com/ninja-build/ninja/releases/download/v1.12.1/ninja-linux.zip",
//!             "ninja.zip",
//!             "bin",
//!         ),
//!         make_executable("bin/ninja"),
//!     ]);
//!
//!     match install(&installer, &ctx).await {
//!         Ok(()) => println!("installed"),
//!         Err(e) => eprintln!("install failed: {}", e),
//!     }
//! }
//! ```

mod context;
mod error;
mod executor;
pub mod installer;
mod options;
mod platform;
pub mod process;
pub mod recipes;
mod sink;

#[cfg(test)]
mod test_support;

pub use context::{ContextBuilder, InstallContext};
pub use error::{InstallError, Outcome};
pub use executor::{install, launch};
pub use installer::{
    always_succeed, attempt_commands, chain_commands, create_dir, exec, finally, first_successful,
    from_fn, on, pipe, remove, rename, when, BoxedInstaller, Branches, Installer, InstallerExt,
};
pub use options::RunnerOptions;
pub use platform::{Platform, UnknownPlatform};
pub use process::{
    attempt, attempt_then, Chain, CommandLine, Job, ProcessOutcome, ProcessRunner, SystemRunner,
};
pub use sink::{Channel, ConsoleSink, MemorySink, Sink, SinkLine, TracingSink};
