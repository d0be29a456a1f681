//! Process-level building blocks.
//!
//! - [`ProcessRunner`] / [`SystemRunner`]: run one external program,
//!   streaming its output into a sink
//! - [`CommandLine`] / [`Job`]: lazy command descriptors
//! - [`Chain`]: run commands in order, stopping at the first failure
//! - [`attempt`]: try commands in order until one succeeds

mod attempt;
mod chain;
mod command;
mod runner;

pub use attempt::{attempt, attempt_then};
pub use chain::Chain;
pub use command::{CommandLine, Job};
pub use runner::{ProcessOutcome, ProcessRunner, SystemRunner};
