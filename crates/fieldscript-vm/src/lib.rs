//! Field-script runner: signals decoded instructions to a host.
//!
//! Battle resolution, flag storage and the rest of the game simulation live
//! behind the [`Host`] trait; the runner only turns instructions into
//! directives.

mod host;
mod runner;

pub use host::{Directive, Host, HostError, RecordingHost};
pub use runner::{RunError, RunSummary, Runner};
