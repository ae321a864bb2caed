//! Virtual-user load generation for the retail banking API
//!
//! A run is one [`global_setup`] followed by a population of
//! [`VirtualUser`]s. Each user creates its own account, then loops over
//! weighted tasks (transfer, report) separated by a random think time,
//! until the [`StopSignal`] fires. Every request lands in
//! [`RequestStats`] under its endpoint label.

pub mod error;
pub mod policy;
pub mod runner;
pub mod setup;
pub mod state;
pub mod stats;
pub mod stop;
pub mod tasks;
pub mod think_time;
pub mod user;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{RunnerError, RunnerResult};
pub use policy::{SkipReason, TransferPolicy};
pub use runner::{LoadRunner, RunSummary};
pub use setup::{global_setup, SetupReport};
pub use state::{AccountPool, SharedState};
pub use stats::{LabelReport, RequestStats, Sample, StatsReport};
pub use stop::{StopReason, StopSignal};
pub use tasks::{TaskKind, TaskSet, TRANSFER_AMOUNT_CENTS};
pub use think_time::ThinkTime;
pub use user::{TaskOutcome, UserContext, UserState, UserSummary, VirtualUser};
