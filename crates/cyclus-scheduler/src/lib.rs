//! The discrete time-stepped loop that ties a populated [`cyclus_context::Context`]
//! to the dynamic resource exchange (§4.5).
//!
//! Core Types:
//! - [`Scheduler`]: runs the Build/Tick/Exchange/Tock/Decommission phases
//!   from `t = 0` to a configured duration.
//! - [`SchedulerConfig`] / [`DecayMode`]: the run's ambient configuration.
//! - [`RunReport`] / [`RunFailure`]: the outcome of a run, success or not.

mod config;
mod report;
mod scheduler;

pub use config::{DecayMode, SchedulerConfig};
pub use report::{Phase, RunFailure, RunReport};
pub use scheduler::Scheduler;
