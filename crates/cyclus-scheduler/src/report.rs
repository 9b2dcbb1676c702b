use cyclus_core::{AgentId, Time};
use std::fmt;

/// A structured account of why a run stopped before `duration` (§7 failure
/// model): which phase was executing, which agent (if any) raised it, at
/// what simulation time, and a short cause string. This is what callers
/// match on instead of parsing a panic message.
#[derive(Debug, Clone)]
pub struct RunFailure {
    pub phase: Phase,
    pub agent: Option<AgentId>,
    pub time: Time,
    pub cause: String,
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.agent {
            Some(agent) => write!(
                f,
                "run failed in {:?} phase at t={}: agent {agent}: {}",
                self.phase, self.time, self.cause
            ),
            None => write!(f, "run failed in {:?} phase at t={}: {}", self.phase, self.time, self.cause),
        }
    }
}

impl std::error::Error for RunFailure {}

/// Which of the five ordered phases (§4.5) a failure or report entry
/// belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Build,
    Tick,
    Exchange,
    Tock,
    Decommission,
}

/// Returned by a successful (or gracefully stopped) run. `warnings` mirrors
/// every `"Warnings"` datum recorded during the run, regardless of whether
/// `warn_as_error` ultimately escalated one of them to a [`RunFailure`].
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub final_time: Time,
    pub agents_built: u64,
    pub agents_decommissioned: u64,
    pub warnings: Vec<String>,
    pub stopped_early: bool,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }
}
