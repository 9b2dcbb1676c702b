use crate::capability::{Builder, Producer, Tradable};
use crate::Context;
use cyclus_core::{AgentId, Time};
use std::any::Any;

/// Where an agent sits in the tree's three-level forest (§4.4): Regions are
/// roots, Institutions are their children, Facilities are theirs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    Region,
    Institution,
    Facility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Template,
    Registered,
    Built,
    Alive,
    Decommissioned,
}

/// The capability set an archetype may implement (§4.4: Tickable, Tradable,
/// Producer, Region, Institution, Facility). Tickable is universal — every
/// agent gets a `tick`/`tock` callback, defaulted to a no-op. The other
/// capabilities are queried through the `as_*` accessors below, which
/// default to `None`; an archetype that implements one overrides the
/// matching accessor to return `Some(self)`. A query against a capability
/// an agent doesn't implement is the kernel's `CastError` (§7) — see
/// [`query_tradable`] and friends.
pub trait Agent: Any {
    fn kind(&self) -> AgentKind;
    fn spec(&self) -> &str;
    fn prototype_name(&self) -> &str;
    fn lifetime(&self) -> i64;

    /// Invoked once, immediately after the tree assigns this agent its id
    /// and enter_time, before it is visited by any phase (§4.4 `Build`).
    fn enter_notify(&mut self, _ctx: &mut Context) -> anyhow::Result<()> {
        Ok(())
    }

    /// Invoked once, immediately before the tree records `AgentExit`
    /// (§4.4 `Decommission`).
    fn decom_notify(&mut self, _ctx: &mut Context) -> anyhow::Result<()> {
        Ok(())
    }

    /// Pre-exchange phase callback.
    fn tick(&mut self, _ctx: &mut Context, _id: AgentId, _time: Time) -> anyhow::Result<()> {
        Ok(())
    }

    /// Post-exchange phase callback.
    fn tock(&mut self, _ctx: &mut Context, _id: AgentId, _time: Time) -> anyhow::Result<()> {
        Ok(())
    }

    /// Constructs a fresh instance of the same concrete type carrying the
    /// same configuration, used by prototype cloning (§4.4 `Clone`). The
    /// clone starts in `Template` state until it is `Build`-ed.
    fn clone_template(&self) -> Box<dyn Agent>;

    fn as_tradable(&self) -> Option<&dyn Tradable> {
        None
    }
    fn as_tradable_mut(&mut self) -> Option<&mut dyn Tradable> {
        None
    }
    fn as_producer(&self) -> Option<&dyn Producer> {
        None
    }
    fn as_builder(&self) -> Option<&dyn Builder> {
        None
    }

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Queries `agent` for the [`Tradable`] capability, the Rust analogue of
/// the original's "is this agent a Trader" interface query.
pub fn query_tradable(agent: &dyn Agent) -> Result<&dyn Tradable, cyclus_core::KernelError> {
    agent.as_tradable().ok_or_else(|| {
        cyclus_core::KernelError::cast(format!(
            "agent '{}' does not implement Tradable",
            agent.prototype_name()
        ))
    })
}

/// Queries `agent` mutably for the [`Tradable`] capability.
pub fn query_tradable_mut(agent: &mut dyn Agent) -> Result<&mut dyn Tradable, cyclus_core::KernelError> {
    let name = agent.prototype_name().to_owned();
    agent
        .as_tradable_mut()
        .ok_or_else(|| cyclus_core::KernelError::cast(format!("agent '{name}' does not implement Tradable")))
}

/// Queries `agent` for the [`Producer`] capability.
pub fn query_producer(agent: &dyn Agent) -> Result<&dyn Producer, cyclus_core::KernelError> {
    agent.as_producer().ok_or_else(|| {
        cyclus_core::KernelError::cast(format!(
            "agent '{}' does not implement Producer",
            agent.prototype_name()
        ))
    })
}

/// Queries `agent` for the [`Builder`] capability ("is a builder" query).
pub fn query_builder(agent: &dyn Agent) -> Result<&dyn Builder, cyclus_core::KernelError> {
    agent.as_builder().ok_or_else(|| {
        cyclus_core::KernelError::cast(format!(
            "agent '{}' does not implement Builder",
            agent.prototype_name()
        ))
    })
}
