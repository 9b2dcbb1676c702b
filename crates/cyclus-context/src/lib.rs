//! The Agent trait, the agent tree's lifecycle, and the process-wide
//! Context service locator (§4.2, §4.4).
//!
//! Agent and Context are defined in one crate rather than split across
//! two: an archetype's lifecycle callbacks need `&mut Context` to reach
//! the clock, recorder, and registries, while `Context::build_agent` and
//! friends need to call back into the `Agent` trait object they own —
//! splitting them would require an artificial indirection layer neither
//! side actually benefits from.
//!
//! Core Types:
//! - [`Agent`] / [`AgentKind`] / [`LifecycleState`]: the agent trait and
//!   its lifecycle states.
//! - [`Tradable`] / [`Producer`] / [`Builder`]: the queryable mix-in
//!   capabilities.
//! - [`AgentTree`]: the rooted forest of live agents.
//! - [`Context`] / [`SimInfo`]: the service locator and its metadata.
//! - [`PrototypeRegistry`] / [`RecipeRegistry`] / [`PackageRegistry`].
//! - [`BuildOrder`] / [`DecommissionOrder`] / [`OrderQueue`].
//! - [`Request`] / [`Bid`] / [`RequestPortfolio`] / [`BidPortfolio`] /
//!   [`CapacityConstraint`] / [`Trade`] / [`TradeResource`]: the exchange's
//!   wire types, defined here because [`Tradable`] needs them.

mod agent;
mod capability;
mod context;
mod orders;
mod registry;
mod tree;
mod trade;

pub use agent::{query_builder, query_producer, query_tradable, query_tradable_mut, Agent, AgentKind, LifecycleState};
pub use capability::{Builder, Producer, ProductionCapacity, Tradable};
pub use context::{Context, SimInfo};
pub use orders::{BuildOrder, DecommissionOrder, OrderQueue};
pub use registry::{PackageRegistry, PrototypeRegistry, RecipeRegistry};
pub use trade::{
    Bid, BidPortfolio, CapacityConstraint, Commodity, Request, RequestPortfolio, ResourceSpec, Trade, TradeResource,
};
pub use tree::{AgentNode, AgentTree};
