//! A discrete-time agent-based simulation kernel for modeling flows of
//! typed, conserved resources through a hierarchical population of agents,
//! matched by a dynamic resource exchange and recorded through a pluggable
//! backend pipeline.
//!
//! This crate is a thin aggregator over the kernel crates, plus
//! [`Scenario`], the library-surface equivalent of a parsed
//! `<control>`/`<recipe>`/`<package>`/`<prototype>`/`<region>` document
//! (§6). Embedders typically depend on this crate alone; `cyclus-*` crates
//! are usable independently for anyone who only needs, say, the resource
//! model or the recorder.

mod scenario;

pub use scenario::Scenario;

pub use cyclus_context::{
    query_builder, query_producer, query_tradable, query_tradable_mut, Agent, AgentKind,
    AgentNode, AgentTree, Bid, BidPortfolio, Builder, BuildOrder, CapacityConstraint, Commodity,
    Context, DecommissionOrder, LifecycleState, OrderQueue, PackageRegistry, Producer,
    ProductionCapacity, PrototypeRegistry, RecipeRegistry, Request, RequestPortfolio,
    ResourceSpec, SimInfo, Tradable, Trade,
};
pub use cyclus_core::{
    kahan_sum, quantity_eq, AgentId, KernelError, ObjId, Preference, Quantity, QualId, StateId,
    Time, TransactionId, EPS_RSRC, ID,
};
pub use cyclus_exchange::{match_commodity, ResourceExchange};
pub use cyclus_recorder::{BackendContract, Datum, DatumValue, MemoryBackend, QueryCondition, Recorder};
pub use cyclus_resource::{
    Composition, CompositionTable, FillStrategy, Material, NucId, Package, Product,
    ResTracker, ResourceIdAllocator, ResourceKind, TransportStrategy, TransportUnit,
};
pub use cyclus_scheduler::{DecayMode, Phase, RunFailure, RunReport, Scheduler, SchedulerConfig};
