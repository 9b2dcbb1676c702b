use cyclus_core::{AgentId, Preference, Quantity, StateId};
use cyclus_resource::{Material, Product};

/// An opaque tag over which requests and bids are matched.
pub type Commodity = String;

/// A lightweight description of the resource a [`Request`] wants, enough
/// for the matching engine to compute quantities without depending on
/// `cyclus-resource`'s concrete value types (§3 Exchange portfolios).
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSpec {
    pub quantity: Quantity,
    pub units: String,
}

impl ResourceSpec {
    pub fn new(quantity: Quantity, units: impl Into<String>) -> Self {
        Self {
            quantity,
            units: units.into(),
        }
    }
}

/// `Request = (commodity, target-resource template, preference, exclusive?)`.
#[derive(Debug, Clone)]
pub struct Request {
    pub commodity: Commodity,
    pub target: ResourceSpec,
    pub preference: Preference,
    pub exclusive: bool,
}

impl Request {
    pub fn new(commodity: impl Into<String>, target: ResourceSpec, preference: Preference) -> Self {
        Self {
            commodity: commodity.into(),
            target,
            preference,
            exclusive: false,
        }
    }

    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }
}

/// `Bid = (Request*, offered-resource, bidder, exclusive?)`. `requester`
/// plus `request_index` (the offset within that requester's portfolio)
/// stand in for the original's raw `Request*`, since a bidder may bid
/// against requests owned by more than one requester in the same
/// commodity. `preference` starts as a copy of the targeted request's
/// preference and may be rewritten by the requester's preference-
/// adjustment hook before matching runs.
#[derive(Debug, Clone)]
pub struct Bid {
    pub requester: AgentId,
    pub request_index: usize,
    pub offered: ResourceSpec,
    pub bidder: AgentId,
    pub preference: Preference,
    pub exclusive: bool,
}

impl Bid {
    pub fn new(
        requester: AgentId,
        request_index: usize,
        offered: ResourceSpec,
        bidder: AgentId,
        preference: Preference,
    ) -> Self {
        Self {
            requester,
            request_index,
            offered,
            bidder,
            preference,
            exclusive: false,
        }
    }

    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }
}

/// Bounds a linear functional of matched quantities within a portfolio:
/// `sum(coeff_i * matched_qty_i) <= capacity`, indexed by position within
/// the owning portfolio's request or bid list.
#[derive(Debug, Clone)]
pub struct CapacityConstraint {
    pub coefficients: Vec<(usize, f64)>,
    pub capacity: Quantity,
}

impl CapacityConstraint {
    pub fn new(coefficients: Vec<(usize, f64)>, capacity: Quantity) -> Self {
        Self { coefficients, capacity }
    }
}

/// `RequestPortfolio = (requester_agent, list of Requests, optional
/// mutual-exclusion groups, list of capacity constraints)`.
#[derive(Debug, Clone)]
pub struct RequestPortfolio {
    pub requester: AgentId,
    pub requests: Vec<Request>,
    pub mutex_groups: Vec<Vec<usize>>,
    pub constraints: Vec<CapacityConstraint>,
}

impl RequestPortfolio {
    pub fn new(requester: AgentId, requests: Vec<Request>) -> Self {
        Self {
            requester,
            requests,
            mutex_groups: Vec::new(),
            constraints: Vec::new(),
        }
    }
}

/// `BidPortfolio = (bidder_agent, list of Bids, list of capacity
/// constraints)`.
#[derive(Debug, Clone)]
pub struct BidPortfolio {
    pub bidder: AgentId,
    pub bids: Vec<Bid>,
    pub constraints: Vec<CapacityConstraint>,
}

impl BidPortfolio {
    pub fn new(bidder: AgentId, bids: Vec<Bid>) -> Self {
        Self {
            bidder,
            bids,
            constraints: Vec::new(),
        }
    }
}

/// `Trade = (request, bid, quantity)` — identifies a request and bid by
/// (owning agent, index within its portfolio) rather than by reference.
#[derive(Debug, Clone)]
pub struct Trade {
    pub requester: AgentId,
    pub request_index: usize,
    pub bidder: AgentId,
    pub bid_index: usize,
    pub quantity: Quantity,
}

/// The concrete resource `GetMatlTrades`/`GetProductTrades` extracts from
/// the bidder's inventory and `AcceptMatlTrades`/`AcceptProductTrades`
/// hands to the requester (§4.6 Execution): the exchange is the only
/// mechanism that transfers ownership (§5), so this is what actually
/// flows from one agent to the other, not just a quantity number.
#[derive(Debug, Clone)]
pub enum TradeResource {
    Material(Material),
    Product(Product),
}

impl TradeResource {
    /// The state_id recorded in `TransactedResources` (§4.6): the id of
    /// the resource *after* any split the bidder performed to produce it.
    pub fn state_id(&self) -> StateId {
        match self {
            TradeResource::Material(m) => m.state_id(),
            TradeResource::Product(p) => p.state_id(),
        }
    }

    pub fn quantity(&self) -> Quantity {
        match self {
            TradeResource::Material(m) => m.quantity(),
            TradeResource::Product(p) => p.quantity(),
        }
    }
}
