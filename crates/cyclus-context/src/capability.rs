use crate::agent::Agent;
use crate::trade::{BidPortfolio, RequestPortfolio, Trade, TradeResource};
use crate::Context;
use cyclus_core::{AgentId, Quantity, Time};

/// The mix-in interface for agents that participate in the exchange
/// (§4.4, §4.6). An agent implements `Tradable` to both request and
/// supply resources; an archetype that only ever requests or only ever
/// bids simply returns an empty portfolio from the side it doesn't use.
pub trait Tradable: Agent {
    fn request_portfolios(&self, ctx: &Context, id: AgentId, time: Time) -> Vec<RequestPortfolio>;

    fn bid_portfolios(
        &self,
        ctx: &Context,
        id: AgentId,
        time: Time,
        commodity: &str,
    ) -> Vec<BidPortfolio>;

    /// `AdjustMatlPrefs` / `AdjustGenRsrcPrefs` (§4.6): a requester may
    /// rewrite the preference of bids placed against its own requests
    /// before matching runs. A negative preference means "refuse"; such
    /// bids are dropped by the matcher. Default: no adjustment.
    fn adjust_preferences(&self, _requests: &[crate::trade::Request], _bids: &mut [crate::trade::Bid]) {}

    /// `GetMatlTrades` / `GetProductTrades` (§4.6): the bidder's side of
    /// execution. Extracts (splitting its inventory if needed) the actual
    /// resource this trade commits to supplying and returns it; the
    /// exchange then hands that same resource to the requester via
    /// [`Tradable::accept_trade`]. The bidder's own inventory must shrink
    /// by exactly `trade.quantity` as a result.
    fn extract_trade(&mut self, ctx: &mut Context, trade: &Trade) -> anyhow::Result<TradeResource>;

    /// `AcceptMatlTrades` / `AcceptProductTrades` (§4.6): the requester's
    /// side of execution. Receives the concrete resource the bidder
    /// extracted via [`Tradable::extract_trade`] for this same trade and
    /// folds it into the requester's inventory.
    fn accept_trade(&mut self, ctx: &mut Context, trade: &Trade, resource: TradeResource) -> anyhow::Result<()>;
}

/// Describes an agent's capacity to produce a commodity: capacity `K` at
/// cost `X` (§4.4 "produces commodity C at capacity K with cost X").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductionCapacity {
    pub capacity: Quantity,
    pub cost: f64,
}

pub trait Producer: Agent {
    fn produces(&self, commodity: &str) -> Option<ProductionCapacity>;
}

/// The mix-in for agents that can build new facilities/institutions
/// underneath them (§4.4 "is a builder" query).
pub trait Builder: Agent {
    fn can_build(&self, prototype: &str) -> bool;
}
