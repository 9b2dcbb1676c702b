use crate::matcher::match_commodity;
use cyclus_context::{Context, RequestPortfolio};
use cyclus_core::{AgentId, TransactionId};
use std::collections::BTreeSet;

/// The per-time-step matching engine (§4.6): gathers request and bid
/// portfolios per commodity from every registered trader, matches them,
/// and executes the resulting trades.
pub struct ResourceExchange {
    next_transaction_id: TransactionId,
}

impl ResourceExchange {
    pub fn new() -> Self {
        Self { next_transaction_id: 1 }
    }

    /// Runs one exchange round at `ctx`'s current time.
    pub fn run(&mut self, ctx: &mut Context) {
        let time = ctx.time();
        let trader_ids: Vec<AgentId> = ctx.traders().iter().copied().collect();

        let mut requests: Vec<RequestPortfolio> = Vec::new();
        for id in &trader_ids {
            if let Some(portfolios) = collect_requests(ctx, *id, time) {
                requests.extend(portfolios);
            }
        }

        let commodities: BTreeSet<String> = requests
            .iter()
            .flat_map(|p| p.requests.iter().map(|r| r.commodity.clone()))
            .collect();

        for commodity in commodities {
            let mut bids = Vec::new();
            for id in &trader_ids {
                if let Some(portfolios) = collect_bids(ctx, *id, time, &commodity) {
                    bids.extend(portfolios);
                }
            }

            adjust_preferences(ctx, &requests, &mut bids);

            let trades = match_commodity(&commodity, &requests, &bids);
            if trades.is_empty() {
                continue;
            }
            log::debug!("exchange: matched {} trade(s) for commodity '{commodity}'", trades.len());
            crate::executor::execute_trades(ctx, &trades, &commodity, time, &mut self.next_transaction_id);
        }
    }
}

impl Default for ResourceExchange {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_requests(ctx: &Context, id: AgentId, time: cyclus_core::Time) -> Option<Vec<RequestPortfolio>> {
    let node = ctx.tree().node(id)?;
    let tradable = node.agent().as_tradable()?;
    Some(tradable.request_portfolios(ctx, id, time))
}

fn collect_bids(
    ctx: &Context,
    id: AgentId,
    time: cyclus_core::Time,
    commodity: &str,
) -> Option<Vec<cyclus_context::BidPortfolio>> {
    let node = ctx.tree().node(id)?;
    let tradable = node.agent().as_tradable()?;
    Some(tradable.bid_portfolios(ctx, id, time, commodity))
}

/// `AdjustMatlPrefs` / `AdjustGenRsrcPrefs` (§4.6): each requester rewrites
/// the preference of bids placed against its own requests.
fn adjust_preferences(
    ctx: &Context,
    requests: &[RequestPortfolio],
    bids: &mut [cyclus_context::BidPortfolio],
) {
    for portfolio in requests {
        if let Some(node) = ctx.tree().node(portfolio.requester) {
            if let Some(tradable) = node.agent().as_tradable() {
                for bid_portfolio in bids.iter_mut() {
                    let owned: Vec<usize> = bid_portfolio
                        .bids
                        .iter()
                        .enumerate()
                        .filter(|(_, b)| b.requester == portfolio.requester)
                        .map(|(i, _)| i)
                        .collect();
                    if owned.is_empty() {
                        continue;
                    }
                    let mut subset: Vec<cyclus_context::Bid> =
                        owned.iter().map(|&i| bid_portfolio.bids[i].clone()).collect();
                    tradable.adjust_preferences(&portfolio.requests, &mut subset);
                    for (slot, idx) in owned.into_iter().enumerate() {
                        bid_portfolio.bids[idx] = subset[slot].clone();
                    }
                }
            }
        }
    }
}
