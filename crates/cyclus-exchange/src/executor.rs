use cyclus_context::{query_tradable_mut, Context, Trade, TradeResource};
use cyclus_core::TransactionId;
use cyclus_recorder::Datum;

/// Executes one commodity's matched trades against the agent tree (§4.6
/// Execution).
///
/// For each trade, the bidder's [`cyclus_context::Tradable::extract_trade`]
/// runs first: it splits the concrete resource out of its own inventory
/// and hands it back. That same resource is then passed to the
/// requester's [`cyclus_context::Tradable::accept_trade`] — the exchange
/// is the only channel the resource travels through (§5), so the
/// requester receives exactly what the bidder extracted, not a fresh
/// value built from the quantity alone. A bidder that fails to produce
/// the resource drops the trade, records a warning, and the requester is
/// never called (§4.6 Failure model); a requester that then fails to
/// accept it also just warns — the resource is lost from the run's
/// ledger in that case, which is recorded as a warning rather than
/// silently re-homed.
pub fn execute_trades(
    ctx: &mut Context,
    trades: &[Trade],
    commodity: &str,
    time: cyclus_core::Time,
    next_transaction_id: &mut TransactionId,
) {
    for trade in trades {
        let resource = match run_bidder_side(ctx, trade) {
            Ok(resource) => resource,
            Err(err) => {
                log::warn!(
                    "trade dropped: bidder {} could not deliver {} of '{commodity}' to requester {}: {err}",
                    trade.bidder,
                    trade.quantity,
                    trade.requester
                );
                ctx.record(
                    Datum::new("Warnings")
                        .val("Context", "exchange")
                        .val("Bidder", trade.bidder)
                        .val("Requester", trade.requester)
                        .val("Message", err.to_string()),
                );
                continue;
            }
        };

        let resource_state_id = resource.state_id();
        if let Err(err) = run_requester_side(ctx, trade, resource) {
            log::warn!(
                "requester {} failed to accept trade from bidder {}: {err}",
                trade.requester,
                trade.bidder
            );
            ctx.record(
                Datum::new("Warnings")
                    .val("Context", "exchange")
                    .val("Bidder", trade.bidder)
                    .val("Requester", trade.requester)
                    .val("Message", err.to_string()),
            );
            continue;
        }

        let transaction_id = *next_transaction_id;
        *next_transaction_id += 1;
        ctx.record(
            Datum::new("Transactions")
                .val("Id", transaction_id)
                .val("SenderId", trade.bidder)
                .val("ReceiverId", trade.requester)
                .val("Commodity", commodity.to_owned())
                .val("Time", time)
                .val("Price", 0.0),
        );
        ctx.record(
            Datum::new("TransactedResources")
                .val("TransactionId", transaction_id)
                .val("Position", 0i64)
                .val("ResourceId", resource_state_id)
                .val("Quantity", trade.quantity),
        );
    }
}

fn run_bidder_side(ctx: &mut Context, trade: &Trade) -> anyhow::Result<TradeResource> {
    let mut agent = ctx.tree_mut().take(trade.bidder)?;
    let result = (|| -> anyhow::Result<TradeResource> {
        query_tradable_mut(agent.as_mut())?.extract_trade(ctx, trade)
    })();
    ctx.tree_mut().restore(trade.bidder, agent)?;
    result
}

fn run_requester_side(ctx: &mut Context, trade: &Trade, resource: TradeResource) -> anyhow::Result<()> {
    let mut agent = ctx.tree_mut().take(trade.requester)?;
    let result = (|| -> anyhow::Result<()> {
        query_tradable_mut(agent.as_mut())?.accept_trade(ctx, trade, resource)
    })();
    ctx.tree_mut().restore(trade.requester, agent)?;
    result
}
