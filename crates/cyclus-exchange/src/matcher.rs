use cyclus_context::{BidPortfolio, RequestPortfolio, Trade};
use cyclus_core::{AgentId, Quantity, EPS_RSRC};
use std::collections::{HashMap, HashSet};

/// Running totals tracked while matching a single commodity, keyed by
/// owning agent and index within that agent's portfolio.
struct PortfolioLedger<'a> {
    constraints: &'a [cyclus_context::CapacityConstraint],
    committed: Vec<f64>,
}

impl<'a> PortfolioLedger<'a> {
    fn new(constraints: &'a [cyclus_context::CapacityConstraint]) -> Self {
        Self {
            constraints,
            committed: vec![0.0; constraints.len()],
        }
    }

    /// Maximum additional quantity index `idx` can absorb without any
    /// constraint's capacity being exceeded.
    fn headroom(&self, idx: usize) -> Quantity {
        let mut room = Quantity::INFINITY;
        for (i, constraint) in self.constraints.iter().enumerate() {
            if let Some((_, weight)) = constraint.coefficients.iter().find(|(ci, _)| *ci == idx) {
                if *weight > 0.0 {
                    let remaining = (constraint.capacity - self.committed[i]) / weight;
                    room = room.min(remaining.max(0.0));
                }
            }
        }
        room
    }

    fn commit(&mut self, idx: usize, quantity: Quantity) {
        for (i, constraint) in self.constraints.iter().enumerate() {
            if let Some((_, weight)) = constraint.coefficients.iter().find(|(ci, _)| *ci == idx) {
                self.committed[i] += weight * quantity;
            }
        }
    }
}

/// Runs the greedy deterministic matching algorithm (§4.6) for a single
/// commodity's requests and bids, returning the trades it produces in
/// execution order.
pub fn match_commodity(commodity: &str, requests: &[RequestPortfolio], bids: &[BidPortfolio]) -> Vec<Trade> {
    let mut request_remaining: HashMap<(AgentId, usize), Quantity> = HashMap::new();
    let mut request_ledgers: HashMap<AgentId, PortfolioLedger> = HashMap::new();
    let mut ineligible: HashSet<(AgentId, usize)> = HashSet::new();

    for portfolio in requests {
        request_ledgers.insert(portfolio.requester, PortfolioLedger::new(&portfolio.constraints));
        for (idx, request) in portfolio.requests.iter().enumerate() {
            request_remaining.insert((portfolio.requester, idx), request.target.quantity);
        }
    }

    let mut bid_remaining: HashMap<(AgentId, usize), Quantity> = HashMap::new();
    let mut bid_ledgers: HashMap<AgentId, PortfolioLedger> = HashMap::new();
    for portfolio in bids {
        bid_ledgers.insert(portfolio.bidder, PortfolioLedger::new(&portfolio.constraints));
        for (idx, bid) in portfolio.bids.iter().enumerate() {
            bid_remaining.insert((portfolio.bidder, idx), bid.offered.quantity);
        }
    }

    // Walk requests in requester-id order, tie-broken by index within the
    // portfolio for determinism when one requester issues several requests.
    let mut request_order: Vec<(AgentId, usize)> = requests
        .iter()
        .flat_map(|p| {
            p.requests
                .iter()
                .enumerate()
                .filter(|(_, r)| r.commodity == commodity)
                .map(move |(i, _)| (p.requester, i))
        })
        .collect();
    request_order.sort();

    let mut trades = Vec::new();

    for (requester, request_idx) in request_order {
        if ineligible.contains(&(requester, request_idx)) {
            continue;
        }
        // Candidate bids aimed at this exact (requester, request_index).
        let mut candidates: Vec<(AgentId, usize)> = bids
            .iter()
            .flat_map(|p| {
                p.bids
                    .iter()
                    .enumerate()
                    .filter(|(_, b)| b.requester == requester && b.request_index == request_idx)
                    .map(move |(i, _)| (p.bidder, i))
            })
            .filter(|(bidder, idx)| {
                bids.iter()
                    .find(|p| p.bidder == *bidder)
                    .map(|p| p.bids[*idx].preference >= 0.0)
                    .unwrap_or(false)
            })
            .collect();
        // Decreasing preference, tie-break ascending bidder id.
        candidates.sort_by(|(bidder_a, idx_a), (bidder_b, idx_b)| {
            let pref_a = bid_pref(bids, *bidder_a, *idx_a);
            let pref_b = bid_pref(bids, *bidder_b, *idx_b);
            pref_b
                .partial_cmp(&pref_a)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(bidder_a.cmp(bidder_b))
        });

        for (bidder, bid_idx) in candidates {
            let remaining_desired = *request_remaining.get(&(requester, request_idx)).unwrap_or(&0.0);
            if remaining_desired <= EPS_RSRC {
                break;
            }
            let remaining_offered = *bid_remaining.get(&(bidder, bid_idx)).unwrap_or(&0.0);
            if remaining_offered <= EPS_RSRC {
                continue;
            }
            let bid_room = bid_ledgers.get(&bidder).map(|l| l.headroom(bid_idx)).unwrap_or(Quantity::INFINITY);
            let req_room = request_ledgers
                .get(&requester)
                .map(|l| l.headroom(request_idx))
                .unwrap_or(Quantity::INFINITY);
            let max_tradeable = remaining_desired.min(remaining_offered).min(bid_room).min(req_room);
            if max_tradeable <= EPS_RSRC {
                continue;
            }

            let exclusive = is_exclusive(bids, bidder, bid_idx);
            let quantity = if exclusive {
                if max_tradeable + EPS_RSRC < remaining_offered {
                    continue; // partial fit on an exclusive bid: skip it entirely
                }
                remaining_offered
            } else {
                max_tradeable
            };

            trades.push(Trade {
                requester,
                request_index: request_idx,
                bidder,
                bid_index: bid_idx,
                quantity,
            });

            *request_remaining.get_mut(&(requester, request_idx)).unwrap() -= quantity;
            *bid_remaining.get_mut(&(bidder, bid_idx)).unwrap() -= quantity;
            if let Some(ledger) = bid_ledgers.get_mut(&bidder) {
                ledger.commit(bid_idx, quantity);
            }
            if let Some(ledger) = request_ledgers.get_mut(&requester) {
                ledger.commit(request_idx, quantity);
            }

            mark_mutex_siblings_ineligible(requests, requester, request_idx, &mut ineligible);
        }
    }

    trades
}

fn bid_pref(bids: &[BidPortfolio], bidder: AgentId, idx: usize) -> f64 {
    bids.iter()
        .find(|p| p.bidder == bidder)
        .map(|p| p.bids[idx].preference)
        .unwrap_or(f64::NEG_INFINITY)
}

fn is_exclusive(bids: &[BidPortfolio], bidder: AgentId, idx: usize) -> bool {
    bids.iter()
        .find(|p| p.bidder == bidder)
        .map(|p| p.bids[idx].exclusive)
        .unwrap_or(false)
}

fn mark_mutex_siblings_ineligible(
    requests: &[RequestPortfolio],
    requester: AgentId,
    request_idx: usize,
    ineligible: &mut HashSet<(AgentId, usize)>,
) {
    if let Some(portfolio) = requests.iter().find(|p| p.requester == requester) {
        for group in &portfolio.mutex_groups {
            if group.contains(&request_idx) {
                for &sibling in group {
                    if sibling != request_idx {
                        ineligible.insert((requester, sibling));
                    }
                }
            }
        }
    }
}
