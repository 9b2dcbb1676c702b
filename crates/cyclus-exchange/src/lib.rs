//! The dynamic resource exchange: request/bid collection, greedy
//! deterministic matching, and trade execution (§4.6).
//!
//! Core Types:
//! - [`ResourceExchange`]: the per-step orchestrator.
//! - [`matcher::match_commodity`]: the matching algorithm in isolation,
//!   useful for testing matching behavior without a live agent tree.

mod executor;
mod exchange;
mod matcher;

pub use exchange::ResourceExchange;
pub use matcher::match_commodity;

#[cfg(test)]
mod tests {
    use super::*;
    use cyclus_context::{
        Agent, AgentKind, Bid, BidPortfolio, Context, Request, RequestPortfolio, ResourceSpec,
        SimInfo, Tradable, Trade, TradeResource,
    };
    use cyclus_resource::Material;
    use std::any::Any;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Buyer {
        received: Rc<RefCell<f64>>,
    }
    impl Agent for Buyer {
        fn kind(&self) -> AgentKind {
            AgentKind::Facility
        }
        fn spec(&self) -> &str {
            "buyer"
        }
        fn prototype_name(&self) -> &str {
            "buyer"
        }
        fn lifetime(&self) -> i64 {
            -1
        }
        fn clone_template(&self) -> Box<dyn Agent> {
            Box::new(Buyer { received: self.received.clone() })
        }
        fn as_tradable(&self) -> Option<&dyn Tradable> {
            Some(self)
        }
        fn as_tradable_mut(&mut self) -> Option<&mut dyn Tradable> {
            Some(self)
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }
    impl Tradable for Buyer {
        fn request_portfolios(&self, _ctx: &Context, id: cyclus_core::AgentId, _time: cyclus_core::Time) -> Vec<RequestPortfolio> {
            vec![RequestPortfolio::new(
                id,
                vec![Request::new("fuel", ResourceSpec::new(10.0, "kg"), 1.0)],
            )]
        }
        fn bid_portfolios(&self, _ctx: &Context, _id: cyclus_core::AgentId, _time: cyclus_core::Time, _commodity: &str) -> Vec<BidPortfolio> {
            Vec::new()
        }
        fn extract_trade(&mut self, _ctx: &mut Context, _trade: &Trade) -> anyhow::Result<TradeResource> {
            unreachable!("buyer never bids, so it is never the bidder side of a trade")
        }
        fn accept_trade(&mut self, _ctx: &mut Context, _trade: &Trade, resource: TradeResource) -> anyhow::Result<()> {
            *self.received.borrow_mut() += resource.quantity();
            Ok(())
        }
    }

    struct Seller {
        sent: Rc<RefCell<f64>>,
    }
    impl Agent for Seller {
        fn kind(&self) -> AgentKind {
            AgentKind::Facility
        }
        fn spec(&self) -> &str {
            "seller"
        }
        fn prototype_name(&self) -> &str {
            "seller"
        }
        fn lifetime(&self) -> i64 {
            -1
        }
        fn clone_template(&self) -> Box<dyn Agent> {
            Box::new(Seller { sent: self.sent.clone() })
        }
        fn as_tradable(&self) -> Option<&dyn Tradable> {
            Some(self)
        }
        fn as_tradable_mut(&mut self) -> Option<&mut dyn Tradable> {
            Some(self)
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }
    impl Tradable for Seller {
        fn request_portfolios(&self, _ctx: &Context, _id: cyclus_core::AgentId, _time: cyclus_core::Time) -> Vec<RequestPortfolio> {
            Vec::new()
        }
        fn bid_portfolios(&self, _ctx: &Context, id: cyclus_core::AgentId, _time: cyclus_core::Time, commodity: &str) -> Vec<BidPortfolio> {
            if commodity != "fuel" {
                return Vec::new();
            }
            // The test wires the buyer as the first agent built, so its id is 1.
            vec![BidPortfolio::new(
                id,
                vec![Bid::new(1, 0, ResourceSpec::new(10.0, "kg"), id, 1.0)],
            )]
        }
        fn extract_trade(&mut self, ctx: &mut Context, trade: &Trade) -> anyhow::Result<TradeResource> {
            *self.sent.borrow_mut() += trade.quantity;
            let comp = ctx.composition_table_mut().intern(vec![(922350000, 1.0)])?;
            let material = Material::create(ctx.resource_alloc_mut(), trade.quantity, "kg", comp)?;
            Ok(TradeResource::Material(material))
        }
        fn accept_trade(&mut self, _ctx: &mut Context, _trade: &Trade, _resource: TradeResource) -> anyhow::Result<()> {
            unreachable!("seller never requests, so it is never the requester side of a trade")
        }
    }

    #[test]
    fn a_matched_trade_is_delivered_to_both_parties() {
        let mut ctx = Context::new(SimInfo::new(10, 1));
        ctx.recorder_mut().register_backend(Box::new(cyclus_recorder::MemoryBackend::new()));

        let received = Rc::new(RefCell::new(0.0));
        let buyer_id = ctx.build_agent(Box::new(Buyer { received: received.clone() }), None).unwrap();
        ctx.register_trader(buyer_id);

        let sent = Rc::new(RefCell::new(0.0));
        let seller_id = ctx.build_agent(Box::new(Seller { sent: sent.clone() }), None).unwrap();
        ctx.register_trader(seller_id);

        let mut exchange = ResourceExchange::new();
        exchange.run(&mut ctx);

        assert_eq!(*received.borrow(), 10.0);
        assert_eq!(*sent.borrow(), 10.0);
    }
}
