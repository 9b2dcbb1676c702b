use crate::config::SchedulerConfig;
use crate::report::{Phase, RunFailure, RunReport};
use cyclus_context::Context;
use cyclus_core::{AgentId, Time};
use cyclus_exchange::ResourceExchange;

/// Drives the five ordered phases of a time step — Build, Tick, Exchange,
/// Tock, Decommission (§4.5) — from `t = 0` to `config.duration`, advancing
/// by `config.dt` each iteration.
///
/// Traversal within Tick and Tock visits live agents in `(enter_time, id)`
/// order (§4.5 determinism), so two runs seeded identically produce an
/// identical phase schedule regardless of agent construction order.
pub struct Scheduler {
    config: SchedulerConfig,
    exchange: ResourceExchange,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            exchange: ResourceExchange::new(),
        }
    }

    /// Runs the simulation to completion or until a lifecycle callback
    /// fails, `Context::stop` is called, or (with `warn_as_error` set) a
    /// warning is recorded.
    ///
    /// On failure, `AgentExit` rows are synthesized for every agent still
    /// alive and the recorder is flushed before the error is returned, so
    /// the partially written database reflects every agent's fate (§7).
    pub fn run(&mut self, ctx: &mut Context) -> Result<RunReport, RunFailure> {
        match self.run_inner(ctx) {
            Ok(report) => Ok(report),
            Err(failure) => {
                log::warn!("run aborted in {:?} at t={}: {}", failure.phase, failure.time, failure.cause);
                for id in ctx.tree().live_ids_by_enter_order() {
                    ctx.record(
                        cyclus_recorder::Datum::new("AgentExit")
                            .val("AgentId", id)
                            .val("ExitTime", failure.time),
                    );
                }
                ctx.close_recorder();
                Err(failure)
            }
        }
    }

    fn run_inner(&mut self, ctx: &mut Context) -> Result<RunReport, RunFailure> {
        let mut report = RunReport::new();

        loop {
            let time = ctx.time();
            if time >= self.config.duration {
                break;
            }
            log::debug!("t={time}: entering phase step");

            self.run_build_phase(ctx, time, &mut report)?;
            if self.check_stop(ctx, &mut report, time) {
                break;
            }

            self.run_tick_phase(ctx, time)?;
            if self.check_stop(ctx, &mut report, time) {
                break;
            }

            self.exchange.run(ctx);
            self.check_warnings(ctx, Phase::Exchange, time)?;
            if self.check_stop(ctx, &mut report, time) {
                break;
            }

            self.run_tock_phase(ctx, time)?;
            if self.check_stop(ctx, &mut report, time) {
                break;
            }

            self.run_decommission_phase(ctx, time, &mut report)?;
            if self.check_stop(ctx, &mut report, time) {
                break;
            }

            ctx.advance_time();
        }

        report.final_time = ctx.time();
        ctx.close_recorder();
        Ok(report)
    }

    fn run_build_phase(&mut self, ctx: &mut Context, time: Time, report: &mut RunReport) -> Result<(), RunFailure> {
        for order in ctx.due_build_orders(time) {
            let agent = ctx.create_agent(&order.prototype).map_err(|e| RunFailure {
                phase: Phase::Build,
                agent: None,
                time,
                cause: format!("prototype '{}': {e}", order.prototype),
            })?;
            ctx.build_agent(agent, order.parent).map_err(|e| RunFailure {
                phase: Phase::Build,
                agent: None,
                time,
                cause: e.to_string(),
            })?;
            report.agents_built += 1;
        }
        Ok(())
    }

    fn run_tick_phase(&mut self, ctx: &mut Context, time: Time) -> Result<(), RunFailure> {
        for id in ctx.tree().live_ids_by_enter_order() {
            self.call_agent(ctx, id, time, Phase::Tick, |ctx, id| ctx.tick_agent(id))?;
        }
        Ok(())
    }

    fn run_tock_phase(&mut self, ctx: &mut Context, time: Time) -> Result<(), RunFailure> {
        for id in ctx.tree().live_ids_by_enter_order() {
            self.call_agent(ctx, id, time, Phase::Tock, |ctx, id| ctx.tock_agent(id))?;
        }
        Ok(())
    }

    fn run_decommission_phase(
        &mut self,
        ctx: &mut Context,
        time: Time,
        report: &mut RunReport,
    ) -> Result<(), RunFailure> {
        let mut due: Vec<AgentId> = ctx
            .due_decommission_orders(time)
            .into_iter()
            .map(|o| o.agent)
            .collect();

        for id in ctx.tree().live_ids_by_enter_order() {
            if let Some(node) = ctx.tree().node(id) {
                let lifetime = node.lifetime();
                if lifetime >= 0 && node.enter_time() + lifetime as u64 <= time + self.config.dt && !due.contains(&id)
                {
                    due.push(id);
                }
            }
        }

        for id in due {
            if ctx.tree().node(id).is_none() {
                continue; // already decommissioned this step, e.g. as another's child
            }
            ctx.decommission_agent(id).map_err(|e| RunFailure {
                phase: Phase::Decommission,
                agent: Some(id),
                time,
                cause: e.to_string(),
            })?;
            report.agents_decommissioned += 1;
        }
        Ok(())
    }

    fn call_agent(
        &self,
        ctx: &mut Context,
        id: AgentId,
        time: Time,
        phase: Phase,
        call: impl FnOnce(&mut Context, AgentId) -> anyhow::Result<()>,
    ) -> Result<(), RunFailure> {
        call(ctx, id).map_err(|e| RunFailure {
            phase,
            agent: Some(id),
            time,
            cause: e.to_string(),
        })?;
        self.check_warnings(ctx, phase, time)
    }

    fn check_warnings(&self, ctx: &Context, phase: Phase, time: Time) -> Result<(), RunFailure> {
        if self.config.warn_as_error && ctx.warning_count() > 0 {
            return Err(RunFailure {
                phase,
                agent: None,
                time,
                cause: "a warning was recorded and warn_as_error is set".to_owned(),
            });
        }
        Ok(())
    }

    fn check_stop(&self, ctx: &Context, report: &mut RunReport, time: Time) -> bool {
        if ctx.is_stopped() {
            report.stopped_early = true;
            report.final_time = time;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyclus_context::{Agent, AgentKind, SimInfo};
    use std::any::Any;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Ticker {
        ticks: Rc<RefCell<u64>>,
    }
    impl Agent for Ticker {
        fn kind(&self) -> AgentKind {
            AgentKind::Region
        }
        fn spec(&self) -> &str {
            "ticker"
        }
        fn prototype_name(&self) -> &str {
            "ticker"
        }
        fn lifetime(&self) -> i64 {
            -1
        }
        fn tick(&mut self, _ctx: &mut Context, _id: AgentId, _time: Time) -> anyhow::Result<()> {
            *self.ticks.borrow_mut() += 1;
            Ok(())
        }
        fn clone_template(&self) -> Box<dyn Agent> {
            Box::new(Ticker { ticks: self.ticks.clone() })
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn a_live_agent_is_ticked_once_per_step_through_the_full_run() {
        let mut ctx = Context::new(SimInfo::new(3, 1));
        ctx.recorder_mut().register_backend(Box::new(cyclus_recorder::MemoryBackend::new()));
        let ticks = Rc::new(RefCell::new(0));
        ctx.build_agent(Box::new(Ticker { ticks: ticks.clone() }), None).unwrap();

        let mut scheduler = Scheduler::new(SchedulerConfig::new(3, 1));
        let report = scheduler.run(&mut ctx).unwrap();

        assert_eq!(*ticks.borrow(), 3); // t = 0, 1, 2
        assert_eq!(report.final_time, 3);
        assert!(!report.stopped_early);
    }

    #[test]
    fn calling_context_stop_ends_the_run_before_duration() {
        struct Stopper;
        impl Agent for Stopper {
            fn kind(&self) -> AgentKind {
                AgentKind::Region
            }
            fn spec(&self) -> &str {
                "stopper"
            }
            fn prototype_name(&self) -> &str {
                "stopper"
            }
            fn lifetime(&self) -> i64 {
                -1
            }
            fn tick(&mut self, ctx: &mut Context, _id: AgentId, time: Time) -> anyhow::Result<()> {
                if time == 1 {
                    ctx.stop();
                }
                Ok(())
            }
            fn clone_template(&self) -> Box<dyn Agent> {
                Box::new(Stopper)
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }
        }

        let mut ctx = Context::new(SimInfo::new(10, 1));
        ctx.recorder_mut().register_backend(Box::new(cyclus_recorder::MemoryBackend::new()));
        ctx.build_agent(Box::new(Stopper), None).unwrap();

        let mut scheduler = Scheduler::new(SchedulerConfig::new(10, 1));
        let report = scheduler.run(&mut ctx).unwrap();

        assert!(report.stopped_early);
        assert_eq!(report.final_time, 1);
    }

    #[test]
    fn a_tick_failure_is_reported_with_its_agent_and_phase() {
        struct Faulty;
        impl Agent for Faulty {
            fn kind(&self) -> AgentKind {
                AgentKind::Region
            }
            fn spec(&self) -> &str {
                "faulty"
            }
            fn prototype_name(&self) -> &str {
                "faulty"
            }
            fn lifetime(&self) -> i64 {
                -1
            }
            fn tick(&mut self, _ctx: &mut Context, _id: AgentId, _time: Time) -> anyhow::Result<()> {
                anyhow::bail!("boom")
            }
            fn clone_template(&self) -> Box<dyn Agent> {
                Box::new(Faulty)
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }
        }

        let mut ctx = Context::new(SimInfo::new(5, 1));
        ctx.recorder_mut().register_backend(Box::new(cyclus_recorder::MemoryBackend::new()));
        let id = ctx.build_agent(Box::new(Faulty), None).unwrap();

        let mut scheduler = Scheduler::new(SchedulerConfig::new(5, 1));
        let failure = scheduler.run(&mut ctx).unwrap_err();

        assert_eq!(failure.agent, Some(id));
        assert!(matches!(failure.phase, Phase::Tick));
    }
}
