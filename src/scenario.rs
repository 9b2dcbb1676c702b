use cyclus_context::{Agent, Context, SimInfo};
use cyclus_core::{AgentId, KernelError, Time};
use cyclus_recorder::BackendContract;
use cyclus_resource::{Composition, Package};
use cyclus_scheduler::{RunFailure, RunReport, Scheduler, SchedulerConfig};

/// The library-surface equivalent of a parsed
/// `<control>`/`<recipe>`/`<package>`/`<prototype>`/`<region>` document
/// (§6): an embedder populates one of these directly instead of handing the
/// kernel an XML/JSON file.
pub struct Scenario {
    config: SchedulerConfig,
    recipes: Vec<(String, Composition)>,
    packages: Vec<Package>,
    prototypes: Vec<(String, Box<dyn Agent>)>,
    deployments: Vec<(Option<AgentId>, String, Time)>,
    backends: Vec<Box<dyn BackendContract>>,
}

impl Scenario {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            recipes: Vec::new(),
            packages: Vec::new(),
            prototypes: Vec::new(),
            deployments: Vec::new(),
            backends: Vec::new(),
        }
    }

    pub fn with_recipe(mut self, name: impl Into<String>, composition: Composition) -> Self {
        self.recipes.push((name.into(), composition));
        self
    }

    pub fn with_package(mut self, package: Package) -> Self {
        self.packages.push(package);
        self
    }

    pub fn with_prototype(mut self, name: impl Into<String>, template: Box<dyn Agent>) -> Self {
        self.prototypes.push((name.into(), template));
        self
    }

    /// Schedules `prototype` to enter the simulation at `time`, attached to
    /// `parent` (`None` for a root Region).
    pub fn deploy(mut self, parent: Option<AgentId>, prototype: impl Into<String>, time: Time) -> Self {
        self.deployments.push((parent, prototype.into(), time));
        self
    }

    pub fn with_backend(mut self, backend: Box<dyn BackendContract>) -> Self {
        self.backends.push(backend);
        self
    }

    /// Builds the `Context`, registers every recipe/package/prototype,
    /// schedules the initial deployments, and runs the scheduler to
    /// completion.
    pub fn run(self) -> Result<(Context, RunReport), RunFailure> {
        let mut ctx = Context::new(SimInfo::new(self.config.duration, self.config.dt).with_seed(self.config.seed));
        for backend in self.backends {
            ctx.recorder_mut().register_backend(backend);
        }
        for (name, composition) in self.recipes {
            ctx.add_recipe(name, composition);
        }
        for package in self.packages {
            ctx.add_package(package);
        }
        for (name, template) in self.prototypes {
            ctx.add_prototype(name, template);
        }
        for (parent, prototype, time) in self.deployments {
            ctx.sched_build(parent, prototype, time);
        }

        let mut scheduler = Scheduler::new(self.config);
        let report = scheduler.run(&mut ctx)?;
        Ok((ctx, report))
    }
}

/// Translates a scheduler-level [`RunFailure`] into the closed [`KernelError`]
/// set, for an embedder that wants a single error type across setup and run
/// (§6: "whose variants mirror the CLI's documented exit codes").
impl From<RunFailure> for KernelError {
    fn from(failure: RunFailure) -> Self {
        KernelError::state(failure.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyclus_context::AgentKind;
    use cyclus_recorder::MemoryBackend;
    use std::any::Any;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct CountingRegion {
        ticks: Rc<RefCell<u64>>,
    }
    impl Agent for CountingRegion {
        fn kind(&self) -> AgentKind {
            AgentKind::Region
        }
        fn spec(&self) -> &str {
            "counting_region"
        }
        fn prototype_name(&self) -> &str {
            "region"
        }
        fn lifetime(&self) -> i64 {
            -1
        }
        fn tick(&mut self, _ctx: &mut Context, _id: AgentId, _time: Time) -> anyhow::Result<()> {
            *self.ticks.borrow_mut() += 1;
            Ok(())
        }
        fn clone_template(&self) -> Box<dyn Agent> {
            Box::new(CountingRegion { ticks: self.ticks.clone() })
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn a_deployed_prototype_is_built_and_ticked_for_the_whole_run() {
        let ticks = Rc::new(RefCell::new(0));
        let scenario = Scenario::new(SchedulerConfig::new(2, 1))
            .with_backend(Box::new(MemoryBackend::new()))
            .with_prototype("region", Box::new(CountingRegion { ticks: ticks.clone() }))
            .deploy(None, "region", 0);

        let (ctx, report) = scenario.run().unwrap();

        assert_eq!(*ticks.borrow(), 2); // t = 0, 1
        assert_eq!(report.agents_built, 1);
        assert_eq!(ctx.tree().len(), 1);
    }
}
