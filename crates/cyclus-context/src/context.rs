use crate::agent::Agent;
use crate::orders::{BuildOrder, DecommissionOrder, OrderQueue};
use crate::registry::{PackageRegistry, PrototypeRegistry, RecipeRegistry};
use crate::tree::AgentTree;
use cyclus_core::{AgentId, KernelError, Time};
use cyclus_recorder::{Datum, Recorder};
use cyclus_resource::{Composition, CompositionTable, Package, ResourceIdAllocator};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::collections::HashSet;

/// Simulation-wide metadata, the kernel's analogue of the parsed
/// `<control>` block (§6 `Info` row).
#[derive(Debug, Clone)]
pub struct SimInfo {
    pub duration: Time,
    pub dt: Time,
    pub decay_mode: String,
    pub seed: u64,
}

impl SimInfo {
    pub fn new(duration: Time, dt: Time) -> Self {
        Self {
            duration,
            dt,
            decay_mode: "never".to_owned(),
            seed: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_decay_mode(mut self, decay_mode: impl Into<String>) -> Self {
        self.decay_mode = decay_mode.into();
        self
    }
}

/// Process-wide service locator (§4.2): holds the clock, random source,
/// recorder, the prototype/recipe/package registries, and the agent tree.
/// Everything an archetype's lifecycle callback needs reaches it through
/// `&mut Context`.
pub struct Context {
    time: Time,
    info: SimInfo,
    recorder: Recorder,
    rng: SmallRng,
    resource_alloc: ResourceIdAllocator,
    composition_table: CompositionTable,
    tree: AgentTree,
    prototypes: PrototypeRegistry,
    recipes: RecipeRegistry,
    packages: PackageRegistry,
    build_orders: OrderQueue<BuildOrder>,
    decommission_orders: OrderQueue<DecommissionOrder>,
    traders: HashSet<AgentId>,
    stopped: bool,
    warning_count: u64,
}

impl Context {
    pub fn new(info: SimInfo) -> Self {
        let rng = SmallRng::seed_from_u64(info.seed);
        Self {
            time: 0,
            info,
            recorder: Recorder::new(),
            rng,
            resource_alloc: ResourceIdAllocator::new(),
            composition_table: CompositionTable::new(),
            tree: AgentTree::new(),
            prototypes: PrototypeRegistry::new(),
            recipes: RecipeRegistry::new(),
            packages: PackageRegistry::new(),
            build_orders: OrderQueue::new(),
            decommission_orders: OrderQueue::new(),
            traders: HashSet::new(),
            stopped: false,
            warning_count: 0,
        }
    }

    pub fn time(&self) -> Time {
        self.time
    }

    pub fn dt(&self) -> Time {
        self.info.dt
    }

    pub fn sim_info(&self) -> &SimInfo {
        &self.info
    }

    pub fn advance_time(&mut self) {
        self.time += self.info.dt;
    }

    pub fn rng_mut(&mut self) -> &mut SmallRng {
        &mut self.rng
    }

    pub fn recorder_mut(&mut self) -> &mut Recorder {
        &mut self.recorder
    }

    pub fn resource_alloc_mut(&mut self) -> &mut ResourceIdAllocator {
        &mut self.resource_alloc
    }

    pub fn composition_table_mut(&mut self) -> &mut CompositionTable {
        &mut self.composition_table
    }

    pub fn tree(&self) -> &AgentTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut AgentTree {
        &mut self.tree
    }

    pub fn add_prototype(&mut self, name: impl Into<String>, template: Box<dyn Agent>) {
        self.prototypes.add(name, template);
    }

    pub fn create_agent(&self, name: &str) -> Result<Box<dyn Agent>, KernelError> {
        self.prototypes.clone_named(name)
    }

    /// Resolves a requested lifetime against `base`'s prototype, creating
    /// the `"{base}_life_{n}"` alias on first use (§3.1, §4.4).
    pub fn resolve_lifetime_prototype(
        &mut self,
        base: &str,
        requested_lifetime: i64,
    ) -> Result<String, KernelError> {
        self.prototypes.alias_with_lifetime(base, requested_lifetime)
    }

    pub fn get_recipe(&self, name: &str) -> Result<&Composition, KernelError> {
        self.recipes.get(name)
    }

    pub fn add_recipe(&mut self, name: impl Into<String>, composition: Composition) {
        self.recipes.add(name, composition);
    }

    pub fn get_package(&self, name: &str) -> Result<&Package, KernelError> {
        self.packages.get(name)
    }

    pub fn add_package(&mut self, package: Package) {
        self.packages.add(package);
    }

    pub fn sched_build(&mut self, parent: Option<AgentId>, prototype: impl Into<String>, time: Time) {
        self.build_orders.push(
            time,
            BuildOrder {
                parent,
                prototype: prototype.into(),
                time,
            },
        );
    }

    pub fn sched_decom(&mut self, agent: AgentId, time: Time) {
        self.decommission_orders.push(time, DecommissionOrder { agent, time });
    }

    pub fn due_build_orders(&mut self, time: Time) -> Vec<BuildOrder> {
        self.build_orders.drain_due(time)
    }

    pub fn due_decommission_orders(&mut self, time: Time) -> Vec<DecommissionOrder> {
        self.decommission_orders.drain_due(time)
    }

    pub fn register_trader(&mut self, id: AgentId) {
        self.traders.insert(id);
    }

    pub fn unregister_trader(&mut self, id: AgentId) {
        self.traders.remove(&id);
    }

    pub fn traders(&self) -> &HashSet<AgentId> {
        &self.traders
    }

    /// Delegates to the Recorder with the simulation's UUID preset on
    /// `record` (§4.2).
    pub fn new_datum(&self, title: &'static str) -> Datum {
        Datum::new(title)
    }

    pub fn record(&mut self, datum: Datum) {
        if datum.title() == "Warnings" {
            self.warning_count += 1;
        }
        self.recorder.record(datum);
    }

    /// Count of `"Warnings"` rows recorded so far, consulted by the
    /// scheduler when `warn_as_error` is set (§7).
    pub fn warning_count(&self) -> u64 {
        self.warning_count
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// `Build(parent)`: attaches `agent` to `parent`, assigns its id and
    /// enter_time, invokes `EnterNotify`, and records `AgentEntry` (§4.4).
    pub fn build_agent(
        &mut self,
        agent: Box<dyn Agent>,
        parent: Option<AgentId>,
    ) -> Result<AgentId, KernelError> {
        let time = self.time;
        let id = self.tree.allocate_id();
        self.tree.insert(id, agent, parent, time)?;
        let mut taken = self.tree.take(id)?;
        let result = taken.enter_notify(self);
        let (kind, spec, prototype, lifetime) = (
            taken.kind(),
            taken.spec().to_owned(),
            taken.prototype_name().to_owned(),
            taken.lifetime(),
        );
        self.tree.restore(id, taken)?;
        result.map_err(|e| {
            KernelError::state(format!("enter_notify failed for prototype '{prototype}': {e}"))
        })?;
        self.tree.mark_alive(id)?;
        log::debug!("agent {id} ({prototype}) entered at t={time}, parent={parent:?}");
        self.recorder.record(
            Datum::new("AgentEntry")
                .val("AgentId", id)
                .val("Kind", format!("{kind:?}"))
                .val("Spec", spec)
                .val("Prototype", prototype)
                .val("ParentId", parent.unwrap_or(0))
                .val("EnterTime", time)
                .val("Lifetime", lifetime),
        );
        Ok(id)
    }

    /// `Decommission()`: children are decommissioned depth-first first,
    /// each invoking `DecomNotify` and recording `AgentExit` (§4.4).
    pub fn decommission_agent(&mut self, id: AgentId) -> Result<(), KernelError> {
        let order = self.tree.decommission_order(id);
        let time = self.time;
        for agent_id in order {
            let mut agent = self.tree.take(agent_id)?;
            let result = agent.decom_notify(self);
            self.tree.restore(agent_id, agent)?;
            result.map_err(|e| KernelError::state(format!("decom_notify failed for agent {agent_id}: {e}")))?;
            self.tree.mark_decommissioned(agent_id, time)?;
            self.unregister_trader(agent_id);
            log::debug!("agent {agent_id} decommissioned at t={time}");
            self.recorder
                .record(Datum::new("AgentExit").val("AgentId", agent_id).val("ExitTime", time));
        }
        Ok(())
    }

    pub fn tick_agent(&mut self, id: AgentId) -> anyhow::Result<()> {
        let mut agent = self.tree.take(id)?;
        let time = self.time;
        let result = agent.tick(self, id, time);
        self.tree.restore(id, agent)?;
        result
    }

    pub fn tock_agent(&mut self, id: AgentId) -> anyhow::Result<()> {
        let mut agent = self.tree.take(id)?;
        let time = self.time;
        let result = agent.tock(self, id, time);
        self.tree.restore(id, agent)?;
        result
    }

    pub fn close_recorder(&mut self) {
        self.recorder.close();
    }
}
