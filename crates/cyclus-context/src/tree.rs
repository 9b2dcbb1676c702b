use crate::agent::{Agent, LifecycleState};
use cyclus_core::{AgentId, KernelError, Time};
use std::collections::HashMap;

/// One node of the rooted forest: the agent's own state plus its place in
/// the hierarchy (§4.4).
pub struct AgentNode {
    /// `None` only for the instant a callback that needs `&mut Context`
    /// runs — see [`AgentTree::take`] / [`AgentTree::restore`].
    agent: Option<Box<dyn Agent>>,
    parent: Option<AgentId>,
    children: Vec<AgentId>,
    state: LifecycleState,
    enter_time: Time,
    exit_time: Option<Time>,
    lifetime: i64,
}

impl AgentNode {
    pub fn agent(&self) -> &dyn Agent {
        self.agent.as_deref().expect("agent temporarily taken")
    }

    pub fn agent_mut(&mut self) -> &mut dyn Agent {
        self.agent.as_deref_mut().expect("agent temporarily taken")
    }

    pub fn parent(&self) -> Option<AgentId> {
        self.parent
    }

    pub fn children(&self) -> &[AgentId] {
        &self.children
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn enter_time(&self) -> Time {
        self.enter_time
    }

    pub fn exit_time(&self) -> Option<Time> {
        self.exit_time
    }

    pub fn lifetime(&self) -> i64 {
        self.lifetime
    }
}

/// The agent population as an arbitrary rooted forest whose roots are
/// Regions (§4.4). Owns id assignment and parent/child structure; lifecycle
/// callbacks are orchestrated by [`crate::Context`], which needs mutable
/// access to both the tree and itself while a callback runs.
#[derive(Default)]
pub struct AgentTree {
    nodes: HashMap<AgentId, AgentNode>,
    next_id: AgentId,
    roots: Vec<AgentId>,
}

impl AgentTree {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            next_id: 1,
            roots: Vec::new(),
        }
    }

    pub fn allocate_id(&mut self) -> AgentId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Inserts a freshly built agent, attaching it to `parent` (or to the
    /// root set if `parent` is `None`).
    pub fn insert(
        &mut self,
        id: AgentId,
        agent: Box<dyn Agent>,
        parent: Option<AgentId>,
        enter_time: Time,
    ) -> Result<(), KernelError> {
        let lifetime = agent.lifetime();
        self.nodes.insert(
            id,
            AgentNode {
                agent: Some(agent),
                parent,
                children: Vec::new(),
                state: LifecycleState::Built,
                enter_time,
                exit_time: None,
                lifetime,
            },
        );
        match parent {
            Some(parent_id) => {
                let parent_node = self
                    .nodes
                    .get_mut(&parent_id)
                    .ok_or_else(|| KernelError::key(format!("no agent with id {parent_id}")))?;
                parent_node.children.push(id);
            }
            None => self.roots.push(id),
        }
        Ok(())
    }

    pub fn node(&self, id: AgentId) -> Option<&AgentNode> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: AgentId) -> Option<&mut AgentNode> {
        self.nodes.get_mut(&id)
    }

    /// Temporarily removes the agent trait object from its node so a
    /// lifecycle callback can be invoked with `&mut Context` without
    /// aliasing the node that owns it.
    pub fn take(&mut self, id: AgentId) -> Result<Box<dyn Agent>, KernelError> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| KernelError::key(format!("no agent with id {id}")))?
            .agent
            .take()
            .ok_or_else(|| KernelError::state(format!("agent {id} is already taken")))
    }

    pub fn restore(&mut self, id: AgentId, agent: Box<dyn Agent>) -> Result<(), KernelError> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or_else(|| KernelError::key(format!("no agent with id {id}")))?;
        node.agent = Some(agent);
        Ok(())
    }

    pub fn mark_alive(&mut self, id: AgentId) -> Result<(), KernelError> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or_else(|| KernelError::key(format!("no agent with id {id}")))?;
        node.state = LifecycleState::Alive;
        Ok(())
    }

    /// Depth-first list of `id` and all of its descendants, children before
    /// parents, the order `Decommission` must process them in (§4.4).
    pub fn decommission_order(&self, id: AgentId) -> Vec<AgentId> {
        let mut order = Vec::new();
        self.visit_postorder(id, &mut order);
        order
    }

    fn visit_postorder(&self, id: AgentId, out: &mut Vec<AgentId>) {
        if let Some(node) = self.nodes.get(&id) {
            for &child in &node.children {
                self.visit_postorder(child, out);
            }
            out.push(id);
        }
    }

    pub fn mark_decommissioned(&mut self, id: AgentId, exit_time: Time) -> Result<(), KernelError> {
        let parent = {
            let node = self
                .nodes
                .get_mut(&id)
                .ok_or_else(|| KernelError::key(format!("no agent with id {id}")))?;
            node.state = LifecycleState::Decommissioned;
            node.exit_time = Some(exit_time);
            node.parent
        };
        match parent {
            Some(parent_id) => {
                if let Some(parent_node) = self.nodes.get_mut(&parent_id) {
                    parent_node.children.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }
        Ok(())
    }

    /// All currently live (Built or Alive) agent ids in `(enter_time, id)`
    /// ascending order, the traversal order every phase uses (§5).
    pub fn live_ids_by_enter_order(&self) -> Vec<AgentId> {
        let mut ids: Vec<AgentId> = self
            .nodes
            .iter()
            .filter(|(_, n)| n.state != LifecycleState::Decommissioned)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_by_key(|id| (self.nodes[id].enter_time, *id));
        ids
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentKind;
    use std::any::Any;

    struct Stub {
        name: &'static str,
        lifetime: i64,
    }
    impl Agent for Stub {
        fn kind(&self) -> AgentKind {
            AgentKind::Facility
        }
        fn spec(&self) -> &str {
            "stub"
        }
        fn prototype_name(&self) -> &str {
            self.name
        }
        fn lifetime(&self) -> i64 {
            self.lifetime
        }
        fn clone_template(&self) -> Box<dyn Agent> {
            Box::new(Stub {
                name: self.name,
                lifetime: self.lifetime,
            })
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn insert_attaches_child_to_parent() {
        let mut tree = AgentTree::new();
        let parent_id = tree.allocate_id();
        tree.insert(
            parent_id,
            Box::new(Stub { name: "region", lifetime: -1 }),
            None,
            0,
        )
        .unwrap();
        let child_id = tree.allocate_id();
        tree.insert(
            child_id,
            Box::new(Stub { name: "inst", lifetime: -1 }),
            Some(parent_id),
            0,
        )
        .unwrap();
        assert_eq!(tree.node(parent_id).unwrap().children(), &[child_id]);
        assert_eq!(tree.node(child_id).unwrap().parent(), Some(parent_id));
    }

    #[test]
    fn decommission_order_visits_children_before_parent() {
        let mut tree = AgentTree::new();
        let parent_id = tree.allocate_id();
        tree.insert(parent_id, Box::new(Stub { name: "p", lifetime: -1 }), None, 0)
            .unwrap();
        let child_id = tree.allocate_id();
        tree.insert(
            child_id,
            Box::new(Stub { name: "c", lifetime: -1 }),
            Some(parent_id),
            0,
        )
        .unwrap();
        let order = tree.decommission_order(parent_id);
        assert_eq!(order, vec![child_id, parent_id]);
    }

    #[test]
    fn take_then_restore_round_trips_the_agent() {
        let mut tree = AgentTree::new();
        let id = tree.allocate_id();
        tree.insert(id, Box::new(Stub { name: "a", lifetime: -1 }), None, 0)
            .unwrap();
        let agent = tree.take(id).unwrap();
        assert!(tree.node(id).is_some());
        tree.restore(id, agent).unwrap();
        assert_eq!(tree.node(id).unwrap().agent().prototype_name(), "a");
    }

    #[test]
    fn live_ids_are_ordered_by_enter_time_then_id() {
        let mut tree = AgentTree::new();
        let a = tree.allocate_id();
        tree.insert(a, Box::new(Stub { name: "a", lifetime: -1 }), None, 5).unwrap();
        let b = tree.allocate_id();
        tree.insert(b, Box::new(Stub { name: "b", lifetime: -1 }), None, 2).unwrap();
        assert_eq!(tree.live_ids_by_enter_order(), vec![b, a]);
    }
}
