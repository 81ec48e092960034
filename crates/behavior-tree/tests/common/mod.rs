#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use behavior_tree::{LeafAction, NodeGraph, NodeId, Status, Strategy, leaf};

/// Argument bundle that scripts each leaf's results and records calls.
///
/// Once a leaf's queue is down to one outcome, that outcome repeats.
#[derive(Default)]
pub struct Blackboard {
    outcomes: Mutex<HashMap<NodeId, VecDeque<Status>>>,
    calls: Mutex<Vec<NodeId>>,
}

impl Blackboard {
    pub fn with(self, id: NodeId, outcomes: &[Status]) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .insert(id, outcomes.iter().copied().collect());
        self
    }

    pub fn next(&self, id: NodeId) -> Status {
        self.calls.lock().unwrap().push(id);
        let mut outcomes = self.outcomes.lock().unwrap();
        let Some(queue) = outcomes.get_mut(&id) else {
            return Status::Success;
        };
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue[0]
        }
    }

    pub fn take_calls(&self) -> Vec<NodeId> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }
}

/// Leaf that reports the blackboard's next scripted outcome for `id`.
pub fn scripted(id: NodeId) -> LeafAction<Blackboard> {
    leaf(move |board: &Blackboard| Ok(board.next(id)))
}

pub fn graph_with_leaves(ids: &[NodeId]) -> NodeGraph<Blackboard> {
    let mut graph = NodeGraph::new();
    for &id in ids {
        assert!(graph.add_node(id, Strategy::Leaf.index(), &[], Some(scripted(id))));
    }
    graph
}
