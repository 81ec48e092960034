//! Per-instance execution state.

use std::collections::HashMap;

use crate::NodeId;

/// Cursors of memoized composites, keyed by node id.
///
/// A cursor is the index of the child a memoized node resumes from. Absent
/// entries read as 0. Each independently ticking tree owns one context;
/// sharing a context between trees makes them resume each other's children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionContext {
    cursors: HashMap<NodeId, usize>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutable cursor for `node`, created at 0 on first access.
    pub fn cursor_for(&mut self, node: NodeId) -> &mut usize {
        self.cursors.entry(node).or_insert(0)
    }

    pub fn cursor(&self, node: NodeId) -> usize {
        self.cursors.get(&node).copied().unwrap_or(0)
    }

    /// Restarts `node` from its first child on the next tick.
    pub fn reset(&mut self, node: NodeId) {
        self.cursors.remove(&node);
    }

    /// Restarts every node.
    pub fn clear(&mut self) {
        self.cursors.clear();
    }

    /// Number of nodes currently parked away from their first child.
    pub fn parked(&self) -> usize {
        self.cursors.values().filter(|&&c| c != 0).count()
    }
}
