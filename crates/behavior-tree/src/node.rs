//! Graph vertices and strategy dispatch.
//!
//! A [`Node`] carries no execution state. Everything a tick mutates lives in
//! the [`TickScope`]: the caller's [`ExecutionContext`] and, when profiling,
//! the [`Profiler`]. Children are stored as ids and resolved through the
//! graph on every tick, so redefining a node never leaves a parent pointing
//! at stale content.

use std::fmt;
use std::time::Instant;

use strum::{EnumCount, IntoEnumIterator};

use crate::behavior::{self, LeafAction};
use crate::{ExecutionContext, NodeGraph, Profiler, Status, composite, decorator};

/// Identifier of a node within a [`NodeGraph`].
pub type NodeId = i32;

/// Tick algorithm selected for a node.
///
/// The discriminant is the strategy index used by [`NodeGraph::add_node`];
/// the string form is the name exposed at the embedding boundary.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::IntoStaticStr,
    strum::EnumCount,
    strum::EnumIter,
    strum::FromRepr,
)]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum Strategy {
    /// Invoke the bound leaf action.
    #[strum(serialize = "tick_leaf")]
    Leaf = 0,
    /// Tick the first child and return its result.
    #[strum(serialize = "tick_node")]
    Passthrough = 1,
    /// Tick children until one reports a result in the success set.
    #[strum(serialize = "run_until_success")]
    Selector = 2,
    /// Tick children until one reports a result in the failure set.
    #[strum(serialize = "run_until_fail")]
    SequenceToFail = 3,
    /// Tick children until one reports anything but exact success.
    #[strum(serialize = "sequence_run")]
    Sequence = 4,
    /// Selector that resumes from its running child.
    #[strum(serialize = "mem_run_until_success")]
    MemSelector = 5,
    /// Sequence-to-fail that resumes from its running child.
    #[strum(serialize = "mem_run_until_fail")]
    MemSequenceToFail = 6,
    /// Strict sequence that resumes from its running child.
    #[strum(serialize = "mem_sequence_run")]
    MemSequence = 7,
    /// Tick the first child, report `Success`.
    ReportSuccess = 8,
    /// Tick the first child, report `Failure`.
    ReportFailure = 9,
    /// Tick the first child, flip `Success` and `Failure`.
    RevertStatus = 10,
}

impl Strategy {
    /// Resolves a strategy index.
    pub fn from_index(index: usize) -> Option<Self> {
        u8::try_from(index).ok().and_then(Strategy::from_repr)
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// `(name, index)` pairs for every strategy, in index order.
    pub fn index_table() -> Vec<(&'static str, usize)> {
        Strategy::iter().map(|s| (s.name(), s.index())).collect()
    }

    /// Strategies that keep a cursor in the [`ExecutionContext`].
    pub fn is_memoized(self) -> bool {
        matches!(
            self,
            Strategy::MemSelector | Strategy::MemSequenceToFail | Strategy::MemSequence
        )
    }
}

type TickFn<A> = fn(&Node<A>, &mut TickScope<'_, A>, &A) -> Status;

/// One vertex of a [`NodeGraph`].
pub struct Node<A> {
    id: NodeId,
    strategy: Strategy,
    children: Vec<NodeId>,
    action: Option<LeafAction<A>>,
}

impl<A> Node<A> {
    /// Tick algorithms indexed by [`Strategy::index`].
    const DISPATCH: [TickFn<A>; Strategy::COUNT] = [
        tick_leaf::<A>,
        decorator::tick_node::<A>,
        composite::run_until_success::<A>,
        composite::run_until_fail::<A>,
        composite::sequence_run::<A>,
        composite::mem_run_until_success::<A>,
        composite::mem_run_until_fail::<A>,
        composite::mem_sequence_run::<A>,
        decorator::report_success::<A>,
        decorator::report_failure::<A>,
        decorator::revert_status::<A>,
    ];

    pub(crate) fn new(
        id: NodeId,
        strategy: Strategy,
        children: Vec<NodeId>,
        action: Option<LeafAction<A>>,
    ) -> Self {
        Self {
            id,
            strategy,
            children,
            action,
        }
    }

    /// Overwrites this node's content, keeping its identity.
    pub(crate) fn redefine(
        &mut self,
        strategy: Strategy,
        children: Vec<NodeId>,
        action: Option<LeafAction<A>>,
    ) {
        self.strategy = strategy;
        self.children = children;
        self.action = action;
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[inline]
    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    /// Ticks this node and, through its strategy, its subtree.
    ///
    /// When the scope carries an enabled profiler the elapsed time of the
    /// whole subtree is pushed as one sample for this node.
    pub fn tick(&self, scope: &mut TickScope<'_, A>, args: &A) -> Status {
        let started = scope.sampling().then(Instant::now);
        if scope.trace {
            trace_event("tick", self.id);
        }

        let status = (Self::DISPATCH[self.strategy.index()])(self, scope, args);

        if let Some(started) = started
            && let Some(profiler) = scope.profiler
        {
            let elapsed = u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX);
            profiler.add_sample(self.id, elapsed);
        }
        if scope.trace {
            trace_event(&format!("{status:?}"), self.id);
        }
        status
    }
}

impl<A> fmt::Debug for Node<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("strategy", &self.strategy)
            .field("children", &self.children)
            .field("has_action", &self.action.is_some())
            .finish()
    }
}

fn tick_leaf<A>(node: &Node<A>, _scope: &mut TickScope<'_, A>, args: &A) -> Status {
    match node.action.as_deref() {
        Some(action) => behavior::invoke(action, args, node.id),
        None => Status::Error,
    }
}

/// Everything one tick may touch besides the argument bundle.
pub struct TickScope<'a, A> {
    graph: &'a NodeGraph<A>,
    pub(crate) context: &'a mut ExecutionContext,
    profiler: Option<&'a Profiler>,
    trace: bool,
}

impl<'a, A> TickScope<'a, A> {
    pub fn new(graph: &'a NodeGraph<A>, context: &'a mut ExecutionContext) -> Self {
        Self {
            graph,
            context,
            profiler: None,
            trace: false,
        }
    }

    /// Pushes samples into `profiler` while it is enabled.
    pub fn with_profiler(mut self, profiler: &'a Profiler) -> Self {
        self.profiler = Some(profiler);
        self
    }

    /// Emits a trace event around every node tick.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    #[inline]
    fn sampling(&self) -> bool {
        self.profiler.is_some_and(Profiler::is_enabled)
    }

    /// Resolves `child` through the graph and ticks it.
    ///
    /// Child ids are validated when a node is defined and nodes are never
    /// removed, so a miss only happens when a scope is built over a graph the
    /// node does not belong to.
    pub(crate) fn tick_child(&mut self, child: NodeId, args: &A) -> Status {
        let graph = self.graph;
        match graph.lookup(child) {
            Some(node) => node.tick(self, args),
            None => {
                tracing::warn!(child, "child does not resolve in this graph");
                Status::Error
            }
        }
    }
}

/// Formats a trace line: `<timestamp> - behavior_tree - <event> : node <id>`.
pub fn trace_line(event: &str, node: NodeId) -> String {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    format!("{timestamp} - behavior_tree - {event} : node {node}")
}

fn trace_event(event: &str, node: NodeId) {
    tracing::debug!(target: "behavior_tree", "{}", trace_line(event, node));
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn strategy_indices_follow_the_table() {
        assert_eq!(Strategy::from_index(0), Some(Strategy::Leaf));
        assert_eq!(Strategy::from_index(7), Some(Strategy::MemSequence));
        assert_eq!(Strategy::from_index(10), Some(Strategy::RevertStatus));
        assert_eq!(Strategy::from_index(11), None);
        assert_eq!(Strategy::from_index(usize::MAX), None);
    }

    #[test]
    fn strategy_names_round_trip() {
        let table = Strategy::index_table();
        assert_eq!(table.len(), Strategy::COUNT);
        assert_eq!(table[0], ("tick_leaf", 0));
        assert_eq!(table[4], ("sequence_run", 4));
        assert_eq!(table[10], ("revert_status", 10));

        for (name, index) in table {
            let parsed = Strategy::from_str(name).unwrap();
            assert_eq!(parsed.index(), index);
        }
    }

    #[test]
    fn only_mem_strategies_are_memoized() {
        let memoized: Vec<_> = Strategy::iter().filter(|s| s.is_memoized()).collect();
        assert_eq!(
            memoized,
            vec![
                Strategy::MemSelector,
                Strategy::MemSequenceToFail,
                Strategy::MemSequence
            ]
        );
    }

    #[test]
    fn trace_line_names_the_node() {
        let line = trace_line("tick", 42);
        assert!(line.ends_with(" - behavior_tree - tick : node 42"));
    }
}
