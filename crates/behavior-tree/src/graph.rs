//! Id-keyed node registry.
//!
//! The graph owns every [`Node`]. Nodes refer to their children by id and
//! are always resolved through the graph, so there is exactly one node per
//! id and redefining an id rewrites that node in place: parents and tree
//! handles bound to the id see the new definition on their next tick with no
//! relinking.
//!
//! # Phases
//!
//! Definition takes `&mut self` and ticking takes `&self`, so the borrow
//! checker keeps construction and execution from overlapping. Any number of
//! handles may tick a shared `&NodeGraph` from different threads as long as
//! each brings its own [`ExecutionContext`].
//!
//! Only direct self-reference is rejected. Because children must exist
//! before their parent is defined, cycles can only be introduced by
//! redefining an existing node; such cycles are not detected.

use std::collections::HashMap;

use crate::behavior::LeafAction;
use crate::error::{GraphError, Result};
use crate::node::{Node, NodeId, Strategy, TickScope};
use crate::{ExecutionContext, Status};

/// Shared registry of all nodes, keyed by id.
pub struct NodeGraph<A> {
    nodes: HashMap<NodeId, Node<A>>,
}

impl<A> Default for NodeGraph<A> {
    fn default() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }
}

impl<A> NodeGraph<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines or redefines node `id`.
    ///
    /// Validation runs before anything is written: on error the graph is
    /// exactly as it was, including any previous definition of `id`.
    ///
    /// # Errors
    ///
    /// - [`GraphError::UnknownStrategy`] if `strategy_index` selects no strategy
    /// - [`GraphError::MissingLeafAction`] if the leaf strategy has no action
    /// - [`GraphError::SelfReference`] if `id` is among `children`
    /// - [`GraphError::UnknownChild`] if a child id is not yet defined
    pub fn define(
        &mut self,
        id: NodeId,
        strategy_index: usize,
        children: &[NodeId],
        action: Option<LeafAction<A>>,
    ) -> Result<()> {
        let strategy = self.validate(id, strategy_index, children, action.is_some())?;

        match self.nodes.get_mut(&id) {
            Some(node) => {
                tracing::debug!(id, %strategy, "redefining node in place");
                node.redefine(strategy, children.to_vec(), action);
            }
            None => {
                tracing::trace!(id, %strategy, "defining node");
                self.nodes
                    .insert(id, Node::new(id, strategy, children.to_vec(), action));
            }
        }
        Ok(())
    }

    /// Boolean form of [`NodeGraph::define`].
    ///
    /// Returns `false` when the definition is rejected; the reason is logged
    /// at debug level.
    pub fn add_node(
        &mut self,
        id: NodeId,
        strategy_index: usize,
        children: &[NodeId],
        action: Option<LeafAction<A>>,
    ) -> bool {
        match self.define(id, strategy_index, children, action) {
            Ok(()) => true,
            Err(error) => {
                tracing::debug!(id, %error, "node definition rejected");
                false
            }
        }
    }

    fn validate(
        &self,
        id: NodeId,
        strategy_index: usize,
        children: &[NodeId],
        has_action: bool,
    ) -> Result<Strategy> {
        let strategy = Strategy::from_index(strategy_index).ok_or(GraphError::UnknownStrategy {
            index: strategy_index,
        })?;

        if strategy == Strategy::Leaf && !has_action {
            return Err(GraphError::MissingLeafAction { id });
        }

        if children.contains(&id) {
            return Err(GraphError::SelfReference { id });
        }

        if let Some(&child) = children.iter().find(|&&c| !self.nodes.contains_key(&c)) {
            return Err(GraphError::UnknownChild { id, child });
        }

        Ok(strategy)
    }

    #[inline]
    pub fn lookup(&self, id: NodeId) -> Option<&Node<A>> {
        self.nodes.get(&id)
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Defined ids, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Ticks `root` with a caller-supplied context.
    ///
    /// Returns `None` if `root` is not defined. Use a [`TreeHandle`] to keep
    /// the context and last result together.
    ///
    /// [`TreeHandle`]: crate::TreeHandle
    pub fn tick(&self, root: NodeId, args: &A, context: &mut ExecutionContext) -> Option<Status> {
        let node = self.lookup(root)?;
        Some(node.tick(&mut TickScope::new(self, context), args))
    }
}
