//! Tree handles: one independently ticking instance of a shared graph.

use crate::node::TickScope;
use crate::{ExecutionContext, NodeGraph, NodeId, Profiler, Status};

/// Binds a root node id to an owned [`ExecutionContext`].
///
/// A handle is `Bound` when its id resolves in the graph it was last bound
/// against, `Unbound` otherwise. Ticking an unbound handle clears the last
/// result and does nothing else.
///
/// Handles only store ids, so a handle survives redefinition of its root:
/// the next tick runs the new definition.
#[derive(Debug, Clone, Default)]
pub struct TreeHandle {
    node_id: NodeId,
    bound: bool,
    last_result: Option<Status>,
    context: ExecutionContext,
    debug: bool,
}

impl TreeHandle {
    /// Creates a handle for `node_id` and resolves it against `graph`.
    pub fn new<A>(graph: &NodeGraph<A>, node_id: NodeId) -> Self {
        Self {
            node_id,
            bound: graph.contains(node_id),
            ..Self::default()
        }
    }

    #[inline]
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// Rebinds the handle to `node_id`.
    ///
    /// The execution context is kept: a memoized node reached through the new
    /// root resumes from whatever cursor it had. Call
    /// [`TreeHandle::reset_context`] to start over.
    pub fn set_node_id<A>(&mut self, graph: &NodeGraph<A>, node_id: NodeId) {
        self.node_id = node_id;
        self.bound = graph.contains(node_id);
        tracing::debug!(node_id, bound = self.bound, "tree handle rebound");
    }

    #[inline]
    pub fn can_tick(&self) -> bool {
        self.bound
    }

    /// Result of the last tick; `None` before the first tick or after an
    /// unbound tick.
    #[inline]
    pub fn last_result(&self) -> Option<Status> {
        self.last_result
    }

    /// Integer form of [`TreeHandle::last_result`], `0` when unset.
    pub fn last_code(&self) -> i32 {
        self.last_result.map_or(Status::UNSET_CODE, Status::code)
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Emit a trace line for every node ticked through this handle.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut ExecutionContext {
        &mut self.context
    }

    /// Restarts every memoized node reached through this handle.
    pub fn reset_context(&mut self) {
        self.context.clear();
    }

    /// Ticks the root once.
    pub fn tick<A>(&mut self, graph: &NodeGraph<A>, args: &A) -> Option<Status> {
        self.run(graph, args, None)
    }

    /// Ticks the root once inside a profiler bracket for this root id.
    ///
    /// Unbound handles do not open a bracket.
    pub fn tick_profiled<A>(
        &mut self,
        graph: &NodeGraph<A>,
        args: &A,
        profiler: &Profiler,
    ) -> Option<Status> {
        if !self.bound {
            return self.run(graph, args, None);
        }
        profiler.start(self.node_id);
        let result = self.run(graph, args, Some(profiler));
        profiler.end();
        result
    }

    fn run<A>(
        &mut self,
        graph: &NodeGraph<A>,
        args: &A,
        profiler: Option<&Profiler>,
    ) -> Option<Status> {
        let root = if self.bound {
            graph.lookup(self.node_id)
        } else {
            None
        };
        let Some(root) = root else {
            self.last_result = None;
            return None;
        };

        let mut scope = TickScope::new(graph, &mut self.context).with_trace(self.debug);
        if let Some(profiler) = profiler {
            scope = scope.with_profiler(profiler);
        }
        let status = root.tick(&mut scope, args);
        self.last_result = Some(status);
        Some(status)
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::{Arc, Mutex};

    use tracing::Level;

    use super::*;
    use crate::{ActionError, Strategy, leaf};

    /// Log sink shared between the subscriber and the test.
    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Runs `f` under a subscriber at `level` and returns what it logged.
    fn captured(level: Level, f: impl FnOnce()) -> String {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(level)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = capture.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    /// Leaf that reports whatever code is stored in the argument bundle.
    fn graph() -> NodeGraph<AtomicI32> {
        let mut graph = NodeGraph::new();
        let action = leaf(|code: &AtomicI32| {
            Ok(Status::from_code(code.load(Ordering::SeqCst) as i64).unwrap_or(Status::Error))
        });
        assert!(graph.add_node(1, Strategy::Leaf.index(), &[], Some(action)));
        assert!(graph.add_node(2, Strategy::RevertStatus.index(), &[1], None));
        graph
    }

    #[test]
    fn unbound_handle_is_inert() {
        let graph = graph();
        let mut handle = TreeHandle::new(&graph, 99);

        assert!(!handle.can_tick());
        assert_eq!(handle.tick(&graph, &AtomicI32::new(1)), None);
        assert_eq!(handle.last_code(), 0);
    }

    #[test]
    fn bound_handle_records_last_result() {
        let graph = graph();
        let mut handle = TreeHandle::new(&graph, 2);

        assert!(handle.can_tick());
        assert_eq!(handle.tick(&graph, &AtomicI32::new(1)), Some(Status::Failure));
        assert_eq!(handle.last_result(), Some(Status::Failure));
        assert_eq!(handle.last_code(), 2);
    }

    #[test]
    fn rebinding_resolves_against_the_graph() {
        let graph = graph();
        let mut handle = TreeHandle::new(&graph, 2);
        handle.tick(&graph, &AtomicI32::new(4));
        assert_eq!(handle.last_result(), Some(Status::Running));

        handle.set_node_id(&graph, 42);
        assert!(!handle.can_tick());
        assert_eq!(handle.tick(&graph, &AtomicI32::new(1)), None);
        assert_eq!(handle.last_result(), None);

        handle.set_node_id(&graph, 1);
        assert!(handle.can_tick());
        assert_eq!(handle.tick(&graph, &AtomicI32::new(1)), Some(Status::Success));
    }

    #[test]
    fn rebinding_keeps_context() {
        let graph = graph();
        let mut handle = TreeHandle::new(&graph, 2);
        *handle.context_mut().cursor_for(7) = 3;

        handle.set_node_id(&graph, 1);
        assert_eq!(handle.context().cursor(7), 3);

        handle.reset_context();
        assert_eq!(handle.context().cursor(7), 0);
    }

    #[cfg(feature = "profiler")]
    #[test]
    fn profiled_tick_brackets_the_root() {
        let graph = graph();
        let profiler = Profiler::new();
        profiler.set_enabled(true);

        let mut handle = TreeHandle::new(&graph, 2);
        handle.tick_profiled(&graph, &AtomicI32::new(1), &profiler);

        let report = profiler.report();
        assert_eq!(report.sample(2, 2).map(|s| s.calls), Some(1));
        assert_eq!(report.sample(2, 1).map(|s| s.calls), Some(1));
        assert_eq!(profiler.current(), None);
    }

    #[test]
    fn debug_handle_traces_every_node_tick() {
        let graph = graph();
        let mut handle = TreeHandle::new(&graph, 2);
        handle.set_debug(true);

        let output = captured(Level::DEBUG, || {
            handle.tick(&graph, &AtomicI32::new(1));
        });

        let lines: Vec<&str> = output
            .lines()
            .filter(|line| line.contains(" - behavior_tree - "))
            .collect();
        assert_eq!(lines.len(), 4, "{output}");
        assert!(lines[0].ends_with("tick : node 2"));
        assert!(lines[1].ends_with("tick : node 1"));
        assert!(lines[2].ends_with("Success : node 1"));
        assert!(lines[3].ends_with("Failure : node 2"));
    }

    #[test]
    fn handle_without_debug_emits_no_trace_lines() {
        let graph = graph();
        let mut handle = TreeHandle::new(&graph, 2);

        let output = captured(Level::DEBUG, || {
            handle.tick(&graph, &AtomicI32::new(1));
        });

        assert!(!output.contains(" - behavior_tree - "), "{output}");
        assert!(!output.contains(" : node "), "{output}");
    }

    #[test]
    fn failing_leaf_is_quiet_at_info() {
        let mut graph = NodeGraph::new();
        let failing = leaf(|_: &()| -> Result<Status, ActionError> {
            Err(ActionError::failed("sensor offline"))
        });
        assert!(graph.add_node(1, Strategy::Leaf.index(), &[], Some(failing)));
        let mut handle = TreeHandle::new(&graph, 1);

        let output = captured(Level::INFO, || {
            for _ in 0..3 {
                assert_eq!(handle.tick(&graph, &()), Some(Status::Error));
            }
        });
        assert_eq!(output, "");

        let output = captured(Level::DEBUG, || {
            handle.tick(&graph, &());
        });
        assert!(output.contains("leaf action failed"), "{output}");
    }
}
