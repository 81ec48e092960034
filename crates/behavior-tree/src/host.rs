//! Embedding surface.
//!
//! [`Host`] and [`Root`] present the engine the way an embedding bridge sees
//! it: integer ids and strategy indices, optional children and leaf action,
//! integer tick results and a profiler addressed through the host. A bridge
//! into another runtime marshals its arguments into these calls and leaves
//! all semantics to the engine.

use std::sync::Arc;

use crate::behavior::LeafAction;
use crate::error::{HostError, ProfilerError};
use crate::profiler::ProfileDump;
use crate::{EngineConfig, NodeGraph, NodeId, Profiler, Strategy, TreeHandle};

/// Owns the node graph and a handle to the profiler.
pub struct Host<A> {
    graph: NodeGraph<A>,
    profiler: Arc<Profiler>,
    config: EngineConfig,
}

impl<A> Default for Host<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Host<A> {
    /// Host with default configuration and the process-wide profiler.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Host configured from `BT_*` environment variables.
    pub fn from_env() -> Self {
        Self::with_config(EngineConfig::from_env())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_profiler(config, Profiler::global())
    }

    /// Host recording into `profiler` instead of the process-wide one.
    pub fn with_profiler(config: EngineConfig, profiler: Arc<Profiler>) -> Self {
        if config.profiler_enabled {
            profiler.set_enabled(true);
        }
        Self {
            graph: NodeGraph::new(),
            profiler,
            config,
        }
    }

    pub fn graph(&self) -> &NodeGraph<A> {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut NodeGraph<A> {
        &mut self.graph
    }

    pub fn profiler(&self) -> &Arc<Profiler> {
        &self.profiler
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Defines node `id`; see [`NodeGraph::define`] for validation.
    ///
    /// Returns whether `id` resolves after the call. A rejected redefinition
    /// of an existing id therefore still returns `Ok(true)`; the previous
    /// definition is untouched.
    ///
    /// # Errors
    ///
    /// - [`HostError::MissingDefinition`] if neither children nor an action
    ///   is given
    /// - [`HostError::IdOutOfRange`] if an id does not fit a [`NodeId`]
    pub fn add_node(
        &mut self,
        id: i64,
        index: i64,
        children: Option<&[i64]>,
        function: Option<LeafAction<A>>,
    ) -> Result<bool, HostError> {
        if children.is_none() && function.is_none() {
            return Err(HostError::MissingDefinition);
        }

        let id = node_id("node id", id)?;
        let children = children
            .unwrap_or_default()
            .iter()
            .map(|&child| node_id("child id", child))
            .collect::<Result<Vec<_>, _>>()?;
        // Negative indices select no strategy and are rejected by validation.
        let index = usize::try_from(index).unwrap_or(usize::MAX);

        self.graph.add_node(id, index, &children, function);
        Ok(self.graph.contains(id))
    }

    /// Strategy names and their indices.
    pub fn functions_index() -> Vec<(&'static str, usize)> {
        Strategy::index_table()
    }

    pub fn is_profiler_enabled(&self) -> bool {
        self.profiler.is_enabled()
    }

    /// Returns whether profiling is now enabled; without the `profiler`
    /// feature a request to enable only logs a warning.
    pub fn enable_profiler(&self, enabled: bool) -> bool {
        self.profiler.set_enabled(enabled)
    }

    pub fn reset_profiler(&self) {
        self.profiler.reset();
    }

    pub fn dump_profile(&self, binary: bool) -> Result<ProfileDump, ProfilerError> {
        self.profiler.dump(binary)
    }
}

fn node_id(what: &'static str, value: i64) -> Result<NodeId, HostError> {
    NodeId::try_from(value).map_err(|_| HostError::IdOutOfRange { what, value })
}

/// Tree handle with integer results, as seen by an embedding bridge.
#[derive(Debug, Clone)]
pub struct Root {
    handle: TreeHandle,
    tick_result: i32,
}

impl Root {
    /// Binds `node_id` against the host's graph.
    ///
    /// Tracing starts on when the host was configured with `trace_ticks`.
    pub fn new<A>(host: &Host<A>, node_id: NodeId) -> Self {
        let mut handle = TreeHandle::new(host.graph(), node_id);
        handle.set_debug(host.config.trace_ticks);
        Self {
            handle,
            tick_result: 0,
        }
    }

    /// Root bound to node id 0.
    pub fn default_for<A>(host: &Host<A>) -> Self {
        Self::new(host, 0)
    }

    pub fn node_id(&self) -> NodeId {
        self.handle.node_id()
    }

    /// Rebinds to `node_id` and clears the tick result.
    pub fn set_node_id<A>(&mut self, host: &Host<A>, node_id: NodeId) {
        self.handle.set_node_id(host.graph(), node_id);
        self.tick_result = 0;
    }

    pub fn can_tick(&self) -> bool {
        self.handle.can_tick()
    }

    /// Status code of the last tick, `0` when unset.
    pub fn tick_result(&self) -> i32 {
        self.tick_result
    }

    pub fn debug(&self) -> bool {
        self.handle.debug()
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.handle.set_debug(debug);
    }

    pub fn handle(&self) -> &TreeHandle {
        &self.handle
    }

    /// Ticks once; samples go to the host's profiler while it is enabled.
    pub fn tick<A>(&mut self, host: &Host<A>, args: &A) {
        self.handle.tick_profiled(host.graph(), args, host.profiler());
        self.tick_result = self.handle.last_code();
    }
}
