//! Id-addressed behavior tree engine.
//!
//! Nodes live in a shared [`NodeGraph`] keyed by integer id. Each node has a
//! [`Strategy`] (leaf, composite or decorator), child ids and, for leaves, a
//! [`Behavior`] invoked with the argument bundle passed to the tick.
//!
//! - **Redefinition in place**: defining an existing id rewrites that node;
//!   parents and handles pick up the new definition on their next tick
//! - **Per-handle state**: memoized composites keep their resume cursor in the
//!   [`ExecutionContext`] owned by each [`TreeHandle`], so many handles can
//!   share one graph
//! - **Errors never escape a tick**: failing or panicking actions report
//!   [`Status::Error`], which short-circuits every composite
//! - **Profiling**: call counts and elapsed time per `(root, node)`, dumped as
//!   JSON or a fixed binary layout (`profiler` feature)
//!
//! # Architecture
//!
//! - [`Status`]: Tick outcome and its integer codes
//! - [`Node`] / [`Strategy`]: One graph entry and its tick function
//! - [`NodeGraph`]: Definition, validation and lookup
//! - [`TreeHandle`]: Root id plus execution context
//! - [`Profiler`]: Sample recorder and dumps
//! - [`Host`] / [`Root`]: Integer-level surface for embedding bridges

pub mod behavior;
pub mod composite;
pub mod config;
pub mod context;
pub mod decorator;
pub mod error;
pub mod graph;
pub mod host;
pub mod node;
pub mod profiler;
pub mod status;
pub mod tree;

// Re-export core types for ergonomic API
pub use behavior::{Behavior, Coded, LeafAction, coded, leaf};
pub use config::EngineConfig;
pub use context::ExecutionContext;
pub use error::{ActionError, GraphError, HostError, ProfilerError};
pub use graph::NodeGraph;
pub use host::{Host, Root};
pub use node::{Node, NodeId, Strategy, TickScope, trace_line};
pub use profiler::{Collection, ProfileDump, ProfileReport, ProfileSample, Profiler, RootId};
pub use status::Status;
pub use tree::TreeHandle;
