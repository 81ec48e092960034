//! Error types surfaced by the engine.
//!
//! None of these cross a tick: leaf failures become [`Status::Error`],
//! rejected definitions become `false` at the boolean surface. The typed
//! errors exist so callers that want the reason can get it.
//!
//! [`Status::Error`]: crate::Status::Error

use thiserror::Error;

use crate::NodeId;

/// Reasons a node definition is rejected. The graph is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("strategy index {index} is out of range")]
    UnknownStrategy { index: usize },

    #[error("node {id} uses the leaf strategy but has no leaf action")]
    MissingLeafAction { id: NodeId },

    #[error("node {id} references undefined child {child}")]
    UnknownChild { id: NodeId, child: NodeId },

    #[error("node {id} lists itself as a child")]
    SelfReference { id: NodeId },
}

/// Failures raised while invoking a leaf action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("leaf action failed: {0}")]
    Failed(String),

    #[error("leaf action returned {0}, which is not a status code")]
    Uncoercible(i64),

    #[error("leaf action panicked")]
    Panicked,
}

impl ActionError {
    /// Convenience constructor for action bodies.
    pub fn failed(message: impl Into<String>) -> Self {
        ActionError::Failed(message.into())
    }
}

/// Failures encoding or decoding a profiler dump.
#[derive(Debug, Error)]
pub enum ProfilerError {
    #[error("binary profile encoding failed: {0}")]
    Encode(#[source] bincode::Error),

    #[error("binary profile is malformed: {0}")]
    Decode(#[source] bincode::Error),

    #[error("JSON profile encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Argument errors at the embedding surface.
///
/// These mirror type errors a host language would raise before the graph is
/// consulted; validation failures are reported as `Ok(false)` instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("add_node requires children or a leaf action")]
    MissingDefinition,

    #[error("{what} {value} does not fit a node id")]
    IdOutOfRange { what: &'static str, value: i64 },
}

pub type Result<T, E = GraphError> = std::result::Result<T, E>;
