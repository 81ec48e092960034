//! Leaf action trait.
//!
//! This module defines the [`Behavior`] trait, the seam through which the
//! engine reaches external code. The engine never inspects an action: it
//! invokes it with the argument bundle passed to the tick, and coerces or
//! suppresses whatever comes back. The trait is generic over the argument
//! bundle type `A`, which is forwarded unchanged from the tree handle.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::{ActionError, NodeId, Status};

/// An action bound to a leaf node.
pub trait Behavior<A>: Send + Sync {
    /// Run the action against the tick's argument bundle.
    ///
    /// # Returns
    ///
    /// - `Ok(status)` with the status the leaf reports
    /// - `Err(_)` if the action could not run; the leaf then reports
    ///   [`Status::Error`]
    fn tick(&self, args: &A) -> Result<Status, ActionError>;
}

/// Shared handle to a leaf action. Redefining a node swaps the handle.
pub type LeafAction<A> = Arc<dyn Behavior<A>>;

/// Blanket implementation for closures returning a status.
impl<A, F> Behavior<A> for F
where
    F: Fn(&A) -> Result<Status, ActionError> + Send + Sync,
{
    #[inline]
    fn tick(&self, args: &A) -> Result<Status, ActionError> {
        self(args)
    }
}

/// Adapts an action that reports integer status codes.
///
/// Codes other than `-1`, `1`, `2` and `4` fail with
/// [`ActionError::Uncoercible`].
pub struct Coded<F> {
    action: F,
}

impl<F> Coded<F> {
    pub fn new(action: F) -> Self {
        Self { action }
    }
}

impl<A, F> Behavior<A> for Coded<F>
where
    F: Fn(&A) -> Result<i64, ActionError> + Send + Sync,
{
    fn tick(&self, args: &A) -> Result<Status, ActionError> {
        let code = (self.action)(args)?;
        Status::from_code(code).ok_or(ActionError::Uncoercible(code))
    }
}

/// Wraps a closure into a [`LeafAction`].
pub fn leaf<A, F>(action: F) -> LeafAction<A>
where
    F: Fn(&A) -> Result<Status, ActionError> + Send + Sync + 'static,
{
    Arc::new(action)
}

/// Wraps an integer-coded closure into a [`LeafAction`].
pub fn coded<A, F>(action: F) -> LeafAction<A>
where
    F: Fn(&A) -> Result<i64, ActionError> + Send + Sync + 'static,
{
    Arc::new(Coded::new(action))
}

/// Invokes a leaf action, mapping every failure to [`Status::Error`].
///
/// Panics are caught here as well; nothing an action does escapes the leaf.
pub(crate) fn invoke<A>(action: &dyn Behavior<A>, args: &A, node: NodeId) -> Status {
    match panic::catch_unwind(AssertUnwindSafe(|| action.tick(args))) {
        Ok(Ok(status)) => status,
        Ok(Err(error)) => {
            tracing::debug!(node, %error, "leaf action failed");
            Status::Error
        }
        Err(_) => {
            tracing::debug!(node, error = %ActionError::Panicked, "leaf action failed");
            Status::Error
        }
    }
}
