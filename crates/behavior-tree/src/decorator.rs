//! Single-child strategies.
//!
//! Decorators tick only the first child and transform its result. Extra
//! children are accepted at definition time and never ticked. A decorator
//! without a child reports [`Status::Error`].

use crate::Status;
use crate::node::{Node, TickScope};

fn tick_first<A>(node: &Node<A>, scope: &mut TickScope<'_, A>, args: &A) -> Option<Status> {
    let child = *node.children().first()?;
    Some(scope.tick_child(child, args))
}

/// Returns the first child's result unchanged.
pub(crate) fn tick_node<A>(node: &Node<A>, scope: &mut TickScope<'_, A>, args: &A) -> Status {
    tick_first(node, scope, args).unwrap_or(Status::Error)
}

/// Ticks the child for its side effects and reports `Success`.
pub(crate) fn report_success<A>(
    node: &Node<A>,
    scope: &mut TickScope<'_, A>,
    args: &A,
) -> Status {
    match tick_first(node, scope, args) {
        Some(_) => Status::Success,
        None => Status::Error,
    }
}

/// Ticks the child for its side effects and reports `Failure`.
pub(crate) fn report_failure<A>(
    node: &Node<A>,
    scope: &mut TickScope<'_, A>,
    args: &A,
) -> Status {
    match tick_first(node, scope, args) {
        Some(_) => Status::Failure,
        None => Status::Error,
    }
}

/// Flips `Success` and `Failure`. `Running` and `Error` pass through.
pub(crate) fn revert_status<A>(
    node: &Node<A>,
    scope: &mut TickScope<'_, A>,
    args: &A,
) -> Status {
    tick_first(node, scope, args).map_or(Status::Error, Status::invert)
}
