//! Composite strategies.
//!
//! Composite nodes control the execution flow of multiple children. Two
//! families live here:
//!
//! - **Stateless** (`run_until_success`, `run_until_fail`, `sequence_run`):
//!   every tick starts from the first child.
//! - **Memoized** (`mem_*`): the index of a child that reported `Running` is
//!   parked in the [`ExecutionContext`] and the next tick resumes there.
//!
//! The cursor lives in the caller's context, never in the node, which is what
//! lets one graph back several independently ticking trees.
//!
//! [`ExecutionContext`]: crate::ExecutionContext

use crate::Status;
use crate::node::{Node, TickScope};

/// Ticks children in order until `stop` accepts a result.
///
/// Returns the accepted result, or the last result if no child was accepted,
/// or `empty` if there are no children.
fn run_until<A>(
    node: &Node<A>,
    scope: &mut TickScope<'_, A>,
    args: &A,
    stop: fn(Status) -> bool,
    empty: Status,
) -> Status {
    let mut status = empty;
    for &child in node.children() {
        status = scope.tick_child(child, args);
        if stop(status) {
            return status;
        }
    }
    status
}

/// Resumes from the parked cursor and ticks children until `stop` accepts a
/// result.
///
/// An accepted `Running` parks the cursor on that child; any other accepted
/// result clears it. Running off the end clears the cursor and reports
/// `exhausted`.
fn resume_until<A>(
    node: &Node<A>,
    scope: &mut TickScope<'_, A>,
    args: &A,
    stop: fn(Status) -> bool,
    exhausted: Status,
) -> Status {
    let id = node.id();
    let children = node.children();

    let mut cursor = scope.context.cursor(id);
    // The node may have been redefined with fewer children since it parked.
    if cursor >= children.len() {
        cursor = 0;
    }

    while cursor < children.len() {
        let status = scope.tick_child(children[cursor], args);
        if stop(status) {
            if status.is_running() {
                *scope.context.cursor_for(id) = cursor;
            } else {
                scope.context.reset(id);
            }
            return status;
        }
        cursor += 1;
    }

    scope.context.reset(id);
    exhausted
}

/// Selector: first result in the success set wins.
pub(crate) fn run_until_success<A>(
    node: &Node<A>,
    scope: &mut TickScope<'_, A>,
    args: &A,
) -> Status {
    run_until(node, scope, args, Status::in_success_set, Status::Failure)
}

/// First result in the failure set wins.
pub(crate) fn run_until_fail<A>(
    node: &Node<A>,
    scope: &mut TickScope<'_, A>,
    args: &A,
) -> Status {
    run_until(node, scope, args, Status::in_failure_set, Status::Success)
}

/// Strict sequence: anything but exact `Success` stops it.
pub(crate) fn sequence_run<A>(
    node: &Node<A>,
    scope: &mut TickScope<'_, A>,
    args: &A,
) -> Status {
    run_until(node, scope, args, |s| !s.is_success(), Status::Success)
}

/// Memoized selector: stops on the success or running set, `Failure` when
/// out of children.
pub(crate) fn mem_run_until_success<A>(
    node: &Node<A>,
    scope: &mut TickScope<'_, A>,
    args: &A,
) -> Status {
    resume_until(
        node,
        scope,
        args,
        |s| s.in_success_set() || s.in_running_set(),
        Status::Failure,
    )
}

/// Memoized run-until-fail: stops on the failure or running set, `Success`
/// when out of children.
pub(crate) fn mem_run_until_fail<A>(
    node: &Node<A>,
    scope: &mut TickScope<'_, A>,
    args: &A,
) -> Status {
    resume_until(
        node,
        scope,
        args,
        |s| s.in_failure_set() || s.in_running_set(),
        Status::Success,
    )
}

/// Memoized strict sequence: stops on anything but exact `Success`,
/// `Success` when out of children.
pub(crate) fn mem_sequence_run<A>(
    node: &Node<A>,
    scope: &mut TickScope<'_, A>,
    args: &A,
) -> Status {
    resume_until(node, scope, args, |s| !s.is_success(), Status::Success)
}
