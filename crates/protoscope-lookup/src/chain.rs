//! Locating the starter call of a fluent builder/query chain.

use protoscope_core::ExprId;
use protoscope_hir::{ExprArena, ExprKind};

/// Calls that open a fluent chain when invoked without arguments.
pub const STARTERS: [&str; 4] = ["create", "with", "find", "builder"];

/// Finds the starter call (`create()`, `with()`, `find()`, `builder()`) that
/// `call` belongs to.
///
/// A call inside a lambda continues from the call the lambda is passed to;
/// then the qualifier chain is searched depth-first. Returns `None` when no
/// starter is reachable or `call` is not a method call.
pub fn find_root(arena: &ExprArena, call: ExprId) -> Option<ExprId> {
    let ExprKind::MethodCall { name, args, .. } = &arena.get(call)?.kind else {
        return None;
    };
    if args.is_empty() && STARTERS.contains(&name.as_str()) {
        return Some(call);
    }

    let mut current = call;
    if let Some(lambda) = arena.enclosing_lambda(call) {
        if let Some(outer) = arena.enclosing_call(lambda) {
            current = outer;
        }
    }

    let ExprKind::MethodCall { receiver, .. } = &arena.get(current)?.kind else {
        return None;
    };
    let receiver = (*receiver)?;
    match arena.get(receiver)?.kind {
        ExprKind::MethodCall { .. } => find_root(arena, receiver),
        _ => None,
    }
}
