//! Condition evaluation.
//!
//! `evaluate` is a pure, total function: it never panics and never returns
//! an error for any representable condition tree. Everything ambiguous —
//! unresolved paths, operands of incomparable shapes, dangling operand
//! references — evaluates to `false`, never to `true`. A defect in one
//! policy's condition can therefore deny, but never grant.
//!
//! `and`/`or` short-circuit at the first decided sub-condition.

use std::cmp::Ordering;

use serde_json::Value;

use crate::condition::Condition;
use crate::context::EvaluationContext;

/// Evaluates a condition tree against the context. Fail-closed and total.
pub fn evaluate(condition: &Condition, ctx: &EvaluationContext) -> bool {
    match condition {
        Condition::And(subs) => subs.iter().all(|sub| evaluate(sub, ctx)),
        Condition::Or(subs) => subs.iter().any(|sub| evaluate(sub, ctx)),
        Condition::Not(sub) => !evaluate(sub, ctx),

        Condition::Eq(path, operand) => {
            match (ctx.resolve(path), resolve_operand(ctx, operand)) {
                (Some(lhs), Some(rhs)) => lhs == rhs,
                _ => false,
            }
        }
        Condition::Gt(path, operand) => ordered(ctx, path, operand) == Some(Ordering::Greater),
        Condition::Lt(path, operand) => ordered(ctx, path, operand) == Some(Ordering::Less),

        Condition::In(path, list) => ctx.resolve(path).is_some_and(|value| list.contains(value)),
        Condition::Contains(path, item) => ctx
            .resolve(path)
            .and_then(Value::as_array)
            .is_some_and(|values| values.contains(item)),
    }
}

/// Resolves the operand side of `eq`/`gt`/`lt`.
///
/// A string operand rooted at `user` or `context` is a reference to another
/// context value (`{"eq": ["user.id", "context.params.userId"]}` compares
/// two resolved values). An unresolvable reference yields `None`, which the
/// caller treats as non-matching. Any other operand is a literal.
fn resolve_operand<'a>(ctx: &'a EvaluationContext, operand: &'a Value) -> Option<&'a Value> {
    match operand {
        Value::String(s) if is_path_reference(s) => ctx.resolve(s),
        _ => Some(operand),
    }
}

fn is_path_reference(s: &str) -> bool {
    s == "user" || s == "context" || s.starts_with("user.") || s.starts_with("context.")
}

/// Ordered comparison of the resolved path value against the operand.
///
/// Numbers compare numerically, strings lexicographically; every other
/// pairing is incomparable (`None`), so `gt`/`lt` over mixed or non-ordered
/// shapes are false rather than faults.
fn ordered(ctx: &EvaluationContext, path: &str, operand: &Value) -> Option<Ordering> {
    let lhs = ctx.resolve(path)?;
    let rhs = resolve_operand(ctx, operand)?;
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
