//! The condition grammar for ABAC policies.
//!
//! A condition is a tree of exactly seven node kinds: three logical
//! combinators and four comparisons over context paths. The enum is closed:
//! JSON carrying an unrecognized tag fails to deserialize at the
//! administrative boundary and can never reach evaluation.
//!
//! The serde representation is externally tagged with lowercase keys, so
//! conditions round-trip the wire shapes policies are authored in:
//!
//! ```json
//! {
//!   "or": [
//!     { "contains": ["user.roles", "admin"] },
//!     { "eq": ["user.id", "context.params.userId"] }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A boolean condition over the evaluation context.
///
/// Comparison variants carry `(path, operand)` pairs. The path is a
/// dot-separated walk into the context (`user.roles`,
/// `context.params.shopId`); the operand is a JSON literal, except in
/// [`Condition::Eq`]/[`Condition::Gt`]/[`Condition::Lt`] where a string
/// operand rooted at `user` or `context` is itself resolved as a path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    /// True iff all sub-conditions are true. Empty list is true.
    And(Vec<Condition>),
    /// True iff any sub-condition is true. Empty list is false.
    Or(Vec<Condition>),
    /// Negation of the sub-condition.
    Not(Box<Condition>),
    /// Resolved value at the path strictly equals the operand.
    Eq(String, Value),
    /// Resolved value is ordered greater than the operand.
    Gt(String, Value),
    /// Resolved value is ordered less than the operand.
    Lt(String, Value),
    /// Resolved value is a member of the operand list.
    In(String, Vec<Value>),
    /// Resolved value is a list containing the operand.
    Contains(String, Value),
}

impl Condition {
    /// A condition that is always true.
    pub fn always() -> Self {
        Condition::And(Vec::new())
    }

    /// A condition that is always false.
    pub fn never() -> Self {
        Condition::Or(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_shape_roundtrip() {
        let condition = Condition::Or(vec![
            Condition::Contains("user.roles".into(), json!("admin")),
            Condition::Eq("user.id".into(), json!("context.params.userId")),
        ]);

        let value = serde_json::to_value(&condition).expect("serialize");
        assert_eq!(
            value,
            json!({
                "or": [
                    { "contains": ["user.roles", "admin"] },
                    { "eq": ["user.id", "context.params.userId"] },
                ]
            })
        );

        let back: Condition = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back, condition);
    }

    #[test]
    fn nested_combinators_roundtrip() {
        let condition = Condition::And(vec![
            Condition::Not(Box::new(Condition::Eq(
                "user.status".into(),
                json!("suspended"),
            ))),
            Condition::In("context.method".into(), vec![json!("GET"), json!("HEAD")]),
            Condition::Gt("context.body.price".into(), json!(0)),
        ]);

        let json = serde_json::to_string(&condition).expect("serialize");
        let back: Condition = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, condition);
    }

    #[test]
    fn unrecognized_tag_is_rejected_at_parse_time() {
        let malformed = json!({ "xor": [] });
        assert!(serde_json::from_value::<Condition>(malformed).is_err());

        // A malformed sub-node poisons the whole parse, it cannot hide
        // inside a well-formed combinator.
        let nested = json!({ "and": [ { "frobnicate": ["user.id", 1] } ] });
        assert!(serde_json::from_value::<Condition>(nested).is_err());
    }
}
