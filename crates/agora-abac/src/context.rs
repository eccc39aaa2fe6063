//! The merged evaluation context for condition evaluation.
//!
//! Built per decision from the authenticated subject and the caller-supplied
//! request context, never persisted:
//!
//! ```json
//! {
//!   "user": { "id": "...", "email": "...", "roles": [...],
//!             "isVerifiedSeller": true, "attributes": {...}, "status": "active" },
//!   "context": { "params": {...}, "query": {...}, "body": {...},
//!                "ip": "...", "method": "...", "path": "...", "timestamp": ... }
//! }
//! ```

use agora_types::Subject;
use serde_json::{Map, Value, json};

/// Request-scoped attribute context, resolved by dot-separated paths.
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    root: Value,
}

impl EvaluationContext {
    /// Merges the subject and the caller-supplied request context.
    ///
    /// A non-object `request` is normalized to an empty object; the request
    /// side is caller-supplied and must not be able to break evaluation.
    pub fn new(subject: &Subject, request: Value) -> Self {
        let request = match request {
            Value::Object(map) => Value::Object(map),
            _ => Value::Object(Map::new()),
        };
        // Subject serialization is infallible for the derived shape; fall
        // back to an empty user object rather than failing the decision.
        let user = serde_json::to_value(subject).unwrap_or_else(|_| Value::Object(Map::new()));
        Self {
            root: json!({ "user": user, "context": request }),
        }
    }

    /// Resolves a dot-separated path against the context.
    ///
    /// Any missing intermediate key (or indexing into a non-object) resolves
    /// the whole path to `None`; comparison operators treat `None` as never
    /// matching.
    pub fn resolve(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.root, |value, key| value.as_object()?.get(key))
    }
}
