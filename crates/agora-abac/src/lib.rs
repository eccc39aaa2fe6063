//! # agora-abac: Attribute-Based Access Control
//!
//! Context-aware access decisions the permission catalog cannot express,
//! e.g. "a seller may only update their own shop". A small rule engine
//! evaluates structured boolean conditions over subject attributes and
//! per-request context, with first-match-wins resolution and a fail-closed
//! posture throughout.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Access request                              │
//! │  (subject, action, resource, context)        │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  PolicyDecisionPoint                         │
//! │  ├─ fetch all policies (stable order)        │
//! │  ├─ filter by resource/action applicability  │
//! │  ├─ evaluate conditions, first match wins    │
//! │  └─ no applicable / no match → deny          │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  allow / deny                                │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Examples
//!
//! ```
//! use std::sync::Arc;
//! use agora_abac::{Condition, Effect, InMemoryPolicyRepository, Policy, PolicyDecisionPoint};
//! use agora_types::{PolicyId, Subject};
//! use serde_json::json;
//!
//! let repo = Arc::new(InMemoryPolicyRepository::new());
//! repo.add(Policy::new(
//!     PolicyId::new(1),
//!     "user-view-own-orders",
//!     "Users can only view their own orders",
//!     Condition::Or(vec![
//!         Condition::Contains("user.roles".into(), json!("admin")),
//!         Condition::Eq("user.id".into(), json!("context.params.userId")),
//!     ]),
//!     Effect::Allow,
//!     vec!["order".into()],
//!     vec!["read".into()],
//! )?)?;
//!
//! let pdp = PolicyDecisionPoint::new(repo);
//! let subject = Subject::new("u1", "u1@example.com").with_role("customer");
//! assert!(pdp.decide(&subject, "read", "order", json!({ "params": { "userId": "u1" } })));
//! assert!(!pdp.decide(&subject, "read", "order", json!({ "params": { "userId": "u2" } })));
//! # Ok::<(), agora_abac::PolicyError>(())
//! ```

pub mod condition;
pub mod context;
pub mod evaluator;
pub mod pdp;
pub mod policy;
pub mod repository;

// Re-export commonly used types
pub use condition::Condition;
pub use context::EvaluationContext;
pub use evaluator::evaluate;
pub use pdp::PolicyDecisionPoint;
pub use policy::{Effect, Policy, PolicyError};
pub use repository::{InMemoryPolicyRepository, PolicyRepository};
