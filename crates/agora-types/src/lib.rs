//! # agora-types: Core types for the Agora authorization core
//!
//! Shared types used across the authorization subsystem:
//! - Entity IDs ([`UserId`], [`RoleId`], [`PermissionId`], [`PolicyId`])
//! - Permission codes ([`PermissionCode`])
//! - Catalog records ([`Permission`], [`Role`])
//! - The resolved caller identity ([`Subject`], [`SubjectStatus`])
//!
//! The catalog is modeled as arenas of records plus id-based membership
//! sets. Roles reference permissions by id, users reference roles by id;
//! there are no bidirectional object graphs.

use std::collections::BTreeSet;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

// ============================================================================
// Entity IDs
// ============================================================================

/// Unique identifier for a user, as issued by the identity collaborator.
///
/// Opaque to this subsystem; typically a UUID string upstream.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Unique identifier for a role in the catalog.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct RoleId(u64);

impl RoleId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RoleId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<RoleId> for u64 {
    fn from(id: RoleId) -> Self {
        id.0
    }
}

/// Unique identifier for a permission in the catalog.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct PermissionId(u64);

impl PermissionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl Display for PermissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PermissionId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<PermissionId> for u64 {
    fn from(id: PermissionId) -> Self {
        id.0
    }
}

/// Unique identifier for an ABAC policy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct PolicyId(u64);

impl PolicyId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PolicyId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<PolicyId> for u64 {
    fn from(id: PolicyId) -> Self {
        id.0
    }
}

// ============================================================================
// PermissionCode
// ============================================================================

/// A grantable capability, by convention `<resource>:<action>`.
///
/// Examples: `product:create`, `shop:update`, `order:read`.
///
/// The code is the unit of RBAC checks: a user's effective permission set is
/// a set of codes, and endpoint guards require specific codes to be present.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionCode(String);

impl PermissionCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the `<resource>` part of the code, if the code follows the
    /// `<resource>:<action>` convention.
    pub fn resource(&self) -> Option<&str> {
        self.0.split_once(':').map(|(resource, _)| resource)
    }

    /// Returns the `<action>` part of the code, if the code follows the
    /// `<resource>:<action>` convention.
    pub fn action(&self) -> Option<&str> {
        self.0.split_once(':').map(|(_, action)| action)
    }
}

impl Display for PermissionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PermissionCode {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PermissionCode {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ============================================================================
// Catalog records
// ============================================================================

/// Immutable catalog entry describing a grantable capability.
///
/// Created by administrative operations and rarely deleted. Deleting a
/// permission must cascade it out of every role's permission set; the
/// directory enforces the cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: PermissionId,
    pub code: PermissionCode,
    pub name: String,
    pub description: String,
}

impl Permission {
    pub fn new(
        id: PermissionId,
        code: impl Into<PermissionCode>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id,
            code: code.into(),
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Named collection of permissions.
///
/// Membership is an id set, so a permission appears at most once per role
/// structurally. Adding an already-granted permission is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub description: String,
    pub permissions: BTreeSet<PermissionId>,
}

impl Role {
    pub fn new(id: RoleId, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            permissions: BTreeSet::new(),
        }
    }

    /// Adds a permission to the role. No-op if already granted.
    pub fn grant(&mut self, permission: PermissionId) {
        self.permissions.insert(permission);
    }

    /// Removes a permission from the role. No-op if absent.
    pub fn revoke(&mut self, permission: PermissionId) {
        self.permissions.remove(&permission);
    }

    /// Returns whether the role grants the given permission.
    pub fn grants(&self, permission: PermissionId) -> bool {
        self.permissions.contains(&permission)
    }
}

// ============================================================================
// Subject
// ============================================================================

/// Account lifecycle state of a subject, as reported by the identity
/// collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectStatus {
    Active,
    Suspended,
    Deleted,
}

impl Default for SubjectStatus {
    fn default() -> Self {
        Self::Active
    }
}

/// The resolved identity of an authenticated caller.
///
/// Supplied per request by the identity/session collaborator and trusted
/// as-is; this subsystem performs no further identity verification.
///
/// Serializes camelCase because the ABAC evaluation context exposes the
/// subject under `user.*` paths (`user.isVerifiedSeller`, `user.roles`, ...)
/// that policy conditions address by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: UserId,
    pub email: String,
    /// Role names held by the subject, e.g. `["customer", "seller"]`.
    pub roles: Vec<String>,
    pub is_verified_seller: bool,
    /// Free-form attributes attached by the identity collaborator.
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
    pub status: SubjectStatus,
}

impl Subject {
    /// Creates a minimal active subject with no attributes.
    pub fn new(id: impl Into<UserId>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            roles: Vec::new(),
            is_verified_seller: false,
            attributes: serde_json::Map::new(),
            status: SubjectStatus::Active,
        }
    }

    /// Adds a role name (builder pattern).
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Marks the subject as a verified seller (builder pattern).
    pub fn verified_seller(mut self) -> Self {
        self.is_verified_seller = true;
        self
    }

    /// Sets a free-form attribute (builder pattern).
    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("product:create", Some("product"), Some("create"))]
    #[test_case("shop:update", Some("shop"), Some("update"))]
    #[test_case("malformed", None, None)]
    fn permission_code_split(code: &str, resource: Option<&str>, action: Option<&str>) {
        let code = PermissionCode::from(code);
        assert_eq!(code.resource(), resource);
        assert_eq!(code.action(), action);
    }

    #[test]
    fn permission_code_serializes_transparent() {
        let code = PermissionCode::from("order:read");
        let json = serde_json::to_string(&code).expect("serialize code");
        assert_eq!(json, "\"order:read\"");
    }

    #[test]
    fn role_grant_is_idempotent() {
        let mut role = Role::new(RoleId::new(1), "seller", "Marketplace seller");
        role.grant(PermissionId::new(7));
        role.grant(PermissionId::new(7));
        assert_eq!(role.permissions.len(), 1);
        assert!(role.grants(PermissionId::new(7)));

        role.revoke(PermissionId::new(7));
        assert!(!role.grants(PermissionId::new(7)));
        // Revoking an absent permission is a no-op
        role.revoke(PermissionId::new(7));
    }

    #[test]
    fn subject_serializes_camel_case() {
        let subject = Subject::new("u1", "u1@example.com")
            .with_role("seller")
            .verified_seller();

        let value = serde_json::to_value(&subject).expect("serialize subject");
        assert_eq!(value["id"], "u1");
        assert_eq!(value["isVerifiedSeller"], true);
        assert_eq!(value["roles"][0], "seller");
        assert_eq!(value["status"], "active");
    }

    #[test]
    fn subject_attributes_roundtrip() {
        let subject =
            Subject::new("u2", "u2@example.com").with_attribute("tier", serde_json::json!("gold"));

        let json = serde_json::to_string(&subject).expect("serialize");
        let back: Subject = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, subject);
    }
}
