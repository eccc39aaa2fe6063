//! Role/permission catalog and user memberships.
//!
//! The directory is the storage collaborator behind the aggregator: it owns
//! the permission catalog, the role catalog, and the user → role association.
//! Reads go through the [`RoleDirectory`] trait so the aggregator can be
//! backed by a database adapter in production and by [`InMemoryDirectory`]
//! in tests and embedded deployments.
//!
//! Administrative mutations live on [`InMemoryDirectory`] directly. After
//! any mutation that changes what a role grants, the caller must invalidate
//! the permission cache entry of every user holding that role;
//! [`InMemoryDirectory::users_with_role`] supplies the affected set.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

use agora_types::{Permission, PermissionCode, PermissionId, Role, RoleId, UserId};
use thiserror::Error;

/// Error type for directory operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// The referenced user is not registered.
    #[error("user '{0}' not found")]
    UserNotFound(UserId),

    /// The referenced role does not exist.
    #[error("role {0} not found")]
    RoleNotFound(RoleId),

    /// The referenced permission does not exist.
    #[error("permission {0} not found")]
    PermissionNotFound(PermissionId),

    /// A role or permission with the same unique name/code already exists.
    #[error("duplicate name '{0}'")]
    DuplicateName(String),
}

/// Result type for directory operations.
pub type Result<T> = std::result::Result<T, DirectoryError>;

// ============================================================================
// RoleDirectory trait
// ============================================================================

/// Read access to role memberships and role permission grants.
///
/// This is the contract the permission aggregator consumes. Both lookups are
/// bounded calls to an external store; neither blocks indefinitely.
pub trait RoleDirectory: Send + Sync {
    /// Returns the role ids held by the user.
    ///
    /// A registered user with no roles yields an empty set; an unknown user
    /// is a caller bug and yields [`DirectoryError::UserNotFound`].
    fn user_roles(&self, user: &UserId) -> Result<BTreeSet<RoleId>>;

    /// Returns the permission codes granted by the role.
    fn role_permission_codes(&self, role: RoleId) -> Result<BTreeSet<PermissionCode>>;
}

// ============================================================================
// InMemoryDirectory
// ============================================================================

/// In-memory directory: permission/role arenas plus id-based membership sets.
///
/// Guarded by a single `RwLock`; reads from concurrent decision paths take
/// the shared lock, administrative mutations take the exclusive lock.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    permissions: BTreeMap<PermissionId, Permission>,
    roles: BTreeMap<RoleId, Role>,
    memberships: BTreeMap<UserId, BTreeSet<RoleId>>,
    next_permission_id: u64,
    next_role_id: u64,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user with no roles. No-op if already registered.
    pub fn register_user(&self, user: UserId) {
        let mut inner = self.inner.write().expect("directory lock poisoned");
        inner.memberships.entry(user).or_default();
    }

    /// Creates a permission with a unique code.
    pub fn create_permission(
        &self,
        code: impl Into<PermissionCode>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<PermissionId> {
        let code = code.into();
        let mut inner = self.inner.write().expect("directory lock poisoned");
        if inner.permissions.values().any(|p| p.code == code) {
            return Err(DirectoryError::DuplicateName(code.as_str().to_string()));
        }
        inner.next_permission_id += 1;
        let id = PermissionId::new(inner.next_permission_id);
        inner
            .permissions
            .insert(id, Permission::new(id, code, name, description));
        Ok(id)
    }

    /// Deletes a permission, cascading it out of every role's grant set.
    pub fn delete_permission(&self, permission: PermissionId) -> Result<()> {
        let mut inner = self.inner.write().expect("directory lock poisoned");
        if inner.permissions.remove(&permission).is_none() {
            return Err(DirectoryError::PermissionNotFound(permission));
        }
        for role in inner.roles.values_mut() {
            role.revoke(permission);
        }
        Ok(())
    }

    /// Creates a role with a unique name.
    pub fn create_role(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<RoleId> {
        let name = name.into();
        let mut inner = self.inner.write().expect("directory lock poisoned");
        if inner.roles.values().any(|r| r.name == name) {
            return Err(DirectoryError::DuplicateName(name));
        }
        inner.next_role_id += 1;
        let id = RoleId::new(inner.next_role_id);
        inner.roles.insert(id, Role::new(id, name, description));
        Ok(id)
    }

    /// Deletes a role and removes it from every user's membership set.
    pub fn delete_role(&self, role: RoleId) -> Result<()> {
        let mut inner = self.inner.write().expect("directory lock poisoned");
        if inner.roles.remove(&role).is_none() {
            return Err(DirectoryError::RoleNotFound(role));
        }
        for held in inner.memberships.values_mut() {
            held.remove(&role);
        }
        Ok(())
    }

    /// Grants a permission to a role. No-op if already granted.
    ///
    /// Callers must invalidate the cache entry of every user holding the
    /// role afterwards; see [`Self::users_with_role`].
    pub fn add_permission_to_role(&self, role: RoleId, permission: PermissionId) -> Result<()> {
        let mut inner = self.inner.write().expect("directory lock poisoned");
        if !inner.permissions.contains_key(&permission) {
            return Err(DirectoryError::PermissionNotFound(permission));
        }
        let role = inner
            .roles
            .get_mut(&role)
            .ok_or(DirectoryError::RoleNotFound(role))?;
        role.grant(permission);
        Ok(())
    }

    /// Revokes a permission from a role. No-op if absent.
    ///
    /// Same invalidation obligation as [`Self::add_permission_to_role`].
    pub fn remove_permission_from_role(
        &self,
        role: RoleId,
        permission: PermissionId,
    ) -> Result<()> {
        let mut inner = self.inner.write().expect("directory lock poisoned");
        let role = inner
            .roles
            .get_mut(&role)
            .ok_or(DirectoryError::RoleNotFound(role))?;
        role.revoke(permission);
        Ok(())
    }

    /// Adds a role to a user's membership set. Registers the user if needed.
    pub fn assign_role(&self, user: &UserId, role: RoleId) -> Result<()> {
        let mut inner = self.inner.write().expect("directory lock poisoned");
        if !inner.roles.contains_key(&role) {
            return Err(DirectoryError::RoleNotFound(role));
        }
        inner.memberships.entry(user.clone()).or_default().insert(role);
        Ok(())
    }

    /// Removes a role from a user's membership set.
    pub fn unassign_role(&self, user: &UserId, role: RoleId) -> Result<()> {
        let mut inner = self.inner.write().expect("directory lock poisoned");
        let held = inner
            .memberships
            .get_mut(user)
            .ok_or_else(|| DirectoryError::UserNotFound(user.clone()))?;
        held.remove(&role);
        Ok(())
    }

    /// Returns every user currently holding the role.
    ///
    /// Used by role/permission mutation flows to fan cache invalidation out
    /// to all affected users.
    pub fn users_with_role(&self, role: RoleId) -> Vec<UserId> {
        let inner = self.inner.read().expect("directory lock poisoned");
        inner
            .memberships
            .iter()
            .filter(|(_, held)| held.contains(&role))
            .map(|(user, _)| user.clone())
            .collect()
    }

    /// Looks up a role id by its unique name.
    pub fn role_by_name(&self, name: &str) -> Option<RoleId> {
        let inner = self.inner.read().expect("directory lock poisoned");
        inner
            .roles
            .values()
            .find(|r| r.name == name)
            .map(|r| r.id)
    }
}

impl RoleDirectory for InMemoryDirectory {
    fn user_roles(&self, user: &UserId) -> Result<BTreeSet<RoleId>> {
        let inner = self.inner.read().expect("directory lock poisoned");
        inner
            .memberships
            .get(user)
            .cloned()
            .ok_or_else(|| DirectoryError::UserNotFound(user.clone()))
    }

    fn role_permission_codes(&self, role: RoleId) -> Result<BTreeSet<PermissionCode>> {
        let inner = self.inner.read().expect("directory lock poisoned");
        let record = inner
            .roles
            .get(&role)
            .ok_or(DirectoryError::RoleNotFound(role))?;
        Ok(record
            .permissions
            .iter()
            .filter_map(|id| inner.permissions.get(id))
            .map(|p| p.code.clone())
            .collect())
    }
}

// ============================================================================
// Tests
// ============================================================================
