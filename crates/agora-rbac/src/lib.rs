//! # agora-rbac: Role-Based Access Control
//!
//! Derives a user's effective permission set from role memberships and
//! serves it through a read-through cache:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Permission check (user, required codes)     │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  PermissionCache                             │
//! │  ├─ hit  → cached code set                   │
//! │  └─ miss → PermissionAggregator              │
//! │            ├─ user → role ids                │
//! │            ├─ role ids → permission codes    │
//! │            └─ union, store with TTL          │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  RoleDirectory (catalog + memberships)       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Cache entries are derived data, never a source of truth. Every
//! administrative role/permission mutation must invalidate the entry of
//! every affected user; [`InMemoryDirectory::users_with_role`] exists so
//! callers can fan the invalidation out.
//!
//! ## Examples
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use agora_rbac::{InMemoryCacheStore, InMemoryDirectory, PermissionAggregator, PermissionCache};
//! use agora_rbac::clock::SystemClock;
//! use agora_types::UserId;
//!
//! let directory = Arc::new(InMemoryDirectory::new());
//! let perm = directory.create_permission("product:create", "Create product", "")?;
//! let role = directory.create_role("seller", "Marketplace seller")?;
//! directory.add_permission_to_role(role, perm)?;
//!
//! let alice = UserId::from("alice");
//! directory.register_user(alice.clone());
//! directory.assign_role(&alice, role)?;
//!
//! let store = Arc::new(InMemoryCacheStore::new(Arc::new(SystemClock)));
//! let cache = PermissionCache::new(
//!     PermissionAggregator::new(directory),
//!     store,
//!     Duration::from_secs(3600),
//! );
//!
//! assert!(cache.has_permission(&alice, &"product:create".into())?);
//! # Ok::<(), agora_rbac::DirectoryError>(())
//! ```

pub mod aggregator;
pub mod cache;
pub mod clock;
pub mod directory;

// Re-export commonly used types
pub use aggregator::PermissionAggregator;
pub use cache::{CacheError, CacheStore, InMemoryCacheStore, PermissionCache};
pub use clock::{Clock, SystemClock};
pub use directory::{DirectoryError, InMemoryDirectory, RoleDirectory};
