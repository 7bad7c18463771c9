//! Entity trait and capability model
//!
//! A record participates in locking, auditing, soft deletion and
//! optimistic concurrency by composition: it declares each facet by
//! returning `Some` from the matching accessor. Operations that target a
//! facet a record lacks are silent no-ops, which lets one generic
//! workflow serve heterogeneous record types.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::audit::AuditState;
use crate::domain::lock::LockState;
use crate::domain::soft_delete::SoftDeleteState;
use crate::domain::version::VersionToken;

/// Identifier of an acting user, supplied by the caller's user context
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A record managed by the workflow
///
/// Every record has a stable id (`Uuid::nil()` means "not yet persisted")
/// and a type name used in errors and logs. The facet accessors default
/// to `None`; overriding one declares the capability. `cascading` returns
/// the children that lock, delete and restore operations propagate to, in
/// declaration order — relations not listed there are never traversed.
pub trait Entity: Send + Sync {
    /// Stable unique identifier
    fn id(&self) -> Uuid;

    /// Assign the identifier; called by the workflow on create
    fn assign_id(&mut self, id: Uuid);

    /// Record type name for errors and logs
    fn kind(&self) -> &'static str;

    /// Advisory lock facet
    fn lock_state(&self) -> Option<&LockState> {
        None
    }

    fn lock_state_mut(&mut self) -> Option<&mut LockState> {
        None
    }

    /// Soft-delete facet
    fn soft_delete_state(&self) -> Option<&SoftDeleteState> {
        None
    }

    fn soft_delete_state_mut(&mut self) -> Option<&mut SoftDeleteState> {
        None
    }

    /// Audit facet
    fn audit_state(&self) -> Option<&AuditState> {
        None
    }

    fn audit_state_mut(&mut self) -> Option<&mut AuditState> {
        None
    }

    /// Optimistic-concurrency facet
    fn version(&self) -> Option<VersionToken> {
        None
    }

    /// Write back the token regenerated by the store; no-op for records
    /// without the concurrency facet
    fn set_version(&mut self, _token: VersionToken) {}

    /// Children reached by cascading operations, in declaration order
    fn cascading(&mut self) -> Vec<&mut dyn Entity> {
        Vec::new()
    }
}

/// Extension predicates over the facet accessors
pub trait EntityExt: Entity {
    /// Whether the record is currently soft-deleted
    fn is_deleted(&self) -> bool {
        self.soft_delete_state().is_some_and(|s| s.is_deleted())
    }

    /// Whether the record declares the lock facet
    fn is_lockable(&self) -> bool {
        self.lock_state().is_some()
    }

    /// Whether the record declares the soft-delete facet
    fn is_soft_deletable(&self) -> bool {
        self.soft_delete_state().is_some()
    }
}

impl<T: Entity + ?Sized> EntityExt for T {}

/// Short type name for contexts where no instance is at hand
pub(crate) fn kind_of<T: Entity>() -> &'static str {
    std::any::type_name::<T>()
        .rsplit("::")
        .next()
        .unwrap_or("record")
}
