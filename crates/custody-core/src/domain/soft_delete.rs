//! Soft-delete state
//!
//! A deleted record stays in the store, marked with who removed it and
//! when, so normal reads can filter it out and a restore can bring it
//! back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::UserId;

/// Per-record soft-delete state
///
/// Invariant: `deleted_by`/`deleted_at` are set only while `deleted` is
/// true.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SoftDeleteState {
    pub(crate) deleted: bool,
    pub(crate) deleted_by: Option<UserId>,
    pub(crate) deleted_at: Option<DateTime<Utc>>,
}

impl SoftDeleteState {
    /// Create a live (not deleted) state
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the record is currently soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Who deleted the record, while it is deleted
    pub fn deleted_by(&self) -> Option<&UserId> {
        self.deleted_by.as_ref()
    }

    /// When the record was deleted, while it is deleted
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Mark the record as deleted by `user`
    pub fn mark(&mut self, user: &UserId) {
        self.deleted = true;
        self.deleted_by = Some(user.clone());
        self.deleted_at = Some(Utc::now());
    }

    /// Clear the deletion mark, restoring the record
    pub fn clear(&mut self) {
        self.deleted = false;
        self.deleted_by = None;
        self.deleted_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_and_clear() {
        let alice = UserId::new("alice");
        let mut state = SoftDeleteState::new();
        assert!(!state.is_deleted());

        state.mark(&alice);
        assert!(state.is_deleted());
        assert_eq!(state.deleted_by(), Some(&alice));
        assert!(state.deleted_at().is_some());

        state.clear();
        assert!(!state.is_deleted());
        assert!(state.deleted_by().is_none());
        assert!(state.deleted_at().is_none());
    }
}
