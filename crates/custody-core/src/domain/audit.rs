//! Audit stamps
//!
//! Creation stamps are written once by the workflow when a record is
//! created; modification stamps are refreshed on every successful update
//! and restore.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::UserId;

/// Per-record audit state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditState {
    pub(crate) created_by: UserId,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) modified_by: Option<UserId>,
    pub(crate) modified_at: Option<DateTime<Utc>>,
}

impl AuditState {
    /// Create an audit state stamped as created by `user` now
    pub fn new(user: &UserId) -> Self {
        Self {
            created_by: user.clone(),
            created_at: Utc::now(),
            modified_by: None,
            modified_at: None,
        }
    }

    /// Who created the record
    pub fn created_by(&self) -> &UserId {
        &self.created_by
    }

    /// When the record was created
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Who last modified the record, if anyone
    pub fn modified_by(&self) -> Option<&UserId> {
        self.modified_by.as_ref()
    }

    /// When the record was last modified, if ever
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.modified_at
    }

    /// Overwrite the creation stamp; used by the workflow on create
    pub fn stamp_created(&mut self, user: &UserId) {
        self.created_by = user.clone();
        self.created_at = Utc::now();
    }

    /// Refresh the modification stamp
    pub fn touch(&mut self, user: &UserId) {
        self.modified_by = Some(user.clone());
        self.modified_at = Some(Utc::now());
    }
}
