//! Error types for Custody

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entity::UserId;
use crate::domain::version::VersionToken;
use crate::storage::repository::StoreError;

/// Result type alias using Custody's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Custody error types
///
/// Lock validation failures, concurrency conflicts, and lifecycle errors
/// are all surfaced to the immediate caller; nothing is swallowed or
/// retried inside the core.
#[derive(Error, Debug)]
pub enum Error {
    // Lock errors (E100-E199)
    #[error("record is not locked; acquire the lock before updating")]
    NotLocked,

    #[error("record is already locked by {owner}")]
    AlreadyLocked { owner: UserId },

    #[error("record is locked by {owner} since {since}")]
    LockedByOther {
        owner: UserId,
        since: DateTime<Utc>,
    },

    #[error(
        "lock held by {owner} since {since} expired after {timeout_minutes} minutes; it has been cleared, retrying will succeed"
    )]
    LockExpired {
        owner: UserId,
        since: DateTime<Utc>,
        timeout_minutes: i64,
    },

    // Concurrency errors (E200-E299)
    #[error("version conflict on {kind} {id}: client holds {client}, store holds {store}")]
    VersionConflict {
        kind: &'static str,
        id: Uuid,
        client: VersionToken,
        store: VersionToken,
    },

    #[error("{kind} {id} was deleted while the write was in flight")]
    RecordGone { kind: &'static str, id: Uuid },

    // Lifecycle errors (E300-E399)
    #[error("{kind} does not support soft delete; restore is not possible")]
    RestoreUnsupported { kind: &'static str },

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: Uuid },

    // Caller errors (E700-E799)
    #[error("operation cancelled")]
    Cancelled,

    // Storage errors (E400-E499)
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotLocked => "E100",
            Self::AlreadyLocked { .. } => "E101",
            Self::LockedByOther { .. } => "E102",
            Self::LockExpired { .. } => "E103",
            Self::VersionConflict { .. } => "E200",
            Self::RecordGone { .. } => "E201",
            Self::RestoreUnsupported { .. } => "E300",
            Self::NotFound { .. } => "E301",
            Self::Cancelled => "E700",
            Self::Store(_) => "E400",
        }
    }

    /// Whether retrying the same call can reasonably succeed
    ///
    /// True only for expired locks, which are cleared as a side effect of
    /// detection: the caller that was told about the expiry now finds the
    /// record unlocked.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LockExpired { .. })
    }
}
