//! Advisory lock state machine
//!
//! Each lockable record owns one `LockState`. The lock is cooperative:
//! callers are expected to validate it before writing, the storage engine
//! does not enforce it. Expiry is derived from the acquisition timestamp
//! at read time and repaired lazily by the next validation, never by a
//! background sweep.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::entity::UserId;
use crate::error::{Error, Result};

/// Default lock timeout in minutes
pub const DEFAULT_LOCK_TIMEOUT_MINUTES: i64 = 60;

/// Derived lock status, computed from the stored fields at read time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockStatus {
    /// No active lock
    Unlocked,
    /// Lock is held and within its timeout
    Held {
        owner: UserId,
        since: DateTime<Utc>,
    },
    /// Lock is past its timeout; treated as free but reported distinctly
    Expired {
        owner: UserId,
        since: DateTime<Utc>,
    },
}

/// Per-record advisory lock state
///
/// Invariant: `locked_at` is set if and only if `locked_by` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockState {
    pub(crate) locked_by: Option<UserId>,
    pub(crate) locked_at: Option<DateTime<Utc>>,
    pub(crate) timeout_minutes: i64,
}

impl Default for LockState {
    fn default() -> Self {
        Self {
            locked_by: None,
            locked_at: None,
            timeout_minutes: DEFAULT_LOCK_TIMEOUT_MINUTES,
        }
    }
}

impl LockState {
    /// Create an unlocked state with the default timeout
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unlocked state with a custom timeout
    pub fn with_timeout(timeout_minutes: i64) -> Self {
        debug_assert!(timeout_minutes > 0);
        Self {
            timeout_minutes,
            ..Self::default()
        }
    }

    /// Current status, derived from the stored fields
    pub fn status(&self) -> LockStatus {
        match (&self.locked_by, self.locked_at) {
            (Some(owner), Some(since)) => {
                if self.is_expired() {
                    LockStatus::Expired {
                        owner: owner.clone(),
                        since,
                    }
                } else {
                    LockStatus::Held {
                        owner: owner.clone(),
                        since,
                    }
                }
            }
            _ => LockStatus::Unlocked,
        }
    }

    /// Current owner, if any (expired owners are still reported)
    pub fn owner(&self) -> Option<&UserId> {
        self.locked_by.as_ref()
    }

    /// When the lock was acquired, if it is held
    pub fn locked_at(&self) -> Option<DateTime<Utc>> {
        self.locked_at
    }

    /// Configured timeout in minutes
    pub fn timeout_minutes(&self) -> i64 {
        self.timeout_minutes
    }

    /// Whether an active (non-expired) lock is in place
    pub fn is_locked(&self) -> bool {
        self.locked_by.is_some() && !self.is_expired()
    }

    /// Whether the lock timestamp is past the timeout
    pub fn is_expired(&self) -> bool {
        match self.locked_at {
            Some(at) => Utc::now() - at > Duration::minutes(self.timeout_minutes),
            None => false,
        }
    }

    /// Whether `user` holds an active lock
    pub fn is_locked_by(&self, user: &UserId) -> bool {
        self.is_locked() && self.locked_by.as_ref() == Some(user)
    }

    /// Whether someone other than `user` holds an active lock
    pub fn is_locked_by_other(&self, user: &UserId) -> bool {
        self.is_locked() && self.locked_by.as_ref() != Some(user)
    }

    /// Acquire the lock for `user`
    ///
    /// Succeeds when the lock is free or expired, refreshing the timestamp
    /// even if `user` already held it. Fails with `AlreadyLocked` when a
    /// valid lock is held by anyone else.
    pub fn lock(&mut self, user: &UserId) -> Result<()> {
        if let LockStatus::Held { owner, .. } = self.status() {
            if &owner != user {
                return Err(Error::AlreadyLocked { owner });
            }
        }

        self.locked_by = Some(user.clone());
        self.locked_at = Some(Utc::now());
        info!(user = %user, "lock acquired");
        Ok(())
    }

    /// Release the lock held by `user`
    ///
    /// Idempotent: releasing an unlocked or expired lock succeeds. Returns
    /// `false` without touching the state when a valid lock is held by
    /// someone else; the caller decides whether that matters.
    pub fn unlock(&mut self, user: &UserId) -> bool {
        if self.is_locked_by_other(user) {
            debug!(user = %user, owner = ?self.locked_by, "unlock skipped, lock held by other");
            return false;
        }

        if self.locked_by.is_some() {
            info!(user = %user, "lock released");
        }
        self.clear();
        true
    }

    /// Validate that `user` may mutate the record
    ///
    /// An expired lock is cleared here as a side effect and reported via
    /// `LockExpired`, so the caller that lost the race learns who held it
    /// and an immediate retry will succeed.
    pub fn validate_for_update(&mut self, user: &UserId) -> Result<()> {
        match self.status() {
            LockStatus::Unlocked => Err(Error::NotLocked),
            LockStatus::Expired { owner, since } => {
                let timeout_minutes = self.timeout_minutes;
                self.clear();
                Err(Error::LockExpired {
                    owner,
                    since,
                    timeout_minutes,
                })
            }
            LockStatus::Held { owner, since } => {
                if &owner == user {
                    Ok(())
                } else {
                    Err(Error::LockedByOther { owner, since })
                }
            }
        }
    }

    /// Refresh the lock timestamp if `user` currently holds a valid lock
    ///
    /// Silent no-op otherwise: refreshing a lock you do not own is not an
    /// error, just ineffective.
    pub fn refresh(&mut self, user: &UserId) {
        if self.is_locked_by(user) {
            self.locked_at = Some(Utc::now());
        }
    }

    /// Unconditionally clear the lock; administrative, no ownership check
    pub fn force_unlock(&mut self) {
        if let Some(owner) = &self.locked_by {
            info!(owner = %owner, "lock force-released");
        }
        self.clear();
    }

    fn clear(&mut self) {
        self.locked_by = None;
        self.locked_at = None;
    }
}
