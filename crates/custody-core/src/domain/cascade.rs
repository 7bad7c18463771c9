//! Cascading traversal engine
//!
//! Applies one operation to a record and to every record reachable
//! through declared cascading relations, bounded by depth. The root is
//! depth 0; `max_depth` of 0 touches the root only, 1 reaches direct
//! children but not grandchildren. Children lacking the facet an
//! operation targets are skipped silently.
//!
//! `Validate` fails fast: the first failing record anywhere in the
//! cascade aborts the walk, and the caller discards the in-memory graph
//! as a unit. Every other operation is best-effort per child; a failed
//! child step is logged and the walk continues, while a failure on the
//! root itself always propagates.

use std::fmt;

use tracing::{debug, warn};

use crate::domain::entity::{Entity, UserId};
use crate::error::Result;

/// Operation propagated by a cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeOp {
    Lock,
    Unlock,
    Refresh,
    ForceUnlock,
    Validate,
    SoftDelete,
    Restore,
}

impl fmt::Display for CascadeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Lock => "lock",
            Self::Unlock => "unlock",
            Self::Refresh => "refresh",
            Self::ForceUnlock => "force_unlock",
            Self::Validate => "validate",
            Self::SoftDelete => "soft_delete",
            Self::Restore => "restore",
        };
        write!(f, "{name}")
    }
}

/// Apply `op` to `root` and cascade it through declared relations up to
/// `max_depth`
pub fn cascade(root: &mut dyn Entity, op: CascadeOp, user: &UserId, max_depth: u32) -> Result<()> {
    debug!(op = %op, kind = root.kind(), id = %root.id(), max_depth, "cascade start");
    apply(&mut *root, op, user)?;
    descend(root, op, user, 1, max_depth)
}

fn descend(
    parent: &mut dyn Entity,
    op: CascadeOp,
    user: &UserId,
    depth: u32,
    max_depth: u32,
) -> Result<()> {
    if depth > max_depth {
        return Ok(());
    }

    for child in parent.cascading() {
        match apply(&mut *child, op, user) {
            Ok(()) => {}
            Err(err) if op == CascadeOp::Validate => return Err(err),
            Err(err) => {
                warn!(
                    op = %op,
                    kind = child.kind(),
                    id = %child.id(),
                    error = %err,
                    "cascade step failed; continuing"
                );
            }
        }
        descend(child, op, user, depth + 1, max_depth)?;
    }

    Ok(())
}

/// Apply one operation to one record, honoring its capabilities
fn apply(entity: &mut dyn Entity, op: CascadeOp, user: &UserId) -> Result<()> {
    match op {
        CascadeOp::Lock => {
            if let Some(lock) = entity.lock_state_mut() {
                lock.lock(user)?;
            }
        }
        CascadeOp::Unlock => {
            if let Some(lock) = entity.lock_state_mut() {
                // Best-effort: an ownership mismatch is reported by the
                // state machine itself and is not fatal here.
                lock.unlock(user);
            }
        }
        CascadeOp::Refresh => {
            if let Some(lock) = entity.lock_state_mut() {
                lock.refresh(user);
            }
        }
        CascadeOp::ForceUnlock => {
            if let Some(lock) = entity.lock_state_mut() {
                lock.force_unlock();
            }
        }
        CascadeOp::Validate => {
            if let Some(lock) = entity.lock_state_mut() {
                lock.validate_for_update(user)?;
            }
        }
        CascadeOp::SoftDelete => {
            if let Some(tombstone) = entity.soft_delete_state_mut() {
                // Keep the original deletion stamp if already deleted
                if !tombstone.is_deleted() {
                    tombstone.mark(user);
                }
            }
        }
        CascadeOp::Restore => {
            if let Some(tombstone) = entity.soft_delete_state_mut() {
                tombstone.clear();
            }
        }
    }
    Ok(())
}
