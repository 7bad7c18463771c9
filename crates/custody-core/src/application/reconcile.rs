//! Child-collection reconciliation
//!
//! Diff/sync of an existing child collection against an incoming target
//! list, keyed by id. Children that disappeared are soft-deleted when the
//! child type supports it and physically removed otherwise; children that
//! reappear are restored before any field update; updates only run when
//! the change predicate reports a difference, so unchanged children cause
//! no write and no audit churn.

use std::collections::HashSet;
use std::marker::PhantomData;

use tracing::debug;
use uuid::Uuid;

use crate::domain::entity::{Entity, UserId};

/// Outcome counters plus the physically removed children
///
/// Removed instances are handed back so the caller can tell the
/// persistence layer to delete them.
#[derive(Debug, Default)]
pub struct ReconcileReport<C> {
    pub created: usize,
    pub updated: usize,
    pub restored: usize,
    pub soft_deleted: usize,
    pub unchanged: usize,
    pub removed: Vec<C>,
}

impl<C> ReconcileReport<C> {
    fn new() -> Self {
        Self {
            created: 0,
            updated: 0,
            restored: 0,
            soft_deleted: 0,
            unchanged: 0,
            removed: Vec::new(),
        }
    }
}

/// Keyed diff/sync between a child collection and an incoming list
///
/// `key_of` extracts the id from an incoming item (`Uuid::nil()` means
/// "new, not yet persisted"); `differs` decides whether an update is
/// needed; `apply` copies incoming fields onto an existing child; `make`
/// builds a new child for an unmatched incoming item under the given id.
pub struct Reconciler<C, I, K, D, A, N> {
    key_of: K,
    differs: D,
    apply: A,
    make: N,
    _marker: PhantomData<fn(&I) -> C>,
}

impl<C, I, K, D, A, N> Reconciler<C, I, K, D, A, N>
where
    C: Entity,
    K: Fn(&I) -> Uuid,
    D: Fn(&C, &I) -> bool,
    A: FnMut(&mut C, &I),
    N: FnMut(Uuid, &I) -> C,
{
    pub fn new(key_of: K, differs: D, apply: A, make: N) -> Self {
        Self {
            key_of,
            differs,
            apply,
            make,
            _marker: PhantomData,
        }
    }

    /// Reconcile `existing` against `incoming`
    ///
    /// After the run, the live ids in `existing` equal the incoming ids;
    /// soft-deleted leftovers stay in the collection, marked deleted.
    pub fn run(
        mut self,
        existing: &mut Vec<C>,
        incoming: &[I],
        user: &UserId,
    ) -> ReconcileReport<C> {
        let mut report = ReconcileReport::new();

        let incoming_ids: HashSet<Uuid> = incoming
            .iter()
            .map(&self.key_of)
            .filter(|id| !id.is_nil())
            .collect();

        // Removal pass: persisted children missing from the target list.
        let mut index = 0;
        while index < existing.len() {
            let orphan =
                !existing[index].id().is_nil() && !incoming_ids.contains(&existing[index].id());
            if !orphan {
                index += 1;
                continue;
            }

            if existing[index].soft_delete_state().is_some() {
                if let Some(tombstone) = existing[index].soft_delete_state_mut() {
                    if !tombstone.is_deleted() {
                        tombstone.mark(user);
                        report.soft_deleted += 1;
                    }
                }
                index += 1;
            } else {
                report.removed.push(existing.remove(index));
            }
        }

        // Reconciliation pass: update, restore, or create per target item.
        for item in incoming {
            let id = (self.key_of)(item);
            let found = if id.is_nil() {
                None
            } else {
                existing.iter_mut().find(|child| child.id() == id)
            };

            match found {
                Some(child) => {
                    // Restore first, independent of field changes
                    if let Some(tombstone) = child.soft_delete_state_mut() {
                        if tombstone.is_deleted() {
                            tombstone.clear();
                            report.restored += 1;
                        }
                    }

                    if (self.differs)(child, item) {
                        (self.apply)(child, item);
                        report.updated += 1;
                    } else {
                        report.unchanged += 1;
                    }
                }
                None => {
                    let new_id = if id.is_nil() { Uuid::new_v4() } else { id };
                    existing.push((self.make)(new_id, item));
                    report.created += 1;
                }
            }
        }

        debug!(
            created = report.created,
            updated = report.updated,
            restored = report.restored,
            soft_deleted = report.soft_deleted,
            removed = report.removed.len(),
            unchanged = report.unchanged,
            "collection reconciled"
        );
        report
    }
}
