//! Concurrency conflict resolver
//!
//! Translates the persistence layer's stale-version signal into a
//! domain-level error. Only records carrying a version token gain
//! anything here; for everything else the original signal is re-raised
//! unchanged.

use tracing::warn;

use crate::domain::entity::Entity;
use crate::error::Error;
use crate::storage::repository::{SaveError, StoreError};

/// Resolve a failed save into the error surfaced to the caller
///
/// `entity` is the in-memory instance whose write was rejected; the
/// stale signal carries the store's current row image, absent when the
/// row was deleted concurrently.
pub fn resolve_save_error<T: Entity>(entity: &T, err: SaveError<T>) -> Error {
    match err {
        SaveError::Store(store_err) => Error::Store(store_err),
        SaveError::Stale { current } => {
            let Some(client) = entity.version() else {
                // Not concurrency-aware: pass the raw signal through.
                return Error::Store(StoreError::StaleWrite);
            };

            match current.as_ref().and_then(|row| row.version()) {
                None if current.is_none() => {
                    warn!(
                        kind = entity.kind(),
                        id = %entity.id(),
                        "record deleted concurrently during update"
                    );
                    Error::RecordGone {
                        kind: entity.kind(),
                        id: entity.id(),
                    }
                }
                Some(store) => {
                    warn!(
                        kind = entity.kind(),
                        id = %entity.id(),
                        client = %client,
                        store = %store,
                        "version conflict detected"
                    );
                    Error::VersionConflict {
                        kind: entity.kind(),
                        id: entity.id(),
                        client,
                        store,
                    }
                }
                // A row image without a token carries nothing to compare
                None => Error::Store(StoreError::StaleWrite),
            }
        }
    }
}
