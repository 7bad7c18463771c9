//! Repository interface for the persistence collaborator
//!
//! The core consumes a conventional data-access abstraction and owns no
//! persistence itself. `save` is the unit-of-save boundary: one
//! conditional write keyed on the record's version token, surfacing a
//! stale-version signal that carries the store's current row image.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entity::{kind_of, Entity};
use crate::domain::specification::Specification;
use crate::error::{Error, Result};
use thiserror::Error as ThisError;

/// How a fetched record will be used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Read without intent to write back
    ReadOnly,
    /// Read with write-tracking; the instance will be saved
    ForUpdate,
}

/// Page window for filtered queries
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

impl Page {
    /// Window covering the whole result set
    pub fn all() -> Self {
        Self {
            offset: 0,
            limit: usize::MAX,
        }
    }

    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::all()
    }
}

/// Low-level storage failure
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum StoreError {
    /// The row's version changed between read and write
    #[error("stale write: row version changed since read")]
    StaleWrite,

    /// Backend failure (connection, I/O, corruption)
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Failure of the unit-of-save write
#[derive(Debug)]
pub enum SaveError<T> {
    /// Conditional write rejected; `current` is the store's present row
    /// image, `None` when the row is gone entirely
    Stale { current: Option<T> },

    /// Any other storage failure
    Store(StoreError),
}

impl<T> From<StoreError> for SaveError<T> {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

/// Data-access abstraction the workflow is generic over
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Fetch a record by id; `None` when absent or filtered out as
    /// soft-deleted
    async fn find_by_id(
        &self,
        id: Uuid,
        mode: FetchMode,
        include_deleted: bool,
    ) -> std::result::Result<Option<T>, StoreError>;

    /// Fetch all records
    async fn find_all(&self, include_deleted: bool) -> std::result::Result<Vec<T>, StoreError>;

    /// Filtered, paged fetch driven by an opaque specification
    async fn find_where(
        &self,
        spec: &dyn Specification<T>,
        page: Page,
        include_deleted: bool,
    ) -> std::result::Result<Vec<T>, StoreError>;

    /// Insert a new record; the store assigns the initial version token
    async fn add(&self, entity: &mut T) -> std::result::Result<(), StoreError>;

    /// Physically remove a record; `true` when a row was deleted
    async fn remove(&self, id: Uuid) -> std::result::Result<bool, StoreError>;

    /// Persist the record's current state
    ///
    /// Conditional on the version token when the record carries one: on
    /// success the regenerated token is written back into `entity` and
    /// the change count returned; on a version mismatch the store's
    /// current row image is returned in `SaveError::Stale`.
    async fn save(&self, entity: &mut T) -> std::result::Result<u64, SaveError<T>>;

    /// Fetch a record by id or fail with `NotFound`
    async fn get_by_id(&self, id: Uuid, mode: FetchMode, include_deleted: bool) -> Result<T>
    where
        T: 'static,
    {
        self.find_by_id(id, mode, include_deleted)
            .await
            .map_err(Error::from)?
            .ok_or(Error::NotFound {
                kind: kind_of::<T>(),
                id,
            })
    }
}
