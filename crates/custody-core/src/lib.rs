//! Custody Core Library
//!
//! Shared infrastructure for multi-user record management:
//! - Advisory lock lifecycle (cooperative, per-record, lazy expiry)
//! - Cascading lock/delete/restore propagation across record graphs
//! - Optimistic-concurrency conflict extraction
//! - Child-collection reconciliation (diff/sync)
//! - The create/read/update/delete/restore workflow tying them together
//!
//! Persistence, DTO mapping and identity are external collaborators: the
//! workflow is generic over a `Repository` and takes the acting user from
//! an `OperationContext`.

pub mod application;
pub mod domain;
pub mod error;
pub mod storage;

#[cfg(test)]
mod test_support;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::application::{EntityWorkflow, OperationContext, Reconciler, WorkflowConfig};
    pub use crate::domain::{
        cascade, AuditState, CascadeOp, Entity, EntityExt, LockState, LockStatus, SoftDeleteState,
        UserId, VersionToken,
    };
    pub use crate::error::{Error, Result};
    pub use crate::storage::{FetchMode, MemoryStore, Page, Repository};
}
