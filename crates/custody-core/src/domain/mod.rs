//! Domain layer
//!
//! Value objects and algorithms: the lock state machine, soft-delete and
//! audit stamps, version tokens, the entity/capability model, the
//! cascading traversal engine, and query specifications.

pub mod audit;
pub mod cascade;
pub mod entity;
pub mod lock;
pub mod soft_delete;
pub mod specification;
pub mod version;

pub use audit::AuditState;
pub use cascade::{cascade, CascadeOp};
pub use entity::{Entity, EntityExt, UserId};
pub use lock::{LockState, LockStatus};
pub use soft_delete::SoftDeleteState;
pub use version::VersionToken;
