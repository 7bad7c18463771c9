//! Storage layer
//!
//! The repository interface the workflow is generic over, plus the
//! in-memory reference store.

pub mod memory;
pub mod repository;

pub use memory::MemoryStore;
pub use repository::{FetchMode, Page, Repository, SaveError, StoreError};
