//! Application layer
//!
//! Orchestrates domain operations: the entity workflow, the concurrency
//! conflict resolver, and the child-collection reconciler.

pub mod conflict;
pub mod reconcile;
pub mod workflow;

pub use conflict::resolve_save_error;
pub use reconcile::{ReconcileReport, Reconciler};
pub use workflow::{EntityWorkflow, OperationContext, WorkflowConfig};
