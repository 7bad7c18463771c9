//! Core entity workflow
//!
//! The single entry point application services call for create, read,
//! update, delete and restore. Sequences locking, audit stamping, the
//! cascade engine, persistence calls and conflict translation into one
//! lifecycle per request.
//!
//! Within one call the ordering is fixed: lock validation precedes the
//! mutation, the mutation precedes the unlock step, and the unlock
//! precedes the single persisting write, so the stored row reflects
//! mutation, audit and unlock atomically. Across concurrent callers the
//! store's version-token check decides: first committer wins, the second
//! gets a conflict.

use std::marker::PhantomData;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use crate::application::conflict::resolve_save_error;
use crate::domain::cascade::{cascade, CascadeOp};
use crate::domain::entity::{Entity, UserId};
use crate::domain::specification::Specification;
use crate::error::{Error, Result};
use crate::storage::repository::{FetchMode, Page, Repository};

/// Per-request context: the acting user and a cancellation signal
///
/// The workflow never determines identity itself; the caller's user
/// context supplies it. Cancellation is checked at operation entry,
/// before any I/O; partial in-memory mutation is simply discarded.
#[derive(Debug, Clone)]
pub struct OperationContext {
    user: UserId,
    cancel: CancellationToken,
}

impl OperationContext {
    pub fn new(user: impl Into<UserId>) -> Self {
        Self {
            user: user.into(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(user: impl Into<UserId>, cancel: CancellationToken) -> Self {
        Self {
            user: user.into(),
            cancel,
        }
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    fn ensure_active(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Configuration for the entity workflow
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    max_cascade_depth: u32,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_cascade_depth: 8,
        }
    }
}

impl WorkflowConfig {
    /// Cap on requested cascade depths, guarding against accidentally
    /// deep graphs
    pub fn with_max_cascade_depth(mut self, depth: u32) -> Self {
        self.max_cascade_depth = depth;
        self
    }

    pub fn max_cascade_depth(&self) -> u32 {
        self.max_cascade_depth
    }
}

/// Orchestrating workflow over one record type and its repository
pub struct EntityWorkflow<T, R> {
    repo: Arc<R>,
    config: WorkflowConfig,
    _marker: PhantomData<fn() -> T>,
}

impl<T, R> EntityWorkflow<T, R>
where
    T: Entity + 'static,
    R: Repository<T>,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            repo,
            config: WorkflowConfig::default(),
            _marker: PhantomData,
        }
    }

    pub fn with_config(mut self, config: WorkflowConfig) -> Self {
        self.config = config;
        self
    }

    /// Create the record: fresh id when unset, audit stamps, insert, save
    ///
    /// Creation counts as an initial modification, so both the created
    /// and modified stamps are written.
    pub async fn create(&self, ctx: &OperationContext, mut entity: T) -> Result<T> {
        ctx.ensure_active()?;

        if entity.id().is_nil() {
            entity.assign_id(Uuid::new_v4());
        }
        if let Some(audit) = entity.audit_state_mut() {
            audit.stamp_created(ctx.user());
            audit.touch(ctx.user());
        }

        self.repo.add(&mut entity).await?;
        self.persist(&mut entity).await?;

        info!(kind = entity.kind(), id = %entity.id(), user = %ctx.user(), "record created");
        Ok(entity)
    }

    /// Plain fetch, soft-deleted records filtered out
    pub async fn get(&self, ctx: &OperationContext, id: Uuid) -> Result<Option<T>> {
        ctx.ensure_active()?;
        Ok(self
            .repo
            .find_by_id(id, FetchMode::ReadOnly, false)
            .await?)
    }

    /// Plain fetch that fails with `NotFound`
    pub async fn get_required(&self, ctx: &OperationContext, id: Uuid) -> Result<T> {
        ctx.ensure_active()?;
        self.repo.get_by_id(id, FetchMode::ReadOnly, false).await
    }

    /// Lock-aware read: acquires the lock (cascading to `depth`) and
    /// persists the lock state before returning the record
    pub async fn get_locked(&self, ctx: &OperationContext, id: Uuid, depth: u32) -> Result<T> {
        ctx.ensure_active()?;

        let mut entity = self.repo.get_by_id(id, FetchMode::ForUpdate, false).await?;
        cascade(&mut entity, CascadeOp::Lock, ctx.user(), self.depth(depth))?;
        self.persist(&mut entity).await?;

        info!(kind = entity.kind(), id = %entity.id(), user = %ctx.user(), "record locked for edit");
        Ok(entity)
    }

    /// All records, optionally including soft-deleted ones
    pub async fn list(&self, ctx: &OperationContext, include_deleted: bool) -> Result<Vec<T>> {
        ctx.ensure_active()?;
        Ok(self.repo.find_all(include_deleted).await?)
    }

    /// Filtered, paged query
    pub async fn find(
        &self,
        ctx: &OperationContext,
        spec: &dyn Specification<T>,
        page: Page,
    ) -> Result<Vec<T>> {
        ctx.ensure_active()?;
        Ok(self.repo.find_where(spec, page, false).await?)
    }

    /// Update under lock validation
    ///
    /// Validation failure aborts before any mutation. The caller-supplied
    /// mutation runs on the freshly fetched instance, then the audit
    /// modified stamp and the unlock cascade are applied, and everything
    /// is persisted in one write. A stale-version signal is translated
    /// into a typed conflict, never retried.
    pub async fn update<F>(
        &self,
        ctx: &OperationContext,
        id: Uuid,
        depth: u32,
        mutate: F,
    ) -> Result<T>
    where
        F: FnOnce(&mut T) -> Result<()> + Send,
    {
        ctx.ensure_active()?;
        let depth = self.depth(depth);

        let mut entity = self.repo.get_by_id(id, FetchMode::ForUpdate, false).await?;
        cascade(&mut entity, CascadeOp::Validate, ctx.user(), depth)?;

        mutate(&mut entity)?;
        if let Some(audit) = entity.audit_state_mut() {
            audit.touch(ctx.user());
        }
        cascade(&mut entity, CascadeOp::Unlock, ctx.user(), depth)?;

        self.persist(&mut entity).await?;

        info!(kind = entity.kind(), id = %entity.id(), user = %ctx.user(), "record updated");
        Ok(entity)
    }

    /// Release a held lock without updating (cancel-edit)
    pub async fn unlock(&self, ctx: &OperationContext, id: Uuid, depth: u32) -> Result<()> {
        ctx.ensure_active()?;

        let mut entity = self.repo.get_by_id(id, FetchMode::ForUpdate, false).await?;
        cascade(&mut entity, CascadeOp::Unlock, ctx.user(), self.depth(depth))?;
        self.persist(&mut entity).await?;
        Ok(())
    }

    /// Administrative release, no ownership check
    pub async fn force_unlock(&self, ctx: &OperationContext, id: Uuid, depth: u32) -> Result<()> {
        ctx.ensure_active()?;

        let mut entity = self.repo.get_by_id(id, FetchMode::ForUpdate, true).await?;
        cascade(&mut entity, CascadeOp::ForceUnlock, ctx.user(), self.depth(depth))?;
        self.persist(&mut entity).await?;

        info!(kind = entity.kind(), id = %entity.id(), user = %ctx.user(), "lock force-released");
        Ok(())
    }

    /// Delete: soft when the type supports it, physical otherwise
    pub async fn delete(&self, ctx: &OperationContext, id: Uuid, depth: u32) -> Result<()> {
        ctx.ensure_active()?;
        let depth = self.depth(depth);

        let mut entity = self.repo.get_by_id(id, FetchMode::ForUpdate, false).await?;
        cascade(&mut entity, CascadeOp::Validate, ctx.user(), depth)?;

        if entity.soft_delete_state().is_some() {
            cascade(&mut entity, CascadeOp::SoftDelete, ctx.user(), depth)?;
            self.persist(&mut entity).await?;
        } else {
            self.repo.remove(entity.id()).await?;
        }

        info!(kind = entity.kind(), id = %entity.id(), user = %ctx.user(), "record deleted");
        Ok(())
    }

    /// Physical removal regardless of soft-delete support
    pub async fn hard_delete(&self, ctx: &OperationContext, id: Uuid) -> Result<()> {
        ctx.ensure_active()?;

        let mut entity = self.repo.get_by_id(id, FetchMode::ForUpdate, true).await?;
        cascade(&mut entity, CascadeOp::Validate, ctx.user(), 0)?;
        self.repo.remove(entity.id()).await?;

        info!(kind = entity.kind(), id = %entity.id(), user = %ctx.user(), "record hard-deleted");
        Ok(())
    }

    /// Clear the soft-delete mark and stamp the modification
    pub async fn restore(&self, ctx: &OperationContext, id: Uuid, depth: u32) -> Result<T> {
        ctx.ensure_active()?;

        let mut entity = self.repo.get_by_id(id, FetchMode::ForUpdate, true).await?;
        if entity.soft_delete_state().is_none() {
            return Err(Error::RestoreUnsupported {
                kind: entity.kind(),
            });
        }

        cascade(&mut entity, CascadeOp::Restore, ctx.user(), self.depth(depth))?;
        if let Some(audit) = entity.audit_state_mut() {
            audit.touch(ctx.user());
        }
        self.persist(&mut entity).await?;

        info!(kind = entity.kind(), id = %entity.id(), user = %ctx.user(), "record restored");
        Ok(entity)
    }

    fn depth(&self, requested: u32) -> u32 {
        requested.min(self.config.max_cascade_depth)
    }

    async fn persist(&self, entity: &mut T) -> Result<u64> {
        self.repo
            .save(&mut *entity)
            .await
            .map_err(|err| resolve_save_error(&*entity, err))
    }
}
