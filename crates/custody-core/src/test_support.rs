//! Shared test fixtures
//!
//! A small order/line-item graph exercising every capability combination:
//! `Order` carries all four facets and cascades to its lines and tags,
//! `Line` is lockable and soft-deletable and cascades to adjustments,
//! `Adjustment` is lockable only, `Tag` has no facets at all.

use uuid::Uuid;

use crate::domain::audit::AuditState;
use crate::domain::entity::{Entity, UserId};
use crate::domain::lock::LockState;
use crate::domain::soft_delete::SoftDeleteState;
use crate::domain::version::VersionToken;

#[derive(Debug, Clone)]
pub(crate) struct Order {
    pub id: Uuid,
    pub customer: String,
    pub lock: LockState,
    pub tombstone: SoftDeleteState,
    pub audit: AuditState,
    pub version: VersionToken,
    pub lines: Vec<Line>,
    pub tags: Vec<Tag>,
}

impl Order {
    pub fn new(customer: impl Into<String>, user: &UserId) -> Self {
        Self {
            id: Uuid::nil(),
            customer: customer.into(),
            lock: LockState::new(),
            tombstone: SoftDeleteState::new(),
            audit: AuditState::new(user),
            version: VersionToken::fresh(),
            lines: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_line(mut self, sku: impl Into<String>, quantity: u32) -> Self {
        self.lines.push(Line::new(sku, quantity));
        self
    }

    pub fn line(&self, sku: &str) -> Option<&Line> {
        self.lines.iter().find(|l| l.sku == sku)
    }
}

impl Entity for Order {
    fn id(&self) -> Uuid {
        self.id
    }

    fn assign_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn kind(&self) -> &'static str {
        "Order"
    }

    fn lock_state(&self) -> Option<&LockState> {
        Some(&self.lock)
    }

    fn lock_state_mut(&mut self) -> Option<&mut LockState> {
        Some(&mut self.lock)
    }

    fn soft_delete_state(&self) -> Option<&SoftDeleteState> {
        Some(&self.tombstone)
    }

    fn soft_delete_state_mut(&mut self) -> Option<&mut SoftDeleteState> {
        Some(&mut self.tombstone)
    }

    fn audit_state(&self) -> Option<&AuditState> {
        Some(&self.audit)
    }

    fn audit_state_mut(&mut self) -> Option<&mut AuditState> {
        Some(&mut self.audit)
    }

    fn version(&self) -> Option<VersionToken> {
        Some(self.version)
    }

    fn set_version(&mut self, token: VersionToken) {
        self.version = token;
    }

    fn cascading(&mut self) -> Vec<&mut dyn Entity> {
        self.lines
            .iter_mut()
            .map(|l| l as &mut dyn Entity)
            .chain(self.tags.iter_mut().map(|t| t as &mut dyn Entity))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Line {
    pub id: Uuid,
    pub sku: String,
    pub quantity: u32,
    pub lock: LockState,
    pub tombstone: SoftDeleteState,
    pub adjustments: Vec<Adjustment>,
}

impl Line {
    pub fn new(sku: impl Into<String>, quantity: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            sku: sku.into(),
            quantity,
            lock: LockState::new(),
            tombstone: SoftDeleteState::new(),
            adjustments: Vec::new(),
        }
    }
}

impl Entity for Line {
    fn id(&self) -> Uuid {
        self.id
    }

    fn assign_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn kind(&self) -> &'static str {
        "Line"
    }

    fn lock_state(&self) -> Option<&LockState> {
        Some(&self.lock)
    }

    fn lock_state_mut(&mut self) -> Option<&mut LockState> {
        Some(&mut self.lock)
    }

    fn soft_delete_state(&self) -> Option<&SoftDeleteState> {
        Some(&self.tombstone)
    }

    fn soft_delete_state_mut(&mut self) -> Option<&mut SoftDeleteState> {
        Some(&mut self.tombstone)
    }

    fn cascading(&mut self) -> Vec<&mut dyn Entity> {
        self.adjustments
            .iter_mut()
            .map(|a| a as &mut dyn Entity)
            .collect()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Adjustment {
    pub id: Uuid,
    pub amount: i64,
    pub lock: LockState,
}

impl Adjustment {
    pub fn new(amount: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            lock: LockState::new(),
        }
    }
}

impl Entity for Adjustment {
    fn id(&self) -> Uuid {
        self.id
    }

    fn assign_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn kind(&self) -> &'static str {
        "Adjustment"
    }

    fn lock_state(&self) -> Option<&LockState> {
        Some(&self.lock)
    }

    fn lock_state_mut(&mut self) -> Option<&mut LockState> {
        Some(&mut self.lock)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Tag {
    pub id: Uuid,
    pub label: String,
}

impl Tag {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
        }
    }
}

impl Entity for Tag {
    fn id(&self) -> Uuid {
        self.id
    }

    fn assign_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn kind(&self) -> &'static str {
        "Tag"
    }
}
