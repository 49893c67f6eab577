//! Change tracking for the unit of work
//!
//! SeaORM hands out plain models, so the context keeps its own snapshot per
//! tracked entity and diffs it against the live model at save time.

use super::capabilities::AuditEntity;
use super::capture::{capture_entry, CaptureScope};
use super::populate::populate_entry;
use super::schema::EntitySchema;
use crate::contract::{AuditContext, EntityChange};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::{RwLock, RwLockReadGuard};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DatabaseTransaction, DbErr, EntityTrait,
    IntoActiveModel,
};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Lifecycle state of a tracked entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    Unchanged,
    Added,
    Modified,
    Deleted,
}

impl fmt::Display for EntityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unchanged => "unchanged",
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
        };
        f.write_str(name)
    }
}

/// Shared handle to a model tracked by an [`AuditDbContext`](super::AuditDbContext)
///
/// Clones point at the same model. Edits made through [`Tracked::modify`]
/// are picked up by the next save.
pub struct Tracked<M> {
    inner: Arc<RwLock<M>>,
}

impl<M> Clone for Tracked<M> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<M: fmt::Debug> fmt::Debug for Tracked<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Tracked").field(&*self.inner.read()).finish()
    }
}

impl<M: Clone> Tracked<M> {
    pub(crate) fn new(model: M) -> Self {
        Self {
            inner: Arc::new(RwLock::new(model)),
        }
    }

    /// Snapshot of the current model
    pub fn get(&self) -> M {
        self.inner.read().clone()
    }

    pub fn read(&self) -> RwLockReadGuard<'_, M> {
        self.inner.read()
    }

    /// Mutate the tracked model in place
    pub fn modify<R>(&self, f: impl FnOnce(&mut M) -> R) -> R {
        f(&mut self.inner.write())
    }

    pub(crate) fn replace(&self, model: M) {
        *self.inner.write() = model;
    }

    /// Address-based identity, equal for every clone of the handle
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }
}

/// Type-erased view of one tracked entry
#[async_trait]
pub(crate) trait TrackedEntry: Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn handle_identity(&self) -> usize;

    /// Table-qualified key of a persisted row, `None` while unsaved
    fn identity_key(&self) -> Option<String>;

    fn entity_name(&self) -> &str;

    fn state(&self) -> EntityState;

    /// Re-evaluate Unchanged / Modified against the original snapshot
    fn detect_changes(&mut self) -> EntityState;

    /// Schedule removal; returns true when the entry should simply be detached
    fn mark_removed(&mut self) -> bool;

    fn capture(&self, scope: &CaptureScope<'_>) -> Option<(EntityChange, bool)>;

    fn populate(&mut self, now: DateTime<Utc>, audit: &AuditContext);

    /// Issue the pending statement; the written row is kept until applied
    async fn write(&mut self, txn: &DatabaseTransaction) -> Result<u64, DbErr>;

    /// Push the written row (generated keys, database defaults) into the handle
    fn apply_written(&mut self);

    fn discard_written(&mut self);

    /// The entity's own item id as seen by the change trail
    fn item_id(&self) -> Option<i64>;

    /// Make the current values the new baseline; returns false when the entry
    /// should be detached
    fn accept_changes(&mut self) -> bool;
}

pub(crate) struct Entry<M: AuditEntity> {
    state: EntityState,
    original: Option<M>,
    current: Tracked<M>,
    written: Option<M>,
    schema: Arc<EntitySchema<M>>,
}

impl<M: AuditEntity> Entry<M> {
    pub(crate) fn added(current: Tracked<M>, schema: Arc<EntitySchema<M>>) -> Self {
        Self {
            state: EntityState::Added,
            original: None,
            current,
            written: None,
            schema,
        }
    }

    pub(crate) fn unchanged(current: Tracked<M>, schema: Arc<EntitySchema<M>>) -> Self {
        let original = Some(current.get());
        Self {
            state: EntityState::Unchanged,
            original,
            current,
            written: None,
            schema,
        }
    }

    pub(crate) fn handle(&self) -> &Tracked<M> {
        &self.current
    }

    fn differs_from_original(&self) -> bool {
        let Some(original) = self.original.as_ref() else {
            return false;
        };
        let current = self.current.read();
        self.schema
            .columns
            .iter()
            .any(|column| original.get(*column) != current.get(*column))
    }

    fn insert_model(&self, model: &M) -> M::ActiveModel {
        let mut active = <M::ActiveModel as ActiveModelBehavior>::new();
        for column in &self.schema.columns {
            if self.schema.generated_key && self.schema.is_key(column) {
                continue;
            }
            active.set(*column, model.get(*column));
        }
        active
    }
}

#[async_trait]
impl<M> TrackedEntry for Entry<M>
where
    M: AuditEntity + IntoActiveModel<M::ActiveModel>,
    M::Entity: EntityTrait<Model = M>,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn handle_identity(&self) -> usize {
        self.current.identity()
    }

    fn identity_key(&self) -> Option<String> {
        match self.state {
            EntityState::Added => None,
            _ => Some(self.schema.identity_key(&self.current.read())),
        }
    }

    fn entity_name(&self) -> &str {
        &self.schema.entity_name
    }

    fn state(&self) -> EntityState {
        self.state
    }

    fn detect_changes(&mut self) -> EntityState {
        if matches!(self.state, EntityState::Unchanged | EntityState::Modified) {
            self.state = if self.differs_from_original() {
                EntityState::Modified
            } else {
                EntityState::Unchanged
            };
        }
        self.state
    }

    fn mark_removed(&mut self) -> bool {
        if self.state == EntityState::Added {
            return true;
        }
        self.state = EntityState::Deleted;
        false
    }

    fn capture(&self, scope: &CaptureScope<'_>) -> Option<(EntityChange, bool)> {
        let current = self.current.read();
        capture_entry(
            self.state,
            self.original.as_ref(),
            &current,
            &self.schema,
            scope,
        )
    }

    fn populate(&mut self, now: DateTime<Utc>, audit: &AuditContext) {
        let original = self.original.as_ref();
        self.current
            .modify(|current| populate_entry(self.state, original, current, now, audit));
    }

    async fn write(&mut self, txn: &DatabaseTransaction) -> Result<u64, DbErr> {
        self.written = None;
        let current = self.current.get();

        match self.state {
            EntityState::Unchanged => Ok(0),
            EntityState::Added => {
                let active = self.insert_model(&current);
                let inserted = active.insert(txn).await?;
                self.written = Some(inserted);
                Ok(1)
            }
            EntityState::Modified => {
                let Some(original) = self.original.clone() else {
                    return Ok(0);
                };
                let mut active: M::ActiveModel = original.clone().into_active_model();
                for column in &self.schema.columns {
                    let value = current.get(*column);
                    if original.get(*column) != value {
                        active.set(*column, value);
                    }
                }
                let updated = active.update(txn).await?;
                self.written = Some(updated);
                Ok(1)
            }
            EntityState::Deleted => {
                let target = self.original.clone().unwrap_or(current);
                let active: M::ActiveModel = target.into_active_model();
                let result = active.delete(txn).await?;
                Ok(result.rows_affected)
            }
        }
    }

    fn apply_written(&mut self) {
        if let Some(written) = self.written.take() {
            self.current.replace(written);
        }
    }

    fn discard_written(&mut self) {
        self.written = None;
    }

    fn item_id(&self) -> Option<i64> {
        let current = self.current.read();
        current
            .change_audited()
            .and_then(|audited| audited.item_id())
            .or_else(|| self.schema.item_key(&current))
    }

    fn accept_changes(&mut self) -> bool {
        if self.state == EntityState::Deleted {
            return false;
        }
        self.original = Some(self.current.get());
        self.state = EntityState::Unchanged;
        true
    }
}
