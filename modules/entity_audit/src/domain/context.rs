//! Audited unit of work over a SeaORM connection
//!
//! `AuditDbContext` tracks models, and on save captures the change trail,
//! populates audit fields, writes the entities in one transaction and then
//! persists the trail in a second write.

use super::capabilities::AuditEntity;
use super::capture::{CaptureScope, CapturedChange};
use super::error::AuditError;
use super::filters::QueryFilters;
use super::repository::EntityChangeRepository;
use super::schema::{AuditModel, EntitySchema};
use super::soft_delete::{mark_deleted, mark_restored};
use super::tracker::{Entry, EntityState, Tracked, TrackedEntry};
use crate::config::AuditConfig;
use crate::contract::{AuditContextProvider, EntityChange};
use crate::infra::storage::migrations::missing_audit_schema;
use crate::infra::storage::repositories::SeaOrmEntityChangeRepository;
use chrono::Utc;
use sea_orm::{
    DatabaseConnection, DatabaseTransaction, EntityTrait, IntoActiveModel, QueryFilter, Select,
    TransactionTrait,
};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Progress of a single save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStage {
    Start,
    Captured,
    Populated,
    PrimaryCommitted,
    AuditCommitted,
    Done,
}

impl fmt::Display for SaveStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Captured => "captured",
            Self::Populated => "populated",
            Self::PrimaryCommitted => "primary_committed",
            Self::AuditCommitted => "audit_committed",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Options for [`AuditDbContext::save_with`]
#[derive(Debug, Clone)]
pub struct SaveOptions {
    /// Reset tracked entries to Unchanged once the entities are committed
    pub accept_all_changes_on_success: bool,
    /// Observed between entity writes and before the primary commit
    pub cancellation: Option<CancellationToken>,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            accept_all_changes_on_success: true,
            cancellation: None,
        }
    }
}

impl SaveOptions {
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn keep_changes(mut self) -> Self {
        self.accept_all_changes_on_success = false;
        self
    }
}

/// Shared pieces every context is built from
#[derive(Clone)]
struct Shared {
    db: Arc<DatabaseConnection>,
    model: Arc<AuditModel>,
    provider: Arc<dyn AuditContextProvider>,
    audit_repo: Arc<dyn EntityChangeRepository>,
    filters: QueryFilters,
}

/// Builder for [`AuditDbContext`] and [`AuditDbContextFactory`]
pub struct AuditDbContextBuilder {
    db: Arc<DatabaseConnection>,
    model: Option<Arc<AuditModel>>,
    provider: Option<Arc<dyn AuditContextProvider>>,
    audit_repo: Option<Arc<dyn EntityChangeRepository>>,
    filters: QueryFilters,
}

impl AuditDbContextBuilder {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            model: None,
            provider: None,
            audit_repo: None,
            filters: QueryFilters::default(),
        }
    }

    /// Pre-resolved schemas; a fresh registry is used otherwise
    pub fn model(mut self, model: Arc<AuditModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Source of user, tenant and correlation id (required)
    pub fn provider(mut self, provider: Arc<dyn AuditContextProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Where the trail is written; defaults to the SeaORM tables on the same connection
    pub fn audit_repository(mut self, repo: Arc<dyn EntityChangeRepository>) -> Self {
        self.audit_repo = Some(repo);
        self
    }

    pub fn filters(mut self, filters: QueryFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Apply the filter switches from configuration
    pub fn config(self, config: &AuditConfig) -> Self {
        self.filters(QueryFilters {
            soft_delete: config.soft_delete_filter,
            tenant: config.tenant_filter,
        })
    }

    fn into_shared(self) -> Result<Shared, AuditError> {
        let provider = self.provider.ok_or_else(|| {
            AuditError::Configuration("an audit context provider is required".to_string())
        })?;
        let audit_repo = self.audit_repo.unwrap_or_else(|| {
            Arc::new(SeaOrmEntityChangeRepository::new(self.db.clone()))
                as Arc<dyn EntityChangeRepository>
        });

        Ok(Shared {
            db: self.db,
            model: self.model.unwrap_or_default(),
            provider,
            audit_repo,
            filters: self.filters,
        })
    }

    pub fn build(self) -> Result<AuditDbContext, AuditError> {
        Ok(AuditDbContext::from_shared(self.into_shared()?))
    }

    pub fn build_factory(self) -> Result<AuditDbContextFactory, AuditError> {
        Ok(AuditDbContextFactory {
            shared: self.into_shared()?,
        })
    }
}

/// Creates one context per request over shared configuration
#[derive(Clone)]
pub struct AuditDbContextFactory {
    shared: Shared,
}

impl AuditDbContextFactory {
    pub fn create(&self) -> AuditDbContext {
        AuditDbContext::from_shared(self.shared.clone())
    }

    pub fn model(&self) -> &Arc<AuditModel> {
        &self.shared.model
    }
}

/// Unit of work with change capture
///
/// Not shared between tasks: every save takes `&mut self`.
pub struct AuditDbContext {
    shared: Shared,
    filters: QueryFilters,
    entries: Vec<Box<dyn TrackedEntry>>,
}

impl AuditDbContext {
    pub fn builder(db: Arc<DatabaseConnection>) -> AuditDbContextBuilder {
        AuditDbContextBuilder::new(db)
    }

    fn from_shared(shared: Shared) -> Self {
        let filters = shared.filters;
        Self {
            shared,
            filters,
            entries: Vec::new(),
        }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.shared.db
    }

    /// Check that the audit tables, columns, indexes and cascade relationship exist
    pub async fn verify_schema(&self) -> Result<(), AuditError> {
        let missing = missing_audit_schema(&self.shared.db).await?;
        if missing.is_empty() {
            return Ok(());
        }
        Err(AuditError::Configuration(format!(
            "audit schema is incomplete, missing: {}",
            missing.join(", ")
        )))
    }

    // ===== Tracking =====

    /// Track a new entity to be inserted on the next save
    pub fn add<M>(&mut self, model: M) -> Tracked<M>
    where
        M: AuditEntity + IntoActiveModel<M::ActiveModel>,
        M::Entity: EntityTrait<Model = M>,
    {
        let schema = self.shared.model.schema::<M>();
        let handle = Tracked::new(model);
        self.entries
            .push(Box::new(Entry::added(handle.clone(), schema)));
        handle
    }

    /// Track an existing row as Unchanged
    ///
    /// If the same row is already tracked its handle is returned and `model`
    /// is discarded.
    pub fn attach<M>(&mut self, model: M) -> Tracked<M>
    where
        M: AuditEntity + IntoActiveModel<M::ActiveModel>,
        M::Entity: EntityTrait<Model = M>,
    {
        let schema = self.shared.model.schema::<M>();
        self.track_existing(model, &schema)
    }

    fn track_existing<M>(&mut self, model: M, schema: &Arc<EntitySchema<M>>) -> Tracked<M>
    where
        M: AuditEntity + IntoActiveModel<M::ActiveModel>,
        M::Entity: EntityTrait<Model = M>,
    {
        let key = schema.identity_key(&model);
        let tracked = self
            .entries
            .iter()
            .filter(|entry| entry.identity_key().as_deref() == Some(key.as_str()))
            .find_map(|entry| entry.as_any().downcast_ref::<Entry<M>>());
        if let Some(entry) = tracked {
            return entry.handle().clone();
        }

        let handle = Tracked::new(model);
        self.entries
            .push(Box::new(Entry::unchanged(handle.clone(), schema.clone())));
        handle
    }

    /// Run `select` and track every returned row
    pub async fn load<M>(&mut self, select: Select<M::Entity>) -> Result<Vec<Tracked<M>>, AuditError>
    where
        M: AuditEntity + IntoActiveModel<M::ActiveModel>,
        M::Entity: EntityTrait<Model = M>,
    {
        let rows = select.all(&*self.shared.db).await?;
        let schema = self.shared.model.schema::<M>();
        Ok(rows
            .into_iter()
            .map(|row| self.track_existing(row, &schema))
            .collect())
    }

    pub async fn load_one<M>(
        &mut self,
        select: Select<M::Entity>,
    ) -> Result<Option<Tracked<M>>, AuditError>
    where
        M: AuditEntity + IntoActiveModel<M::ActiveModel>,
        M::Entity: EntityTrait<Model = M>,
    {
        let row = select.one(&*self.shared.db).await?;
        let schema = self.shared.model.schema::<M>();
        Ok(row.map(|row| self.track_existing(row, &schema)))
    }

    fn position_of<M: AuditEntity>(&self, handle: &Tracked<M>) -> Result<usize, AuditError> {
        let identity = handle.identity();
        self.entries
            .iter()
            .position(|entry| entry.handle_identity() == identity)
            .ok_or_else(|| {
                AuditError::InvalidOperation("entity is not tracked by this context".to_string())
            })
    }

    /// Schedule a physical delete; unsaved entities are simply detached
    pub fn remove<M: AuditEntity>(&mut self, handle: &Tracked<M>) -> Result<(), AuditError> {
        let index = self.position_of(handle)?;
        if self.entries[index].mark_removed() {
            self.entries.remove(index);
        }
        Ok(())
    }

    /// Flag a tracked entity as deleted; written as an update on the next save
    pub fn soft_delete<M: AuditEntity>(&mut self, handle: &Tracked<M>) -> Result<(), AuditError> {
        let entity_name = self.persisted_entity_name(handle, "soft deleted")?;
        handle.modify(|model| mark_deleted(model, &entity_name))
    }

    /// Clear the deleted flag of a tracked soft-deleted entity
    pub fn restore<M: AuditEntity>(&mut self, handle: &Tracked<M>) -> Result<(), AuditError> {
        let entity_name = self.persisted_entity_name(handle, "restored")?;
        handle.modify(|model| mark_restored(model, &entity_name))
    }

    /// Entity name of a tracked entry that already exists in the database
    fn persisted_entity_name<M: AuditEntity>(
        &self,
        handle: &Tracked<M>,
        action: &str,
    ) -> Result<String, AuditError> {
        let entry = &self.entries[self.position_of(handle)?];
        match entry.state() {
            EntityState::Added => Err(AuditError::InvalidOperation(format!(
                "{} has not been saved yet and cannot be {}",
                entry.entity_name(),
                action
            ))),
            EntityState::Deleted => Err(AuditError::InvalidOperation(format!(
                "{} is scheduled for removal and cannot be {}",
                entry.entity_name(),
                action
            ))),
            EntityState::Unchanged | EntityState::Modified => Ok(entry.entity_name().to_string()),
        }
    }

    /// Current state of a tracked entity, `None` when untracked
    pub fn state_of<M: AuditEntity>(&mut self, handle: &Tracked<M>) -> Option<EntityState> {
        let index = self.position_of(handle).ok()?;
        Some(self.entries[index].detect_changes())
    }

    pub fn has_changes(&mut self) -> bool {
        self.entries
            .iter_mut()
            .any(|entry| entry.detect_changes() != EntityState::Unchanged)
    }

    /// Make the current values the baseline without saving
    pub fn accept_all_changes(&mut self) {
        for entry in &mut self.entries {
            entry.detect_changes();
        }
        self.entries.retain_mut(|entry| entry.accept_changes());
    }

    pub fn tracked_count(&self) -> usize {
        self.entries.len()
    }

    // ===== Queries =====

    /// Select with the enabled global filters applied
    pub fn query<M: AuditEntity>(&self) -> Select<M::Entity> {
        let schema = self.shared.model.schema::<M>();
        let tenant_id = self.shared.provider.current().tenant_id;
        let select = <M::Entity as EntityTrait>::find();
        if self.filters.is_noop(&schema, tenant_id) {
            return select;
        }
        select.filter(self.filters.condition(&schema, tenant_id))
    }

    /// Select bypassing every global filter
    pub fn query_unfiltered<M: AuditEntity>(&self) -> Select<M::Entity> {
        <M::Entity as EntityTrait>::find()
    }

    pub fn filters(&self) -> QueryFilters {
        self.filters
    }

    pub fn filters_mut(&mut self) -> &mut QueryFilters {
        &mut self.filters
    }

    // ===== Save =====

    /// Save with default options, returning the number of entity rows written
    pub async fn save(&mut self) -> Result<u64, AuditError> {
        self.save_with(SaveOptions::default()).await
    }

    pub async fn save_with(&mut self, options: SaveOptions) -> Result<u64, AuditError> {
        let audit = self.shared.provider.current();
        let transaction_unique = Uuid::new_v4();
        let now = Utc::now();
        let mut stage = SaveStage::Start;

        tracing::debug!(%transaction_unique, %stage, tracked = self.entries.len(), "Saving unit of work");

        for entry in &mut self.entries {
            entry.detect_changes();
        }

        let scope = CaptureScope {
            transaction_unique,
            now,
            audit: &audit,
        };
        let mut captured: Vec<CapturedChange> = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(entry, tracked)| {
                tracked
                    .capture(&scope)
                    .map(|(change, key_pending)| CapturedChange {
                        change,
                        entry,
                        key_pending,
                    })
            })
            .collect();
        stage = SaveStage::Captured;
        tracing::debug!(%transaction_unique, %stage, changes = captured.len(), "Captured entity changes");

        for entry in &mut self.entries {
            entry.populate(now, &audit);
        }
        stage = SaveStage::Populated;
        tracing::debug!(%transaction_unique, %stage, "Populated audit fields");

        if options.cancellation.as_ref().is_some_and(|t| t.is_cancelled()) {
            return Err(AuditError::Cancelled(stage));
        }
        let written = self
            .write_primary(stage, options.cancellation.as_ref())
            .await;
        let rows = match written {
            Ok(rows) => rows,
            Err(err) => {
                for entry in &mut self.entries {
                    entry.discard_written();
                }
                tracing::warn!(%transaction_unique, %stage, error = %err, "Primary save failed, no audit trail written");
                return Err(err);
            }
        };
        stage = SaveStage::PrimaryCommitted;
        tracing::debug!(%transaction_unique, %stage, rows, "Committed entities");

        for entry in &mut self.entries {
            entry.apply_written();
        }
        for pending in captured.iter_mut().filter(|c| c.key_pending) {
            pending.change.item_id = self
                .entries
                .get(pending.entry)
                .and_then(|entry| entry.item_id());
        }

        if options.accept_all_changes_on_success {
            self.entries.retain_mut(|entry| entry.accept_changes());
        }

        // Past the primary commit the trail is always attempted, cancellation is no longer observed
        if captured.is_empty() {
            tracing::debug!(%transaction_unique, "No change-audited entries, audit write skipped");
        } else {
            let changes: Vec<EntityChange> =
                captured.into_iter().map(|captured| captured.change).collect();
            if let Err(err) = self.shared.audit_repo.insert_batch(&changes).await {
                tracing::error!(
                    %transaction_unique,
                    changes = changes.len(),
                    error = %err,
                    "Entities committed but the audit trail could not be written"
                );
                return Err(AuditError::AuditPersist(err));
            }
            stage = SaveStage::AuditCommitted;
            tracing::debug!(%transaction_unique, %stage, changes = changes.len(), "Committed audit trail");
        }

        stage = SaveStage::Done;
        tracing::info!(%transaction_unique, %stage, rows, "Save completed");
        Ok(rows)
    }

    /// Write every pending entry in one transaction
    ///
    /// Cancellation is observed around each entity write and once more before
    /// the commit. The commit itself is never interrupted.
    async fn write_primary(
        &mut self,
        stage: SaveStage,
        cancellation: Option<&CancellationToken>,
    ) -> Result<u64, AuditError> {
        let txn = self
            .shared
            .db
            .begin()
            .await
            .map_err(|source| AuditError::PrimarySave { stage, source })?;

        let mut rows = 0;
        for entry in self.entries.iter_mut() {
            let written = match cancellation {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => None,
                    result = entry.write(&txn) => Some(result),
                },
                None => Some(entry.write(&txn).await),
            };

            match written {
                Some(Ok(count)) => rows += count,
                Some(Err(source)) => {
                    tracing::debug!(entity = entry.entity_name(), state = %entry.state(), "Entity write failed");
                    rollback(txn).await;
                    return Err(AuditError::PrimarySave { stage, source });
                }
                None => {
                    tracing::debug!(entity = entry.entity_name(), "Save cancelled during entity writes");
                    rollback(txn).await;
                    return Err(AuditError::Cancelled(stage));
                }
            }
        }

        if cancellation.is_some_and(|token| token.is_cancelled()) {
            rollback(txn).await;
            return Err(AuditError::Cancelled(stage));
        }

        txn.commit()
            .await
            .map_err(|source| AuditError::PrimarySave { stage, source })?;
        Ok(rows)
    }
}

async fn rollback(txn: DatabaseTransaction) {
    if let Err(err) = txn.rollback().await {
        tracing::warn!(error = %err, "Rollback of the entity transaction failed");
    }
}
