//! Declarative audit schema per entity type
//!
//! Entities declare which columns are audited (and how their values are
//! rendered) through [`AuditSchema`]. The declaration is resolved once per
//! type into an [`EntitySchema`] together with the SeaORM metadata the
//! pipeline needs, and cached in the [`AuditModel`] registry.

use super::capabilities::AuditEntity;
use parking_lot::RwLock;
use sea_orm::{
    EntityName, EntityTrait, IdenStatic, Iterable, ModelTrait, PrimaryKeyToColumn,
    PrimaryKeyTrait, Value,
};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Column type of a model's entity
pub type ColumnOf<M> = <<M as ModelTrait>::Entity as EntityTrait>::Column;

/// How an audited value is rendered into the trail
#[derive(Debug, Clone, Copy, Default)]
pub enum ValueFormat {
    /// ISO-8601 for date/time values, invariant formatting otherwise
    #[default]
    Standard,
    /// Fixed number of decimal places for numeric values
    Decimals(usize),
    /// chrono `strftime` pattern for date/time values
    DateTime(&'static str),
    /// Caller-supplied renderer; `None` records a null value
    Custom(fn(&Value) -> Option<String>),
}

/// Marks a column as change-tracked
#[derive(Debug, Clone, Copy)]
pub struct AuditedProperty<C> {
    pub column: C,
    /// Record a placeholder instead of the actual values
    pub hide_value_changes: bool,
    pub format: ValueFormat,
}

/// Documents why a column is deliberately not audited; no runtime effect
#[derive(Debug, Clone, Copy)]
pub struct IgnoredProperty<C> {
    pub column: C,
    pub reason: Option<&'static str>,
}

/// Audit declaration returned by [`AuditEntity::audit_schema`]
pub struct AuditSchema<M>
where
    M: ModelTrait,
{
    entity_name: String,
    audited: Vec<AuditedProperty<ColumnOf<M>>>,
    ignored: Vec<IgnoredProperty<ColumnOf<M>>>,
    soft_delete_column: Option<ColumnOf<M>>,
    tenant_column: Option<ColumnOf<M>>,
}

impl<M> AuditSchema<M>
where
    M: ModelTrait,
{
    /// Start a declaration; `entity_name` is recorded on every change header
    pub fn new(entity_name: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            audited: Vec::new(),
            ignored: Vec::new(),
            soft_delete_column: None,
            tenant_column: None,
        }
    }

    pub fn audited(self, column: ColumnOf<M>) -> Self {
        self.audited_with_format(column, ValueFormat::Standard)
    }

    /// Audited, but values are replaced with the hidden placeholder
    pub fn audited_hidden(mut self, column: ColumnOf<M>) -> Self {
        self.audited.push(AuditedProperty {
            column,
            hide_value_changes: true,
            format: ValueFormat::Standard,
        });
        self
    }

    pub fn audited_with_format(mut self, column: ColumnOf<M>, format: ValueFormat) -> Self {
        self.audited.push(AuditedProperty {
            column,
            hide_value_changes: false,
            format,
        });
        self
    }

    pub fn ignored(mut self, column: ColumnOf<M>, reason: Option<&'static str>) -> Self {
        self.ignored.push(IgnoredProperty { column, reason });
        self
    }

    /// Column holding `is_deleted`, used by the soft-delete query filter
    pub fn soft_delete_column(mut self, column: ColumnOf<M>) -> Self {
        self.soft_delete_column = Some(column);
        self
    }

    /// Column holding `tenant_id`, used by the tenant query filter
    pub fn tenant_column(mut self, column: ColumnOf<M>) -> Self {
        self.tenant_column = Some(column);
        self
    }
}

/// Resolved metadata for one entity type
pub struct EntitySchema<M>
where
    M: ModelTrait,
{
    pub entity_name: String,
    pub table_name: String,
    pub key_columns: Vec<ColumnOf<M>>,
    /// Primary key is generated by the database on insert
    pub generated_key: bool,
    pub columns: Vec<ColumnOf<M>>,
    /// Audited columns in declaration order of the entity, keys excluded
    pub audited: Vec<AuditedProperty<ColumnOf<M>>>,
    pub ignored: Vec<IgnoredProperty<ColumnOf<M>>>,
    pub soft_delete_column: Option<ColumnOf<M>>,
    pub tenant_column: Option<ColumnOf<M>>,
}

impl<M> EntitySchema<M>
where
    M: AuditEntity,
{
    /// Combine the entity's declaration with its SeaORM metadata
    pub fn resolve() -> Self {
        let declared = M::audit_schema();
        let table_name = <M::Entity as Default>::default().table_name().to_string();
        let key_columns: Vec<ColumnOf<M>> =
            <<M::Entity as EntityTrait>::PrimaryKey as Iterable>::iter()
                .map(|key| key.into_column())
                .collect();
        let generated_key =
            <<M::Entity as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::auto_increment();
        let columns: Vec<ColumnOf<M>> = <ColumnOf<M> as Iterable>::iter().collect();

        let is_key = |column: &ColumnOf<M>| {
            key_columns
                .iter()
                .any(|key| key.as_str() == column.as_str())
        };

        // Entity column order, first declaration wins
        let mut audited = Vec::with_capacity(declared.audited.len());
        for column in &columns {
            let Some(property) = declared
                .audited
                .iter()
                .find(|p| p.column.as_str() == column.as_str())
            else {
                continue;
            };
            if is_key(column) {
                tracing::debug!(
                    entity = %declared.entity_name,
                    column = column.as_str(),
                    "Primary key columns are never audited; declaration skipped"
                );
                continue;
            }
            audited.push(*property);
        }

        Self {
            entity_name: declared.entity_name,
            table_name,
            key_columns,
            generated_key,
            columns,
            audited,
            ignored: declared.ignored,
            soft_delete_column: declared.soft_delete_column,
            tenant_column: declared.tenant_column,
        }
    }

    pub fn is_audited(&self, column: &ColumnOf<M>) -> bool {
        self.audited
            .iter()
            .any(|p| p.column.as_str() == column.as_str())
    }

    pub fn is_key(&self, column: &ColumnOf<M>) -> bool {
        self.key_columns
            .iter()
            .any(|key| key.as_str() == column.as_str())
    }

    /// Rust-side property name for a column (the `Column` variant name)
    pub fn property_name(column: &ColumnOf<M>) -> String {
        format!("{:?}", column)
    }

    /// Single integer primary key of a model, if it has one
    pub fn item_key(&self, model: &M) -> Option<i64> {
        match self.key_columns.as_slice() {
            [key] => super::format::value_as_i64(&model.get(*key)),
            _ => None,
        }
    }

    /// Stable identity of a persisted row within its table
    pub fn identity_key(&self, model: &M) -> String {
        let values: Vec<String> = self
            .key_columns
            .iter()
            .map(|key| format!("{:?}", model.get(*key)))
            .collect();
        format!("{}:{}", self.table_name, values.join(","))
    }
}

/// Type-keyed registry of resolved entity schemas
///
/// Built once at startup and shared by every context; entities that were not
/// registered up front are resolved on first use.
#[derive(Default)]
pub struct AuditModel {
    schemas: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl AuditModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve and cache an entity's schema
    pub fn with_entity<M: AuditEntity>(self) -> Self {
        self.schema::<M>();
        self
    }

    pub fn is_registered<M: AuditEntity>(&self) -> bool {
        self.schemas.read().contains_key(&TypeId::of::<M>())
    }

    /// Resolved schema for `M`
    pub fn schema<M: AuditEntity>(&self) -> Arc<EntitySchema<M>> {
        let type_id = TypeId::of::<M>();
        if let Some(found) = self.schemas.read().get(&type_id).cloned() {
            if let Ok(schema) = found.downcast::<EntitySchema<M>>() {
                return schema;
            }
        }

        let resolved = Arc::new(EntitySchema::<M>::resolve());
        tracing::debug!(
            entity = %resolved.entity_name,
            table = %resolved.table_name,
            audited = resolved.audited.len(),
            "Resolved audit schema"
        );
        let stored = self
            .schemas
            .write()
            .entry(type_id)
            .or_insert_with(|| resolved.clone() as Arc<dyn Any + Send + Sync>)
            .clone();
        stored.downcast::<EntitySchema<M>>().unwrap_or(resolved)
    }
}
