//! Contract models for the entity audit trail
//!
//! These models are transport-agnostic and used for inter-module communication.
//! NO serde derives - these are pure domain models.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Kind of change recorded for an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityChangeOperation {
    Create,
    Update,
    /// Physical deletion or a soft-delete transition
    Delete,
}

impl EntityChangeOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }
}

impl fmt::Display for EntityChangeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityChangeOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Create" => Ok(Self::Create),
            "Update" => Ok(Self::Update),
            "Delete" => Ok(Self::Delete),
            other => Err(format!("unknown entity change operation: {}", other)),
        }
    }
}

/// Audit header: one row per changed entity per save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityChange {
    /// Generated identifier, `None` until persisted
    pub id: Option<i32>,
    /// Groups every change produced by one save call
    pub transaction_unique: Uuid,
    /// Correlation id supplied by the audit context
    pub correlation_id: Option<String>,
    /// Database table of the changed entity
    pub table_name: String,
    /// Logical entity name
    pub entity_name: String,
    /// Primary key of the changed row; back-filled for inserts
    pub item_id: Option<i64>,
    /// Create, Update or Delete
    pub operation: EntityChangeOperation,
    /// When the save happened (UTC)
    pub changed_on: DateTime<Utc>,
    /// User performing the save
    pub changed_by: Option<Uuid>,
    /// Free-text label provided by the entity
    pub description: Option<String>,
    /// Optional hierarchical grouping
    pub parent_entity_name: Option<String>,
    pub parent_item_id: Option<i64>,
    /// Property-level detail rows
    pub properties: Vec<EntityChangeProperty>,
}

/// Audit detail: one row per changed auditable property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityChangeProperty {
    /// Generated identifier, `None` until persisted
    pub id: Option<i32>,
    /// Owning header, `None` until persisted
    pub entity_change_id: Option<i32>,
    pub property_name: String,
    pub column_name: String,
    /// Formatted value before the change (always `None` for creates)
    pub original_value: Option<String>,
    /// Formatted value after the change (always `None` for deletes)
    pub new_value: Option<String>,
    /// Whether both values were replaced by the hidden placeholder
    pub are_values_hidden: bool,
}

/// Inclusive time window for history lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeWindow {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl TimeWindow {
    pub fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// A window is valid unless both bounds are set and inverted
    pub fn is_valid(&self) -> bool {
        match (self.from, self.to) {
            (Some(from), Some(to)) => from <= to,
            _ => true,
        }
    }
}
