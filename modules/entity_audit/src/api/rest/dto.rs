//! REST DTOs with serde derives for HTTP API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// ===== Change DTOs =====

/// Change header response DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EntityChangeDto {
    pub id: i32,

    /// Shared by every change written in one save
    pub transaction_unique: Uuid,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,

    #[schema(example = "customers")]
    pub table_name: String,

    #[schema(example = "Customer")]
    pub entity_name: String,

    pub item_id: Option<i64>,

    /// Create, Update or Delete
    #[schema(example = "Update")]
    pub operation: String,

    pub changed_on: DateTime<Utc>,

    pub changed_by: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_entity_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_item_id: Option<i64>,

    pub properties: Vec<EntityChangePropertyDto>,
}

/// Property detail DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EntityChangePropertyDto {
    #[schema(example = "Name")]
    pub property_name: String,

    #[schema(example = "name")]
    pub column_name: String,

    pub original_value: Option<String>,

    pub new_value: Option<String>,

    /// Values were replaced by a placeholder
    pub are_values_hidden: bool,
}

/// List of changes, most recent first
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EntityChangeListResponse {
    pub items: Vec<EntityChangeDto>,
    pub total: usize,
}

// ===== Query parameters =====

/// Paging for entity history
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct HistoryQuery {
    /// Maximum number of changes; server default when omitted
    pub limit: Option<u64>,
}

/// Time window and paging for user history
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UserHistoryQuery {
    /// Inclusive lower bound (RFC 3339)
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound (RFC 3339)
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<u64>,
}
