//! Mapper implementations for converting contract models into REST DTOs

use super::dto::*;
use crate::contract;

// ===== Change conversions =====

impl From<contract::EntityChange> for EntityChangeDto {
    fn from(change: contract::EntityChange) -> Self {
        Self {
            id: change.id.unwrap_or_default(),
            transaction_unique: change.transaction_unique,
            correlation_id: change.correlation_id,
            table_name: change.table_name,
            entity_name: change.entity_name,
            item_id: change.item_id,
            operation: change.operation.to_string(),
            changed_on: change.changed_on,
            changed_by: change.changed_by,
            description: change.description,
            parent_entity_name: change.parent_entity_name,
            parent_item_id: change.parent_item_id,
            properties: change.properties.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<contract::EntityChangeProperty> for EntityChangePropertyDto {
    fn from(property: contract::EntityChangeProperty) -> Self {
        Self {
            property_name: property.property_name,
            column_name: property.column_name,
            original_value: property.original_value,
            new_value: property.new_value,
            are_values_hidden: property.are_values_hidden,
        }
    }
}

impl From<Vec<contract::EntityChange>> for EntityChangeListResponse {
    fn from(changes: Vec<contract::EntityChange>) -> Self {
        let items: Vec<EntityChangeDto> = changes.into_iter().map(Into::into).collect();
        let total = items.len();
        Self { items, total }
    }
}

// ===== Query conversions =====

impl From<&UserHistoryQuery> for contract::TimeWindow {
    fn from(query: &UserHistoryQuery) -> Self {
        Self {
            from: query.from,
            to: query.to,
        }
    }
}
