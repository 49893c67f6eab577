//! Entity to model mappers
//!
//! Conversions between SeaORM entities and contract models

use super::entity;
use crate::contract::{EntityChange, EntityChangeOperation, EntityChangeProperty};

// ===== Header Conversions =====

impl TryFrom<entity::Model> for EntityChange {
    type Error = anyhow::Error;

    fn try_from(entity: entity::Model) -> Result<Self, Self::Error> {
        let operation: EntityChangeOperation = entity
            .operation
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;

        Ok(Self {
            id: Some(entity.id),
            transaction_unique: entity.transaction_unique,
            correlation_id: entity.correlation_id,
            table_name: entity.table_name,
            entity_name: entity.entity_name,
            item_id: entity.item_id,
            operation,
            changed_on: entity.changed_on,
            changed_by: entity.changed_by,
            description: entity.description,
            parent_entity_name: entity.parent_entity_name,
            parent_item_id: entity.parent_item_id,
            properties: Vec::new(),
        })
    }
}

impl From<&EntityChange> for entity::ActiveModel {
    fn from(model: &EntityChange) -> Self {
        use sea_orm::ActiveValue::*;

        Self {
            id: model.id.map_or(NotSet, Set),
            transaction_unique: Set(model.transaction_unique),
            correlation_id: Set(model.correlation_id.clone()),
            table_name: Set(model.table_name.clone()),
            entity_name: Set(model.entity_name.clone()),
            item_id: Set(model.item_id),
            operation: Set(model.operation.as_str().to_string()),
            changed_on: Set(model.changed_on),
            changed_by: Set(model.changed_by),
            description: Set(model.description.clone()),
            parent_entity_name: Set(model.parent_entity_name.clone()),
            parent_item_id: Set(model.parent_item_id),
        }
    }
}

// ===== Property Conversions =====

impl From<entity::property::Model> for EntityChangeProperty {
    fn from(entity: entity::property::Model) -> Self {
        Self {
            id: Some(entity.id),
            entity_change_id: Some(entity.entity_change_id),
            property_name: entity.property_name,
            column_name: entity.column_name,
            original_value: entity.original_value,
            new_value: entity.new_value,
            are_values_hidden: entity.are_values_hidden,
        }
    }
}

/// Property row bound to its stored header
pub fn property_active_model(
    entity_change_id: i32,
    model: &EntityChangeProperty,
) -> entity::property::ActiveModel {
    use sea_orm::ActiveValue::*;

    entity::property::ActiveModel {
        id: NotSet,
        entity_change_id: Set(entity_change_id),
        property_name: Set(model.property_name.clone()),
        column_name: Set(model.column_name.clone()),
        original_value: Set(model.original_value.clone()),
        new_value: Set(model.new_value.clone()),
        are_values_hidden: Set(model.are_values_hidden),
    }
}
