//! Change capture - builds the audit trail from pending entries before they are written
//!
//! Capture only reads the pending snapshot. It must run before the audit
//! fields are populated so the original/current values are still the ones
//! the caller produced.

use super::capabilities::AuditEntity;
use super::format::{format_value, HIDDEN_VALUE_PLACEHOLDER};
use super::schema::EntitySchema;
use super::soft_delete::{transition, SoftDeleteTransition};
use super::tracker::EntityState;
use crate::contract::{AuditContext, EntityChange, EntityChangeOperation, EntityChangeProperty};
use chrono::{DateTime, Utc};
use sea_orm::IdenStatic;
use uuid::Uuid;

/// Per-save values shared by every captured change
pub struct CaptureScope<'a> {
    pub transaction_unique: Uuid,
    pub now: DateTime<Utc>,
    pub audit: &'a AuditContext,
}

/// A change header awaiting persistence
#[derive(Debug, Clone)]
pub struct CapturedChange {
    pub change: EntityChange,
    /// Position of the originating entry in the unit of work
    pub entry: usize,
    /// `item_id` must be read from the generated key after the primary write
    pub key_pending: bool,
}

/// Operation recorded for an entry, `None` when nothing is pending
pub fn operation_for<M: AuditEntity>(
    state: EntityState,
    original: Option<&M>,
    current: &M,
) -> Option<EntityChangeOperation> {
    match state {
        EntityState::Added => Some(EntityChangeOperation::Create),
        EntityState::Deleted => Some(EntityChangeOperation::Delete),
        EntityState::Modified => match transition(original, current) {
            SoftDeleteTransition::Deleted => Some(EntityChangeOperation::Delete),
            _ => Some(EntityChangeOperation::Update),
        },
        EntityState::Unchanged => None,
    }
}

/// Capture the change header and property detail for one entry
///
/// Returns `None` for entities that are not change-audited or not pending.
pub fn capture_entry<M: AuditEntity>(
    state: EntityState,
    original: Option<&M>,
    current: &M,
    schema: &EntitySchema<M>,
    scope: &CaptureScope<'_>,
) -> Option<(EntityChange, bool)> {
    let audited = current.change_audited()?;
    let operation = operation_for(state, original, current)?;

    let key_pending = operation == EntityChangeOperation::Create;
    let item_id = if key_pending { None } else { audited.item_id() };

    let properties = capture_properties(operation, original, current, schema);

    let change = EntityChange {
        id: None,
        transaction_unique: scope.transaction_unique,
        correlation_id: scope.audit.correlation_id.clone(),
        table_name: schema.table_name.clone(),
        entity_name: schema.entity_name.clone(),
        item_id,
        operation,
        changed_on: scope.now,
        changed_by: scope.audit.user_id,
        description: audited.entity_change_description(),
        parent_entity_name: audited.parent_entity_name(),
        parent_item_id: audited.parent_item_id(),
        properties,
    };

    Some((change, key_pending))
}

fn capture_properties<M: AuditEntity>(
    operation: EntityChangeOperation,
    original: Option<&M>,
    current: &M,
    schema: &EntitySchema<M>,
) -> Vec<EntityChangeProperty> {
    let mut properties = Vec::with_capacity(schema.audited.len());

    for property in &schema.audited {
        let column = property.column;
        let after = current.get(column);
        let before = original.map(|m| m.get(column));

        // Which sides of the change exist for this operation
        let (before, after) = match operation {
            EntityChangeOperation::Create => (None, Some(after)),
            EntityChangeOperation::Update => {
                let Some(before) = before else {
                    continue;
                };
                if before == after {
                    continue;
                }
                (Some(before), Some(after))
            }
            EntityChangeOperation::Delete => (Some(before.unwrap_or(after)), None),
        };

        let (original_value, new_value) = if property.hide_value_changes {
            (
                before.map(|_| HIDDEN_VALUE_PLACEHOLDER.to_string()),
                after.map(|_| HIDDEN_VALUE_PLACEHOLDER.to_string()),
            )
        } else {
            (
                before.and_then(|v| format_value(&v, property.format)),
                after.and_then(|v| format_value(&v, property.format)),
            )
        };

        properties.push(EntityChangeProperty {
            id: None,
            entity_change_id: None,
            property_name: EntitySchema::<M>::property_name(&column),
            column_name: column.as_str().to_string(),
            original_value,
            new_value,
            are_values_hidden: property.hide_value_changes,
        });
    }

    properties
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::{gadget, widget};

    fn scope(audit: &AuditContext) -> CaptureScope<'_> {
        CaptureScope {
            transaction_unique: Uuid::new_v4(),
            now: Utc::now(),
            audit,
        }
    }

    fn property<'a>(change: &'a EntityChange, name: &str) -> Option<&'a EntityChangeProperty> {
        change.properties.iter().find(|p| p.property_name == name)
    }

    #[test]
    fn create_records_new_values_only() {
        let audit = AuditContext::authenticated(Uuid::new_v4()).with_correlation_id("corr-1");
        let schema = EntitySchema::<widget::Model>::resolve();
        let model = widget::sample("A");

        let (change, key_pending) =
            capture_entry(EntityState::Added, None, &model, &schema, &scope(&audit)).unwrap();

        assert!(key_pending);
        assert_eq!(change.operation, EntityChangeOperation::Create);
        assert_eq!(change.item_id, None);
        assert_eq!(change.entity_name, "Widget");
        assert_eq!(change.table_name, "widgets");
        assert_eq!(change.changed_by, audit.user_id);
        assert_eq!(change.correlation_id.as_deref(), Some("corr-1"));
        assert_eq!(change.description.as_deref(), Some("Widget A"));
        assert!(change.properties.iter().all(|p| p.original_value.is_none()));

        let name = property(&change, "Name").unwrap();
        assert_eq!(name.new_value.as_deref(), Some("A"));
        assert_eq!(name.column_name, "name");

        let price = property(&change, "Price").unwrap();
        assert_eq!(price.new_value.as_deref(), Some("9.50"));

        // Primary key and non-audited columns never appear
        assert!(property(&change, "Id").is_none());
        assert!(property(&change, "Notes").is_none());
    }

    #[test]
    fn update_records_only_changed_properties() {
        let audit = AuditContext::anonymous();
        let schema = EntitySchema::<widget::Model>::resolve();
        let mut original = widget::sample("A");
        original.id = 7;
        let mut current = original.clone();
        current.name = "B".to_string();
        current.notes = Some("not audited".to_string());

        let (change, key_pending) = capture_entry(
            EntityState::Modified,
            Some(&original),
            &current,
            &schema,
            &scope(&audit),
        )
        .unwrap();

        assert!(!key_pending);
        assert_eq!(change.operation, EntityChangeOperation::Update);
        assert_eq!(change.item_id, Some(7));
        assert_eq!(change.changed_by, None);
        assert_eq!(change.properties.len(), 1);
        assert_eq!(change.properties[0].original_value.as_deref(), Some("A"));
        assert_eq!(change.properties[0].new_value.as_deref(), Some("B"));
    }

    #[test]
    fn hidden_values_use_placeholder() {
        let audit = AuditContext::anonymous();
        let schema = EntitySchema::<widget::Model>::resolve();
        let mut original = widget::sample("A");
        original.id = 3;
        let mut current = original.clone();
        current.secret = Some("correct horse".to_string());

        let (change, _) = capture_entry(
            EntityState::Modified,
            Some(&original),
            &current,
            &schema,
            &scope(&audit),
        )
        .unwrap();

        let secret = property(&change, "Secret").unwrap();
        assert!(secret.are_values_hidden);
        assert_eq!(secret.original_value.as_deref(), Some(HIDDEN_VALUE_PLACEHOLDER));
        assert_eq!(secret.new_value.as_deref(), Some(HIDDEN_VALUE_PLACEHOLDER));
    }

    #[test]
    fn soft_delete_is_recorded_as_delete() {
        let audit = AuditContext::anonymous();
        let schema = EntitySchema::<widget::Model>::resolve();
        let mut original = widget::sample("A");
        original.id = 11;
        let mut current = original.clone();
        current.is_deleted = true;

        let (change, _) = capture_entry(
            EntityState::Modified,
            Some(&original),
            &current,
            &schema,
            &scope(&audit),
        )
        .unwrap();

        assert_eq!(change.operation, EntityChangeOperation::Delete);
        assert_eq!(change.item_id, Some(11));
        assert!(!change.properties.is_empty());
        assert!(change.properties.iter().all(|p| p.new_value.is_none()));
        assert_eq!(
            property(&change, "Name").unwrap().original_value.as_deref(),
            Some("A")
        );
        let secret = property(&change, "Secret").unwrap();
        assert_eq!(secret.original_value.as_deref(), Some(HIDDEN_VALUE_PLACEHOLDER));
    }

    #[test]
    fn entities_without_change_audit_are_not_captured() {
        let audit = AuditContext::anonymous();
        let schema = EntitySchema::<gadget::Model>::resolve();
        let model = gadget::sample("g");

        assert!(capture_entry(EntityState::Added, None, &model, &schema, &scope(&audit)).is_none());
    }

    #[test]
    fn unchanged_entries_have_no_operation() {
        let model = widget::sample("A");
        assert_eq!(operation_for(EntityState::Unchanged, Some(&model), &model), None);
    }
}
