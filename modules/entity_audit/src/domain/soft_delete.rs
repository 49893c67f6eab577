//! Soft-delete transitions and the guarded delete / restore operations

use super::capabilities::AuditEntity;
use super::error::AuditError;

/// Change of `is_deleted` between the loaded and the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftDeleteTransition {
    Unchanged,
    /// false -> true
    Deleted,
    /// true -> false
    Restored,
}

/// Compare `is_deleted` on the original snapshot and the current model
pub fn transition<M: AuditEntity>(original: Option<&M>, current: &M) -> SoftDeleteTransition {
    let before = original.and_then(|m| m.user_audited()).map(|m| m.is_deleted());
    let after = current.user_audited().map(|m| m.is_deleted());

    match (before, after) {
        (Some(false), Some(true)) => SoftDeleteTransition::Deleted,
        (Some(true), Some(false)) => SoftDeleteTransition::Restored,
        _ => SoftDeleteTransition::Unchanged,
    }
}

/// Flag a live entity as deleted
pub fn mark_deleted<M: AuditEntity>(model: &mut M, entity_name: &str) -> Result<(), AuditError> {
    let audited = model.user_audited_mut().ok_or_else(|| {
        AuditError::InvalidOperation(format!("{} does not support soft delete", entity_name))
    })?;
    if audited.is_deleted() {
        return Err(AuditError::InvalidOperation(format!(
            "{} is already deleted",
            entity_name
        )));
    }
    audited.set_is_deleted(true);
    Ok(())
}

/// Clear the deleted flag of a soft-deleted entity
pub fn mark_restored<M: AuditEntity>(model: &mut M, entity_name: &str) -> Result<(), AuditError> {
    let audited = model.user_audited_mut().ok_or_else(|| {
        AuditError::InvalidOperation(format!("{} does not support soft delete", entity_name))
    })?;
    if !audited.is_deleted() {
        return Err(AuditError::InvalidOperation(format!(
            "{} is not deleted and cannot be restored",
            entity_name
        )));
    }
    audited.set_is_deleted(false);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::{gadget, widget};

    #[test]
    fn detects_both_directions() {
        let live = widget::sample("a");
        let mut deleted = live.clone();
        deleted.is_deleted = true;

        assert_eq!(transition(Some(&live), &deleted), SoftDeleteTransition::Deleted);
        assert_eq!(transition(Some(&deleted), &live), SoftDeleteTransition::Restored);
        assert_eq!(transition(Some(&live), &live), SoftDeleteTransition::Unchanged);
        assert_eq!(transition(None, &deleted), SoftDeleteTransition::Unchanged);
    }

    #[test]
    fn delete_and_restore_reject_misuse() {
        let mut model = widget::sample("a");

        assert!(mark_restored(&mut model, "Widget").is_err());
        mark_deleted(&mut model, "Widget").unwrap();
        assert!(model.is_deleted);

        let err = mark_deleted(&mut model, "Widget").unwrap_err();
        assert!(matches!(err, AuditError::InvalidOperation(_)));

        mark_restored(&mut model, "Widget").unwrap();
        assert!(!model.is_deleted);
    }

    #[test]
    fn entities_without_soft_delete_are_rejected() {
        let mut model = gadget::sample("g");
        assert!(matches!(
            mark_deleted(&mut model, "Gadget"),
            Err(AuditError::InvalidOperation(_))
        ));
    }
}
