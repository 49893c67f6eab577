//! Audit field population - stamps timestamps, users, soft-delete and tenant fields
//!
//! Runs after capture and before the primary write. Only mutates the
//! in-memory models; the upcoming write picks the values up.

use super::capabilities::AuditEntity;
use super::soft_delete::{transition, SoftDeleteTransition};
use super::tracker::EntityState;
use crate::contract::AuditContext;
use chrono::{DateTime, Utc};

/// Populate the audit fields of one pending entry
pub fn populate_entry<M: AuditEntity>(
    state: EntityState,
    original: Option<&M>,
    current: &mut M,
    now: DateTime<Utc>,
    audit: &AuditContext,
) {
    match state {
        EntityState::Added => populate_added(current, now, audit),
        EntityState::Modified => populate_modified(original, current, now, audit),
        EntityState::Deleted | EntityState::Unchanged => {}
    }
}

fn populate_added<M: AuditEntity>(current: &mut M, now: DateTime<Utc>, audit: &AuditContext) {
    if let Some(timestamped) = current.timestamped_mut() {
        timestamped.set_created_on(now);
        timestamped.set_modified_on(now);
    }

    let acting_user = audit.acting_user();
    if let Some(audited) = current.user_audited_mut() {
        if let Some(user) = acting_user {
            audited.set_created_by(Some(user));
            audited.set_modified_by(Some(user));
        }

        // Deletion fields are set exactly when the row is inserted as deleted
        if audited.is_deleted() {
            audited.set_deleted_on(Some(now));
            audited.set_deleted_by(acting_user);
        } else {
            audited.set_deleted_on(None);
            audited.set_deleted_by(None);
        }
    }

    if let Some(tenant_id) = audit.tenant_id {
        if let Some(scoped) = current.tenant_scoped_mut() {
            scoped.set_tenant_id(tenant_id);
        }
    }
}

fn populate_modified<M: AuditEntity>(
    original: Option<&M>,
    current: &mut M,
    now: DateTime<Utc>,
    audit: &AuditContext,
) {
    if let Some(timestamped) = current.timestamped_mut() {
        timestamped.set_modified_on(now);
    }

    let soft_delete = transition(original, current);
    let acting_user = audit.acting_user();

    let Some(audited) = current.user_audited_mut() else {
        return;
    };

    if let Some(user) = acting_user {
        audited.set_modified_by(Some(user));
    }

    match soft_delete {
        SoftDeleteTransition::Deleted => {
            audited.set_deleted_on(Some(now));
            if let Some(user) = acting_user {
                audited.set_deleted_by(Some(user));
            }
        }
        SoftDeleteTransition::Restored => {
            audited.set_deleted_on(None);
            audited.set_deleted_by(None);
        }
        SoftDeleteTransition::Unchanged => {}
    }
}
