//! Audit capability contracts implemented by application entities
//!
//! An entity opts into each behaviour by implementing the matching trait and
//! returning itself from the corresponding accessor on [`AuditEntity`]. The
//! accessors are resolved statically per type, so the pipeline never inspects
//! types at runtime.

use super::schema::AuditSchema;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelBehavior, ActiveModelTrait, ModelTrait};
use uuid::Uuid;

/// Automatic creation / modification timestamps
pub trait Timestamped {
    fn created_on(&self) -> DateTime<Utc>;
    fn set_created_on(&mut self, at: DateTime<Utc>);
    fn modified_on(&self) -> DateTime<Utc>;
    fn set_modified_on(&mut self, at: DateTime<Utc>);
}

/// User tracking and the soft-delete triad
pub trait UserAudited: Timestamped {
    fn created_by(&self) -> Option<Uuid>;
    fn set_created_by(&mut self, user: Option<Uuid>);
    fn modified_by(&self) -> Option<Uuid>;
    fn set_modified_by(&mut self, user: Option<Uuid>);

    fn is_deleted(&self) -> bool;
    fn set_is_deleted(&mut self, deleted: bool);
    fn deleted_on(&self) -> Option<DateTime<Utc>>;
    fn set_deleted_on(&mut self, at: Option<DateTime<Utc>>);
    fn deleted_by(&self) -> Option<Uuid>;
    fn set_deleted_by(&mut self, user: Option<Uuid>);
}

/// Eligibility for property-level change capture
pub trait ChangeAudited: UserAudited {
    /// The entity's own primary key, `None` until assigned
    fn item_id(&self) -> Option<i64>;

    fn parent_entity_name(&self) -> Option<String> {
        None
    }

    fn parent_item_id(&self) -> Option<i64> {
        None
    }

    /// Free-text label copied to the change header
    fn entity_change_description(&self) -> Option<String> {
        None
    }
}

/// Tenant ownership, stamped once on insert
pub trait TenantScoped {
    fn tenant_id(&self) -> Uuid;
    fn set_tenant_id(&mut self, tenant_id: Uuid);
}

/// A SeaORM model managed by the audit pipeline
///
/// Implementors usually satisfy `Self::Entity: EntityTrait<Model = Self>` and
/// `Self: IntoActiveModel<Self::ActiveModel>`, which is what
/// `DeriveEntityModel` generates; the context APIs require both.
pub trait AuditEntity: ModelTrait + Clone + Send + Sync + 'static {
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity>
        + ActiveModelBehavior
        + Send
        + Sync
        + 'static;

    /// Declared audited and ignored properties
    fn audit_schema() -> AuditSchema<Self>
    where
        Self: Sized;

    fn timestamped(&self) -> Option<&dyn Timestamped> {
        None
    }

    fn timestamped_mut(&mut self) -> Option<&mut dyn Timestamped> {
        None
    }

    fn user_audited(&self) -> Option<&dyn UserAudited> {
        None
    }

    fn user_audited_mut(&mut self) -> Option<&mut dyn UserAudited> {
        None
    }

    fn change_audited(&self) -> Option<&dyn ChangeAudited> {
        None
    }

    fn tenant_scoped(&self) -> Option<&dyn TenantScoped> {
        None
    }

    fn tenant_scoped_mut(&mut self) -> Option<&mut dyn TenantScoped> {
        None
    }
}
