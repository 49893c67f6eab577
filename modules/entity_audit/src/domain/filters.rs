//! Global query filters for soft-deleted rows and tenant isolation

use super::capabilities::AuditEntity;
use super::schema::EntitySchema;
use sea_orm::{ColumnTrait, Condition};
use uuid::Uuid;

/// Switchable predicate fragments applied by `AuditDbContext::query`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryFilters {
    /// Hide rows whose soft-delete column is true
    pub soft_delete: bool,
    /// Restrict rows to the context tenant
    pub tenant: bool,
}

impl Default for QueryFilters {
    fn default() -> Self {
        Self {
            soft_delete: true,
            tenant: true,
        }
    }
}

impl QueryFilters {
    pub fn disabled() -> Self {
        Self {
            soft_delete: false,
            tenant: false,
        }
    }

    /// Combined condition for one entity type
    ///
    /// Each fragment only applies when the entity declares the matching
    /// column. The tenant fragment also needs a tenant id in the context.
    pub fn condition<M: AuditEntity>(
        &self,
        schema: &EntitySchema<M>,
        tenant_id: Option<Uuid>,
    ) -> Condition {
        let mut condition = Condition::all();

        if self.soft_delete {
            if let Some(column) = schema.soft_delete_column {
                condition = condition.add(column.eq(false));
            }
        }

        if self.tenant {
            if let (Some(column), Some(tenant_id)) = (schema.tenant_column, tenant_id) {
                condition = condition.add(column.eq(tenant_id));
            }
        }

        condition
    }

    /// True when no fragment would be applied for this entity
    pub fn is_noop<M: AuditEntity>(&self, schema: &EntitySchema<M>, tenant_id: Option<Uuid>) -> bool {
        let soft_delete = self.soft_delete && schema.soft_delete_column.is_some();
        let tenant = self.tenant && schema.tenant_column.is_some() && tenant_id.is_some();
        !(soft_delete || tenant)
    }
}
