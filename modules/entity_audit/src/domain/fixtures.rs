//! In-crate entities for unit tests

pub mod widget {
    use crate::domain::capabilities::{
        AuditEntity, ChangeAudited, TenantScoped, Timestamped, UserAudited,
    };
    use crate::domain::schema::{AuditSchema, ValueFormat};
    use chrono::{DateTime, TimeZone, Utc};
    use sea_orm::entity::prelude::*;

    /// Fully audited, tenant-scoped entity
    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "widgets")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub tenant_id: Uuid,
        pub name: String,
        pub secret: Option<String>,
        pub price: f64,
        pub notes: Option<String>,
        pub created_on: DateTimeUtc,
        pub modified_on: DateTimeUtc,
        pub created_by: Option<Uuid>,
        pub modified_by: Option<Uuid>,
        pub is_deleted: bool,
        pub deleted_on: Option<DateTimeUtc>,
        pub deleted_by: Option<Uuid>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    pub fn epoch() -> DateTime<Utc> {
        Utc.timestamp_opt(0, 0).single().unwrap_or_default()
    }

    pub fn sample(name: &str) -> Model {
        Model {
            id: 0,
            tenant_id: Uuid::nil(),
            name: name.to_string(),
            secret: Some("hunter2".to_string()),
            price: 9.5,
            notes: None,
            created_on: epoch(),
            modified_on: epoch(),
            created_by: None,
            modified_by: None,
            is_deleted: false,
            deleted_on: None,
            deleted_by: None,
        }
    }

    impl Timestamped for Model {
        fn created_on(&self) -> DateTime<Utc> {
            self.created_on
        }
        fn set_created_on(&mut self, at: DateTime<Utc>) {
            self.created_on = at;
        }
        fn modified_on(&self) -> DateTime<Utc> {
            self.modified_on
        }
        fn set_modified_on(&mut self, at: DateTime<Utc>) {
            self.modified_on = at;
        }
    }

    impl UserAudited for Model {
        fn created_by(&self) -> Option<Uuid> {
            self.created_by
        }
        fn set_created_by(&mut self, user: Option<Uuid>) {
            self.created_by = user;
        }
        fn modified_by(&self) -> Option<Uuid> {
            self.modified_by
        }
        fn set_modified_by(&mut self, user: Option<Uuid>) {
            self.modified_by = user;
        }
        fn is_deleted(&self) -> bool {
            self.is_deleted
        }
        fn set_is_deleted(&mut self, deleted: bool) {
            self.is_deleted = deleted;
        }
        fn deleted_on(&self) -> Option<DateTime<Utc>> {
            self.deleted_on
        }
        fn set_deleted_on(&mut self, at: Option<DateTime<Utc>>) {
            self.deleted_on = at;
        }
        fn deleted_by(&self) -> Option<Uuid> {
            self.deleted_by
        }
        fn set_deleted_by(&mut self, user: Option<Uuid>) {
            self.deleted_by = user;
        }
    }

    impl ChangeAudited for Model {
        fn item_id(&self) -> Option<i64> {
            (self.id != 0).then_some(i64::from(self.id))
        }

        fn entity_change_description(&self) -> Option<String> {
            Some(format!("Widget {}", self.name))
        }
    }

    impl TenantScoped for Model {
        fn tenant_id(&self) -> Uuid {
            self.tenant_id
        }
        fn set_tenant_id(&mut self, tenant_id: Uuid) {
            self.tenant_id = tenant_id;
        }
    }

    impl AuditEntity for Model {
        type ActiveModel = ActiveModel;

        fn audit_schema() -> AuditSchema<Self> {
            AuditSchema::new("Widget")
                .audited(Column::Id)
                .audited(Column::Name)
                .audited_hidden(Column::Secret)
                .audited_with_format(Column::Price, ValueFormat::Decimals(2))
                .ignored(Column::Notes, Some("free text"))
                .soft_delete_column(Column::IsDeleted)
                .tenant_column(Column::TenantId)
        }

        fn timestamped(&self) -> Option<&dyn Timestamped> {
            Some(self)
        }
        fn timestamped_mut(&mut self) -> Option<&mut dyn Timestamped> {
            Some(self)
        }
        fn user_audited(&self) -> Option<&dyn UserAudited> {
            Some(self)
        }
        fn user_audited_mut(&mut self) -> Option<&mut dyn UserAudited> {
            Some(self)
        }
        fn change_audited(&self) -> Option<&dyn ChangeAudited> {
            Some(self)
        }
        fn tenant_scoped(&self) -> Option<&dyn TenantScoped> {
            Some(self)
        }
        fn tenant_scoped_mut(&mut self) -> Option<&mut dyn TenantScoped> {
            Some(self)
        }
    }
}

pub mod gadget {
    use crate::domain::capabilities::{AuditEntity, Timestamped};
    use crate::domain::schema::AuditSchema;
    use chrono::{DateTime, Utc};
    use sea_orm::entity::prelude::*;

    /// Timestamps only, no change capture
    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "gadgets")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub label: String,
        pub created_on: DateTimeUtc,
        pub modified_on: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    pub fn sample(label: &str) -> Model {
        Model {
            id: 0,
            label: label.to_string(),
            created_on: super::widget::epoch(),
            modified_on: super::widget::epoch(),
        }
    }

    impl Timestamped for Model {
        fn created_on(&self) -> DateTime<Utc> {
            self.created_on
        }
        fn set_created_on(&mut self, at: DateTime<Utc>) {
            self.created_on = at;
        }
        fn modified_on(&self) -> DateTime<Utc> {
            self.modified_on
        }
        fn set_modified_on(&mut self, at: DateTime<Utc>) {
            self.modified_on = at;
        }
    }

    impl AuditEntity for Model {
        type ActiveModel = ActiveModel;

        fn audit_schema() -> AuditSchema<Self> {
            AuditSchema::new("Gadget").audited(Column::Label)
        }

        fn timestamped(&self) -> Option<&dyn Timestamped> {
            Some(self)
        }
        fn timestamped_mut(&mut self) -> Option<&mut dyn Timestamped> {
            Some(self)
        }
    }
}
