//! Common test utilities: audited entities, tenants and an in-memory database
#![allow(dead_code)]

use entity_audit::{
    migrate, AuditContextProvider, AuditDbContext, AuditModel, SeaOrmEntityChangeRepository,
};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::sync::Arc;
use uuid::Uuid;

/// Implements the timestamp and user capabilities over the standard audit columns
macro_rules! impl_user_audited {
    ($model:ty) => {
        impl entity_audit::Timestamped for $model {
            fn created_on(&self) -> chrono::DateTime<chrono::Utc> {
                self.created_on
            }
            fn set_created_on(&mut self, at: chrono::DateTime<chrono::Utc>) {
                self.created_on = at;
            }
            fn modified_on(&self) -> chrono::DateTime<chrono::Utc> {
                self.modified_on
            }
            fn set_modified_on(&mut self, at: chrono::DateTime<chrono::Utc>) {
                self.modified_on = at;
            }
        }

        impl entity_audit::UserAudited for $model {
            fn created_by(&self) -> Option<uuid::Uuid> {
                self.created_by
            }
            fn set_created_by(&mut self, user: Option<uuid::Uuid>) {
                self.created_by = user;
            }
            fn modified_by(&self) -> Option<uuid::Uuid> {
                self.modified_by
            }
            fn set_modified_by(&mut self, user: Option<uuid::Uuid>) {
                self.modified_by = user;
            }
            fn is_deleted(&self) -> bool {
                self.is_deleted
            }
            fn set_is_deleted(&mut self, deleted: bool) {
                self.is_deleted = deleted;
            }
            fn deleted_on(&self) -> Option<chrono::DateTime<chrono::Utc>> {
                self.deleted_on
            }
            fn set_deleted_on(&mut self, at: Option<chrono::DateTime<chrono::Utc>>) {
                self.deleted_on = at;
            }
            fn deleted_by(&self) -> Option<uuid::Uuid> {
                self.deleted_by
            }
            fn set_deleted_by(&mut self, user: Option<uuid::Uuid>) {
                self.deleted_by = user;
            }
        }
    };
}

/// Tenant-scoped, fully audited customer
pub mod customer {
    use entity_audit::{
        AuditEntity, AuditSchema, ChangeAudited, TenantScoped, Timestamped, UserAudited,
        ValueFormat,
    };
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "customers")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub tenant_id: Uuid,
        pub name: String,
        pub email: Option<String>,
        pub password_hash: Option<String>,
        pub credit_limit: f64,
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

    impl_user_audited!(Model);

    impl ChangeAudited for Model {
        fn item_id(&self) -> Option<i64> {
            (self.id != 0).then_some(i64::from(self.id))
        }

        fn entity_change_description(&self) -> Option<String> {
            Some(format!("Customer {}", self.name))
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
            AuditSchema::new("Customer")
                .audited(Column::Name)
                .audited(Column::Email)
                .audited_hidden(Column::PasswordHash)
                .audited_with_format(Column::CreditLimit, ValueFormat::Decimals(2))
                .ignored(Column::Notes, Some("free-form remarks"))
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

    /// Unsaved customer with placeholder audit fields
    pub fn new(name: &str) -> Model {
        Model {
            id: 0,
            tenant_id: Uuid::nil(),
            name: name.to_string(),
            email: Some(format!("{}@example.com", name.to_lowercase())),
            password_hash: Some("$argon2id$v=19$secret".to_string()),
            credit_limit: 1500.0,
            notes: None,
            created_on: super::epoch(),
            modified_on: super::epoch(),
            created_by: None,
            modified_by: None,
            is_deleted: false,
            deleted_on: None,
            deleted_by: None,
        }
    }
}

/// Order belonging to a customer; recorded with its parent
pub mod order {
    use entity_audit::{AuditEntity, AuditSchema, ChangeAudited, Timestamped, UserAudited};
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "orders")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub customer_id: i32,
        pub status: String,
        pub total: f64,
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

    impl_user_audited!(Model);

    impl ChangeAudited for Model {
        fn item_id(&self) -> Option<i64> {
            (self.id != 0).then_some(i64::from(self.id))
        }

        fn parent_entity_name(&self) -> Option<String> {
            Some("Customer".to_string())
        }

        fn parent_item_id(&self) -> Option<i64> {
            Some(i64::from(self.customer_id))
        }
    }

    impl AuditEntity for Model {
        type ActiveModel = ActiveModel;

        fn audit_schema() -> AuditSchema<Self> {
            AuditSchema::new("Order")
                .audited(Column::Status)
                .audited(Column::Total)
                .soft_delete_column(Column::IsDeleted)
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
    }

    pub fn new(customer_id: i32, total: f64) -> Model {
        Model {
            id: 0,
            customer_id,
            status: "open".to_string(),
            total,
            created_on: super::epoch(),
            modified_on: super::epoch(),
            created_by: None,
            modified_by: None,
            is_deleted: false,
            deleted_on: None,
            deleted_by: None,
        }
    }
}

/// Timestamps only; never change-captured
pub mod tag {
    use entity_audit::{AuditEntity, AuditSchema, Timestamped};
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "tags")]
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

    impl Timestamped for Model {
        fn created_on(&self) -> DateTimeUtc {
            self.created_on
        }
        fn set_created_on(&mut self, at: DateTimeUtc) {
            self.created_on = at;
        }
        fn modified_on(&self) -> DateTimeUtc {
            self.modified_on
        }
        fn set_modified_on(&mut self, at: DateTimeUtc) {
            self.modified_on = at;
        }
    }

    impl AuditEntity for Model {
        type ActiveModel = ActiveModel;

        fn audit_schema() -> AuditSchema<Self> {
            AuditSchema::new("Tag").audited(Column::Label)
        }

        fn timestamped(&self) -> Option<&dyn Timestamped> {
            Some(self)
        }
        fn timestamped_mut(&mut self) -> Option<&mut dyn Timestamped> {
            Some(self)
        }
    }

    pub fn new(label: &str) -> Model {
        Model {
            id: 0,
            label: label.to_string(),
            created_on: super::epoch(),
            modified_on: super::epoch(),
        }
    }
}

pub fn epoch() -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::<chrono::Utc>::UNIX_EPOCH
}

/// Two sibling tenants and the users acting in them
#[derive(Debug, Clone)]
pub struct TestTenants {
    pub acme: Uuid,
    pub globex: Uuid,
    pub alice: Uuid,
    pub bob: Uuid,
}

impl TestTenants {
    pub fn new() -> Self {
        Self {
            acme: Uuid::new_v4(),
            globex: Uuid::new_v4(),
            alice: Uuid::new_v4(),
            bob: Uuid::new_v4(),
        }
    }
}

impl Default for TestTenants {
    fn default() -> Self {
        Self::new()
    }
}

pub fn print_test_header(test_name: &str, purpose: &[&str]) {
    println!("\n🧪 TEST: {}", test_name);
    if let Some(first) = purpose.first() {
        println!("📋 PURPOSE: {}", first);
    }
    for line in purpose.iter().skip(1) {
        println!("   {}", line);
    }
}

/// Single-connection in-memory SQLite without any tables
pub async fn empty_db() -> Arc<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    Arc::new(Database::connect(options).await.unwrap())
}

/// In-memory database with the audit tables and the test entity tables
pub async fn setup_db() -> Arc<DatabaseConnection> {
    let db = empty_db().await;
    migrate(&db).await.unwrap();
    create_table(&db, customer::Entity).await;
    create_table(&db, order::Entity).await;
    create_table(&db, tag::Entity).await;
    db
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) {
    let backend = db.get_database_backend();
    let stmt = Schema::new(backend).create_table_from_entity(entity);
    db.execute(backend.build(&stmt)).await.unwrap();
}

pub fn context(
    db: &Arc<DatabaseConnection>,
    provider: Arc<dyn AuditContextProvider>,
) -> AuditDbContext {
    AuditDbContext::builder(db.clone())
        .model(Arc::new(AuditModel::new()))
        .provider(provider)
        .build()
        .unwrap()
}

pub fn audit_repository(db: &Arc<DatabaseConnection>) -> Arc<SeaOrmEntityChangeRepository> {
    Arc::new(SeaOrmEntityChangeRepository::new(db.clone()))
}
