//! Database migrations for the entity audit trail

use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, Statement};
use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250301_000001_create_entity_changes::Migration)]
    }
}

/// Apply every pending audit migration
pub async fn migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    Migrator::up(db, None).await
}

/// Tables and columns the pipeline writes to
const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    (
        "entity_changes",
        &[
            "id",
            "transaction_unique",
            "correlation_id",
            "table_name",
            "entity_name",
            "item_id",
            "operation",
            "changed_on",
            "changed_by",
            "description",
            "parent_entity_name",
            "parent_item_id",
        ],
    ),
    (
        "entity_change_properties",
        &[
            "id",
            "entity_change_id",
            "property_name",
            "column_name",
            "original_value",
            "new_value",
            "are_values_hidden",
        ],
    ),
];

/// Indexes the history queries rely on
const REQUIRED_INDEXES: &[(&str, &str)] = &[
    ("entity_changes", "idx_entity_changes_transaction_unique"),
    ("entity_changes", "idx_entity_changes_entity_item"),
    ("entity_changes", "idx_entity_changes_changed_on"),
];

const PROPERTY_CASCADE_FK: &str = "fk_entity_change_properties_entity_change";

/// Names of missing audit tables, columns, indexes and relationships, empty
/// when the schema is complete
pub async fn missing_audit_schema(db: &DatabaseConnection) -> Result<Vec<String>, DbErr> {
    let manager = SchemaManager::new(db);
    let mut missing = Vec::new();
    let mut tables_present = true;

    for (table, columns) in REQUIRED_COLUMNS {
        if !manager.has_table(*table).await? {
            missing.push((*table).to_string());
            tables_present = false;
            continue;
        }
        for column in *columns {
            if !manager.has_column(*table, *column).await? {
                missing.push(format!("{}.{}", table, column));
            }
        }
    }

    if !tables_present {
        return Ok(missing);
    }

    for (table, index) in REQUIRED_INDEXES {
        if !manager.has_index(*table, *index).await? {
            missing.push((*index).to_string());
        }
    }
    if !has_property_cascade(db).await? {
        missing.push(PROPERTY_CASCADE_FK.to_string());
    }

    Ok(missing)
}

/// Whether property rows reference their change header with ON DELETE CASCADE
async fn has_property_cascade(db: &DatabaseConnection) -> Result<bool, DbErr> {
    let backend = db.get_database_backend();
    let sql = match backend {
        DbBackend::Sqlite => {
            r#"SELECT COUNT(*) AS n FROM pragma_foreign_key_list('entity_change_properties')
               WHERE "table" = 'entity_changes' AND "from" = 'entity_change_id'
               AND on_delete = 'CASCADE'"#
        }
        DbBackend::Postgres => {
            r#"SELECT COUNT(*) AS n
               FROM information_schema.referential_constraints rc
               JOIN information_schema.table_constraints tc
                 ON tc.constraint_name = rc.constraint_name
                AND tc.constraint_schema = rc.constraint_schema
               WHERE tc.table_schema = current_schema()
                 AND tc.table_name = 'entity_change_properties'
                 AND tc.constraint_type = 'FOREIGN KEY'
                 AND rc.delete_rule = 'CASCADE'"#
        }
        DbBackend::MySql => {
            r#"SELECT COUNT(*) AS n
               FROM information_schema.referential_constraints
               WHERE constraint_schema = DATABASE()
                 AND table_name = 'entity_change_properties'
                 AND referenced_table_name = 'entity_changes'
                 AND delete_rule = 'CASCADE'"#
        }
    };

    let row = db
        .query_one(Statement::from_string(backend, sql.to_string()))
        .await?;
    let count = match row {
        Some(row) => row.try_get::<i64>("", "n")?,
        None => 0,
    };
    Ok(count > 0)
}

mod m20250301_000001_create_entity_changes {
    use super::*;

    #[derive(DeriveMigrationName)]
    pub struct Migration;

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(EntityChanges::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(EntityChanges::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(EntityChanges::TransactionUnique)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(EntityChanges::CorrelationId).string())
                        .col(ColumnDef::new(EntityChanges::TableName).string().not_null())
                        .col(ColumnDef::new(EntityChanges::EntityName).string().not_null())
                        .col(ColumnDef::new(EntityChanges::ItemId).big_integer())
                        .col(
                            ColumnDef::new(EntityChanges::Operation)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(EntityChanges::ChangedOn)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(EntityChanges::ChangedBy).uuid())
                        .col(ColumnDef::new(EntityChanges::Description).text())
                        .col(ColumnDef::new(EntityChanges::ParentEntityName).string())
                        .col(ColumnDef::new(EntityChanges::ParentItemId).big_integer())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(EntityChangeProperties::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(EntityChangeProperties::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(EntityChangeProperties::EntityChangeId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(EntityChangeProperties::PropertyName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(EntityChangeProperties::ColumnName)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(EntityChangeProperties::OriginalValue).text())
                        .col(ColumnDef::new(EntityChangeProperties::NewValue).text())
                        .col(
                            ColumnDef::new(EntityChangeProperties::AreValuesHidden)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_entity_change_properties_entity_change")
                                .from(
                                    EntityChangeProperties::Table,
                                    EntityChangeProperties::EntityChangeId,
                                )
                                .to(EntityChanges::Table, EntityChanges::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            // Lookups by save, by entity instance, by time and by user
            manager
                .create_index(
                    Index::create()
                        .name("idx_entity_changes_transaction_unique")
                        .table(EntityChanges::Table)
                        .col(EntityChanges::TransactionUnique)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_entity_changes_entity_item")
                        .table(EntityChanges::Table)
                        .col(EntityChanges::EntityName)
                        .col(EntityChanges::ItemId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_entity_changes_changed_on")
                        .table(EntityChanges::Table)
                        .col(EntityChanges::ChangedOn)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_entity_changes_changed_by")
                        .table(EntityChanges::Table)
                        .col(EntityChanges::ChangedBy)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_entity_change_properties_entity_change_id")
                        .table(EntityChangeProperties::Table)
                        .col(EntityChangeProperties::EntityChangeId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(
                    Table::drop()
                        .table(EntityChangeProperties::Table)
                        .to_owned(),
                )
                .await?;
            manager
                .drop_table(Table::drop().table(EntityChanges::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum EntityChanges {
        Table,
        Id,
        TransactionUnique,
        CorrelationId,
        TableName,
        EntityName,
        ItemId,
        Operation,
        ChangedOn,
        ChangedBy,
        Description,
        ParentEntityName,
        ParentItemId,
    }

    #[derive(DeriveIden)]
    enum EntityChangeProperties {
        Table,
        Id,
        EntityChangeId,
        PropertyName,
        ColumnName,
        OriginalValue,
        NewValue,
        AreValuesHidden,
    }
}
