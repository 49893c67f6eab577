//! SeaORM entities for the audit trail tables

use sea_orm::entity::prelude::*;

/// Change header table entity
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "entity_changes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Shared by every change written in one save
    pub transaction_unique: Uuid,

    pub correlation_id: Option<String>,

    pub table_name: String,

    pub entity_name: String,

    /// Primary key of the changed row
    pub item_id: Option<i64>,

    /// Create / Update / Delete
    pub operation: String,

    pub changed_on: DateTimeUtc,

    pub changed_by: Option<Uuid>,

    pub description: Option<String>,

    pub parent_entity_name: Option<String>,

    pub parent_item_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Property detail rows, removed with their header
    #[sea_orm(has_many = "property::Entity")]
    Properties,
}

impl Related<property::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Properties.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Property detail module
pub mod property {
    use sea_orm::entity::prelude::*;

    /// Property detail table entity
    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "entity_change_properties")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,

        pub entity_change_id: i32,

        pub property_name: String,

        pub column_name: String,

        /// Formatted value before the change, or the hidden placeholder
        pub original_value: Option<String>,

        /// Formatted value after the change, or the hidden placeholder
        pub new_value: Option<String>,

        pub are_values_hidden: bool,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::Entity",
            from = "Column::EntityChangeId",
            to = "super::Column::Id",
            on_delete = "Cascade"
        )]
        EntityChange,
    }

    impl Related<super::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::EntityChange.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}
