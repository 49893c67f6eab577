//! SeaORM repository implementation for the audit trail

use crate::contract::{EntityChange, EntityChangeProperty, TimeWindow};
use crate::domain::repository::EntityChangeRepository;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, TransactionTrait,
};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::entity;
use super::mapper::property_active_model;

pub struct SeaOrmEntityChangeRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmEntityChangeRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Run a header query and attach the property rows of every result
    async fn load(&self, query: Select<entity::Entity>) -> Result<Vec<EntityChange>> {
        let headers = query.all(&*self.db).await?;
        if headers.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = headers.iter().map(|h| h.id).collect();
        let rows = entity::property::Entity::find()
            .filter(entity::property::Column::EntityChangeId.is_in(ids))
            .order_by_asc(entity::property::Column::Id)
            .all(&*self.db)
            .await?;

        let mut by_change: HashMap<i32, Vec<EntityChangeProperty>> = HashMap::new();
        for row in rows {
            by_change
                .entry(row.entity_change_id)
                .or_default()
                .push(row.into());
        }

        headers
            .into_iter()
            .map(|header| {
                let id = header.id;
                let mut change = EntityChange::try_from(header)?;
                change.properties = by_change.remove(&id).unwrap_or_default();
                Ok(change)
            })
            .collect()
    }
}

#[async_trait]
impl EntityChangeRepository for SeaOrmEntityChangeRepository {
    async fn insert_batch(&self, changes: &[EntityChange]) -> Result<Vec<EntityChange>> {
        let txn = self.db.begin().await?;
        let mut stored = Vec::with_capacity(changes.len());

        for change in changes {
            let header: entity::ActiveModel = change.into();
            let header = header.insert(&txn).await?;

            let properties: Vec<entity::property::ActiveModel> = change
                .properties
                .iter()
                .map(|p| property_active_model(header.id, p))
                .collect();
            if !properties.is_empty() {
                entity::property::Entity::insert_many(properties)
                    .exec(&txn)
                    .await?;
            }

            let mut saved = change.clone();
            saved.id = Some(header.id);
            for property in &mut saved.properties {
                property.entity_change_id = Some(header.id);
            }
            stored.push(saved);
        }

        txn.commit().await?;
        tracing::debug!(changes = stored.len(), "Stored entity changes");
        Ok(stored)
    }

    async fn find_by_entity(
        &self,
        entity_name: &str,
        item_id: i64,
        limit: u64,
    ) -> Result<Vec<EntityChange>> {
        let query = entity::Entity::find()
            .filter(entity::Column::EntityName.eq(entity_name))
            .filter(entity::Column::ItemId.eq(item_id))
            .order_by_desc(entity::Column::ChangedOn)
            .order_by_desc(entity::Column::Id)
            .limit(limit);

        self.load(query).await
    }

    async fn find_by_transaction(&self, transaction_unique: Uuid) -> Result<Vec<EntityChange>> {
        // One save shares a single timestamp; keep write order
        let query = entity::Entity::find()
            .filter(entity::Column::TransactionUnique.eq(transaction_unique))
            .order_by_asc(entity::Column::Id);

        self.load(query).await
    }

    async fn find_by_user(
        &self,
        user_id: Uuid,
        window: &TimeWindow,
        limit: u64,
    ) -> Result<Vec<EntityChange>> {
        let mut query = entity::Entity::find().filter(entity::Column::ChangedBy.eq(user_id));

        if let Some(from) = window.from {
            query = query.filter(entity::Column::ChangedOn.gte(from));
        }
        if let Some(to) = window.to {
            query = query.filter(entity::Column::ChangedOn.lte(to));
        }

        let query = query
            .order_by_desc(entity::Column::ChangedOn)
            .order_by_desc(entity::Column::Id)
            .limit(limit);

        self.load(query).await
    }

    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = entity::Entity::delete_many()
            .filter(entity::Column::ChangedOn.lt(cutoff))
            .exec(&*self.db)
            .await?;

        Ok(result.rows_affected)
    }
}
