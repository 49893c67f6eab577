//! Repository trait for the audit trail tables
//!
//! The SeaORM implementation lives in infra/storage/repositories.rs

use crate::contract::{EntityChange, TimeWindow};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Storage for change headers and their property details
#[async_trait]
pub trait EntityChangeRepository: Send + Sync {
    /// Persist headers with their properties as one write, returning the stored records
    async fn insert_batch(&self, changes: &[EntityChange]) -> Result<Vec<EntityChange>>;

    /// Changes of one entity instance, most recent first
    async fn find_by_entity(
        &self,
        entity_name: &str,
        item_id: i64,
        limit: u64,
    ) -> Result<Vec<EntityChange>>;

    /// Every change written by one save
    async fn find_by_transaction(&self, transaction_unique: Uuid) -> Result<Vec<EntityChange>>;

    /// Changes made by a user inside a time window, most recent first
    async fn find_by_user(
        &self,
        user_id: Uuid,
        window: &TimeWindow,
        limit: u64,
    ) -> Result<Vec<EntityChange>>;

    /// Delete headers (and, by cascade, properties) older than `cutoff`
    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}
