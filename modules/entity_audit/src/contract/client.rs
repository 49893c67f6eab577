//! Native client trait for inter-module communication
//!
//! Read-only projections over the audit trail. NO HTTP - direct function calls.

use super::{
    error::AuditHistoryError,
    model::{EntityChange, TimeWindow},
};
use async_trait::async_trait;
use uuid::Uuid;

/// Audit history API, most recent change first
#[async_trait]
pub trait AuditHistoryApi: Send + Sync {
    /// Changes recorded for one entity row
    async fn changes_for_entity(
        &self,
        entity_name: &str,
        item_id: i64,
        limit: Option<u64>,
    ) -> Result<Vec<EntityChange>, AuditHistoryError>;

    /// Changes recorded by one save call
    async fn changes_for_transaction(
        &self,
        transaction_unique: Uuid,
    ) -> Result<Vec<EntityChange>, AuditHistoryError>;

    /// Changes made by a user inside a time window
    async fn changes_by_user(
        &self,
        user_id: Uuid,
        window: TimeWindow,
        limit: Option<u64>,
    ) -> Result<Vec<EntityChange>, AuditHistoryError>;
}
