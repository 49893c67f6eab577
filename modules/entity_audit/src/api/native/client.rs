//! Native client implementation - wraps the history service for in-process calls

use crate::contract::{AuditHistoryApi, AuditHistoryError, EntityChange, TimeWindow};
use crate::domain::HistoryService;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Native client that calls the history service directly
///
/// Used by other modules in the same process, without HTTP overhead.
#[derive(Clone)]
pub struct NativeClient {
    service: Arc<HistoryService>,
}

impl NativeClient {
    pub fn new(service: Arc<HistoryService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl AuditHistoryApi for NativeClient {
    async fn changes_for_entity(
        &self,
        entity_name: &str,
        item_id: i64,
        limit: Option<u64>,
    ) -> Result<Vec<EntityChange>, AuditHistoryError> {
        self.service
            .changes_for_entity(entity_name, item_id, limit)
            .await
    }

    async fn changes_for_transaction(
        &self,
        transaction_unique: Uuid,
    ) -> Result<Vec<EntityChange>, AuditHistoryError> {
        self.service.changes_for_transaction(transaction_unique).await
    }

    async fn changes_by_user(
        &self,
        user_id: Uuid,
        window: TimeWindow,
        limit: Option<u64>,
    ) -> Result<Vec<EntityChange>, AuditHistoryError> {
        self.service.changes_by_user(user_id, window, limit).await
    }
}
