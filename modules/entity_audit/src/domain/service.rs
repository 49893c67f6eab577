//! Domain service - read-only history lookups and retention over the audit trail

use super::repository::EntityChangeRepository;
use crate::config::AuditConfig;
use crate::contract::{AuditHistoryError, EntityChange, TimeWindow};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// History queries over `EntityChange` / `EntityChangeProperty`
pub struct HistoryService {
    repo: Arc<dyn EntityChangeRepository>,
    config: AuditConfig,
}

impl HistoryService {
    pub fn new(repo: Arc<dyn EntityChangeRepository>, config: AuditConfig) -> Self {
        Self { repo, config }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    // ===== History =====

    /// Changes of one entity instance, most recent first
    pub async fn changes_for_entity(
        &self,
        entity_name: &str,
        item_id: i64,
        limit: Option<u64>,
    ) -> Result<Vec<EntityChange>, AuditHistoryError> {
        if entity_name.trim().is_empty() {
            return Err(AuditHistoryError::Validation {
                message: "entity name must not be empty".to_string(),
            });
        }
        let limit = self.resolve_limit(limit)?;

        self.repo
            .find_by_entity(entity_name, item_id, limit)
            .await
            .map_err(|e| internal("find_by_entity", e))
    }

    /// Every change written by one save
    pub async fn changes_for_transaction(
        &self,
        transaction_unique: Uuid,
    ) -> Result<Vec<EntityChange>, AuditHistoryError> {
        let changes = self
            .repo
            .find_by_transaction(transaction_unique)
            .await
            .map_err(|e| internal("find_by_transaction", e))?;

        if changes.is_empty() {
            return Err(AuditHistoryError::NotFound {
                resource: "transaction".to_string(),
                id: transaction_unique.to_string(),
            });
        }
        Ok(changes)
    }

    /// Changes made by one user inside a time window, most recent first
    pub async fn changes_by_user(
        &self,
        user_id: Uuid,
        window: TimeWindow,
        limit: Option<u64>,
    ) -> Result<Vec<EntityChange>, AuditHistoryError> {
        if !window.is_valid() {
            return Err(AuditHistoryError::Validation {
                message: "time window start must not be after its end".to_string(),
            });
        }
        let limit = self.resolve_limit(limit)?;

        self.repo
            .find_by_user(user_id, &window, limit)
            .await
            .map_err(|e| internal("find_by_user", e))
    }

    // ===== Retention =====

    /// Remove every change recorded before `cutoff`
    pub async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, AuditHistoryError> {
        let removed = self
            .repo
            .purge_older_than(cutoff)
            .await
            .map_err(|e| internal("purge_older_than", e))?;

        tracing::info!(%cutoff, removed, "Purged audit trail");
        Ok(removed)
    }

    /// Apply the configured retention period; a no-op when none is configured
    pub async fn enforce_retention(&self) -> Result<u64, AuditHistoryError> {
        let Some(days) = self.config.retention_days else {
            tracing::debug!("No audit retention configured");
            return Ok(0);
        };
        let cutoff = Utc::now() - Duration::days(i64::from(days));
        self.purge_older_than(cutoff).await
    }

    // ===== Helper Methods =====

    fn resolve_limit(&self, requested: Option<u64>) -> Result<u64, AuditHistoryError> {
        match requested {
            None => Ok(self.config.default_history_limit.min(self.config.max_history_limit)),
            Some(0) => Err(AuditHistoryError::Validation {
                message: "limit must be greater than zero".to_string(),
            }),
            Some(limit) => Ok(limit.min(self.config.max_history_limit)),
        }
    }
}

fn internal(operation: &str, error: anyhow::Error) -> AuditHistoryError {
    tracing::error!(operation, error = %format!("{error:#}"), "Audit history query failed");
    AuditHistoryError::Internal
}
