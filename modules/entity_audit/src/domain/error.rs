//! Errors raised by the audit pipeline and the unit of work

use super::context::SaveStage;
use sea_orm::DbErr;

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// Setup problem detected before any save was attempted
    #[error("Audit configuration error: {0}")]
    Configuration(String),

    /// Misuse of the unit of work (restore of a live entity, untracked handle, ...)
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Writing the primary entities failed; no audit rows were written
    #[error("Save failed at stage {stage}: {source}")]
    PrimarySave {
        stage: SaveStage,
        #[source]
        source: DbErr,
    },

    /// Primary entities are committed but the audit trail could not be written
    #[error("Primary data committed but audit trail persist failed: {0:#}")]
    AuditPersist(anyhow::Error),

    /// Loading or querying entities failed
    #[error("Query failed: {0}")]
    Query(#[from] DbErr),

    /// The save was cancelled before the primary commit completed
    #[error("Save cancelled at stage {0}")]
    Cancelled(SaveStage),
}

impl AuditError {
    /// True when the primary write is durable despite the error
    pub fn is_primary_committed(&self) -> bool {
        matches!(self, Self::AuditPersist(_))
    }
}
