//! Contract error types for audit history lookups
//!
//! These errors are transport-agnostic and used for inter-module communication.

/// Audit history errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditHistoryError {
    /// Requested history does not exist
    NotFound {
        /// Resource type (transaction, entity)
        resource: String,
        /// Resource identifier
        id: String,
    },
    /// Invalid query parameters
    Validation {
        /// Validation error message
        message: String,
    },
    /// Internal error
    Internal,
}

impl std::fmt::Display for AuditHistoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { resource, id } => {
                write!(f, "{} not found: {}", resource, id)
            }
            Self::Validation { message } => {
                write!(f, "Validation error: {}", message)
            }
            Self::Internal => {
                write!(f, "Internal error")
            }
        }
    }
}

impl std::error::Error for AuditHistoryError {}
