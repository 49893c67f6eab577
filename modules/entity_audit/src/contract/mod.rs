//! Contract layer - public API for inter-module communication
//!
//! This layer contains transport-agnostic models, the audit context and the
//! native client trait.

pub mod client;
pub mod context;
pub mod error;
pub mod model;

pub use client::AuditHistoryApi;
pub use context::{AuditContext, AuditContextProvider, ScopedAuditContext};
pub use error::AuditHistoryError;
pub use model::{EntityChange, EntityChangeOperation, EntityChangeProperty, TimeWindow};
