//! Entity Audit Module
//!
//! Audit trail for SeaORM entities. An [`AuditDbContext`] tracks models as a
//! unit of work; saving it stamps timestamp, user, soft-delete and tenant
//! fields, writes the entities and records property-level
//! [`EntityChange`]s in a second write. [`HistoryService`] and the REST
//! routes expose the recorded trail read-only.

// Public exports
pub mod contract;
pub use contract::{
    AuditContext, AuditContextProvider, AuditHistoryApi, AuditHistoryError, EntityChange,
    EntityChangeOperation, EntityChangeProperty, ScopedAuditContext, TimeWindow,
};

pub mod config;
pub use config::AuditConfig;

pub mod domain;
pub use domain::{
    AuditDbContext, AuditDbContextBuilder, AuditDbContextFactory, AuditEntity, AuditError,
    AuditModel, AuditSchema, ChangeAudited, EntityChangeRepository, EntityState, HistoryService,
    QueryFilters, SaveOptions, SaveStage, TenantScoped, Timestamped, Tracked, UserAudited,
    ValueFormat, HIDDEN_VALUE_PLACEHOLDER,
};

pub mod infra;
pub use infra::storage::{migrate, Migrator, SeaOrmEntityChangeRepository};

// Transport adapters (hidden from public API docs)
#[doc(hidden)]
pub mod api;
pub use api::native::NativeClient;
pub use api::rest::routes::register_routes;
