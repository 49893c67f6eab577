//! Domain layer - audit pipeline, unit of work and history service

pub mod capabilities;
pub mod capture;
pub mod context;
pub mod error;
pub mod filters;
pub mod format;
pub mod populate;
pub mod repository;
pub mod schema;
pub mod service;
pub mod soft_delete;
pub mod tracker;

#[cfg(test)]
mod fixtures;

pub use capabilities::{AuditEntity, ChangeAudited, TenantScoped, Timestamped, UserAudited};
pub use context::{
    AuditDbContext, AuditDbContextBuilder, AuditDbContextFactory, SaveOptions, SaveStage,
};
pub use error::AuditError;
pub use filters::QueryFilters;
pub use format::HIDDEN_VALUE_PLACEHOLDER;
pub use repository::EntityChangeRepository;
pub use schema::{AuditModel, AuditSchema, EntitySchema, ValueFormat};
pub use service::HistoryService;
pub use soft_delete::SoftDeleteTransition;
pub use tracker::{EntityState, Tracked};
