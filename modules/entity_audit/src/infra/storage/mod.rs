//! Storage layer - audit trail entities, migrations and repository

pub mod entity;
pub mod mapper;
pub mod migrations;
pub mod repositories;

pub use migrations::{migrate, missing_audit_schema, Migrator};
pub use repositories::SeaOrmEntityChangeRepository;
