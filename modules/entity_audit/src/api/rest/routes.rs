//! Route registration for the audit history API

use super::{dto::*, handlers};
use crate::domain::HistoryService;
use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query,
    },
    routing::get,
    Extension, Json, Router,
};
use std::sync::Arc;
use utoipa::OpenApi;
use uuid::Uuid;

/// OpenAPI components of the audit history API
#[derive(OpenApi)]
#[openapi(components(schemas(
    EntityChangeDto,
    EntityChangePropertyDto,
    EntityChangeListResponse,
    HistoryQuery,
    UserHistoryQuery
)))]
pub struct AuditApiDoc;

/// Register all REST routes
pub fn register_routes(router: Router, service: Arc<HistoryService>) -> anyhow::Result<Router> {
    let router = router
        .route(
            "/audit/entities/{entity_name}/{item_id}/changes",
            get(entity_changes_handler),
        )
        .route(
            "/audit/transactions/{transaction_unique}/changes",
            get(transaction_changes_handler),
        )
        .route("/audit/users/{user_id}/changes", get(user_changes_handler))
        .layer(Extension(service));

    tracing::debug!("Registered audit history routes");
    Ok(router)
}

// ===== Handler wrappers that extract the service from Extension =====

async fn entity_changes_handler(
    Extension(service): Extension<Arc<HistoryService>>,
    path: Result<Path<(String, i64)>, PathRejection>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<EntityChangeListResponse>, super::error::Problem> {
    handlers::entity_changes(service, path, query).await
}

async fn transaction_changes_handler(
    Extension(service): Extension<Arc<HistoryService>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<EntityChangeListResponse>, super::error::Problem> {
    handlers::transaction_changes(service, path).await
}

async fn user_changes_handler(
    Extension(service): Extension<Arc<HistoryService>>,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<UserHistoryQuery>, QueryRejection>,
) -> Result<Json<EntityChangeListResponse>, super::error::Problem> {
    handlers::user_changes(service, path, query).await
}
