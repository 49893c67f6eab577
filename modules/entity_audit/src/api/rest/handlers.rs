//! HTTP request handlers - thin layer that delegates to the history service

use super::{
    dto::*,
    error::{map_history_error, Problem},
};
use crate::contract::TimeWindow;
use crate::domain::HistoryService;
use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query,
    },
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

/// Changes recorded for one entity row
pub async fn entity_changes(
    service: Arc<HistoryService>,
    path: Result<Path<(String, i64)>, PathRejection>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<EntityChangeListResponse>, Problem> {
    let Path((entity_name, item_id)) = path.map_err(|e| Problem::bad_request(e.body_text()))?;
    let Query(query) = query.map_err(|e| Problem::bad_request(e.body_text()))?;
    let changes = service
        .changes_for_entity(&entity_name, item_id, query.limit)
        .await
        .map_err(|e| {
            map_history_error(e)
                .with_instance(format!("/audit/entities/{}/{}/changes", entity_name, item_id))
        })?;

    Ok(Json(changes.into()))
}

/// Changes written by one save
pub async fn transaction_changes(
    service: Arc<HistoryService>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<EntityChangeListResponse>, Problem> {
    let Path(transaction_unique) = path.map_err(|e| Problem::bad_request(e.body_text()))?;
    let changes = service
        .changes_for_transaction(transaction_unique)
        .await
        .map_err(|e| {
            map_history_error(e)
                .with_instance(format!("/audit/transactions/{}/changes", transaction_unique))
        })?;

    Ok(Json(changes.into()))
}

/// Changes made by one user inside an optional time window
pub async fn user_changes(
    service: Arc<HistoryService>,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<UserHistoryQuery>, QueryRejection>,
) -> Result<Json<EntityChangeListResponse>, Problem> {
    let Path(user_id) = path.map_err(|e| Problem::bad_request(e.body_text()))?;
    let Query(query) = query.map_err(|e| Problem::bad_request(e.body_text()))?;
    let window = TimeWindow::from(&query);
    let changes = service
        .changes_by_user(user_id, window, query.limit)
        .await
        .map_err(|e| {
            map_history_error(e).with_instance(format!("/audit/users/{}/changes", user_id))
        })?;

    Ok(Json(changes.into()))
}
