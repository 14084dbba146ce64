use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;

use crate::db::models::{Alert, AlertRule};
use crate::db::services::alert_service;
use crate::web::models::alert_models::AlertRulePayload;
use crate::web::{AppError, AppState};

const DEFAULT_ALERTS_LIMIT: i64 = 100;

async fn list_rules_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<AlertRule>>, AppError> {
    let rules = alert_service::get_rules(&app_state.pool).await?;
    Ok(Json(rules))
}

async fn create_rule_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<AlertRulePayload>,
) -> Result<Json<AlertRule>, AppError> {
    let rule = alert_service::create_rule(&app_state.pool, &payload).await?;
    Ok(Json(rule))
}

async fn update_rule_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<AlertRulePayload>,
) -> Result<Json<AlertRule>, AppError> {
    let rule = alert_service::update_rule(&app_state.pool, id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Alert rule {id} not found")))?;
    Ok(Json(rule))
}

async fn delete_rule_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<(), AppError> {
    let deleted = alert_service::delete_rule(&app_state.pool, id).await?;
    if deleted == 0 {
        return Err(AppError::NotFound(format!("Alert rule {id} not found")));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct AlertsQuery {
    pub limit: Option<i64>,
}

async fn list_alerts_handler(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<AlertsQuery>,
) -> Result<Json<Vec<Alert>>, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_ALERTS_LIMIT).max(1);
    let alerts = alert_service::get_recent_alerts(&app_state.pool, limit).await?;
    Ok(Json(alerts))
}

pub fn alert_rule_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_rules_handler).post(create_rule_handler))
        .route("/{id}", put(update_rule_handler).delete(delete_rule_handler))
}

pub fn alert_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_alerts_handler))
}
