use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::db::models::{Agent, Sample};
use crate::db::services::{agent_service, sample_service};
use crate::web::{AppError, AppState};

/// Ingest body: one sample plus optional agent self-description.
#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    #[serde(flatten)]
    pub sample: Sample,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub since: Option<DateTime<Utc>>,
}

async fn report_handler(
    State(app_state): State<Arc<AppState>>,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<ReportRequest>,
) -> Result<StatusCode, AppError> {
    let sample = payload.sample;

    // A store failure rejects the call before any other state changes; the
    // agent retries the same sample on its next tick.
    sample_service::insert_sample(&app_state.pool, &sample).await?;

    let agent = Agent {
        id: sample.agent_id.clone(),
        name: sample.agent_id.clone(),
        host: remote_addr.to_string(),
        last_seen: Utc::now(),
        platform: payload.platform,
        version: payload.version,
    };
    if let Err(e) = agent_service::upsert_agent(&app_state.pool, &agent).await {
        warn!(agent_id = %agent.id, error = %e, "Failed to upsert agent record.");
    }

    app_state.alert_engine.evaluate(&sample).await;

    Ok(StatusCode::OK)
}

async fn history_handler(
    State(app_state): State<Arc<AppState>>,
    Path(agent_id): Path<String>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<Sample>>, AppError> {
    let samples = app_state
        .query_service
        .history(&agent_id, params.since, Utc::now())
        .await?;
    Ok(Json(samples))
}

pub fn metrics_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/report", post(report_handler))
        .route("/{agent_id}", get(history_handler))
}
