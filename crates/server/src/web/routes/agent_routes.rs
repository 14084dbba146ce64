use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;

use crate::db::models::AgentWithStatus;
use crate::web::{AppError, AppState};

async fn list_agents_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<AgentWithStatus>>, AppError> {
    let agents = app_state.query_service.list_agents(Utc::now()).await?;
    Ok(Json(agents))
}

pub fn agent_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_agents_handler))
}
