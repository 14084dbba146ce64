pub mod error;
pub mod models;
pub mod routes;

pub use error::AppError;

use std::sync::Arc;

use axum::{http::Method, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};

use crate::alerting::engine::AlertEngine;
use crate::db::DbPool;
use crate::metrics::query::QueryService;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub query_service: Arc<QueryService>,
    pub alert_engine: Arc<AlertEngine>,
}

async fn health_check_handler() -> &'static str {
    "OK"
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_check_handler))
        .nest("/api/metrics", routes::metrics_routes::metrics_router())
        .nest("/api/agents", routes::agent_routes::agent_router())
        .nest("/api/alert-rules", routes::alert_routes::alert_rule_router())
        .nest("/api/alerts", routes::alert_routes::alert_router())
        .with_state(app_state)
        .layer(cors)
}
