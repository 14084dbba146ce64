pub mod agent_routes;
pub mod alert_routes;
pub mod metrics_routes;
