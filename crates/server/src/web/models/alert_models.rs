use serde::Deserialize;

use crate::db::models::{MetricType, Operator};

/// Body for rule create and full-replace update.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertRulePayload {
    /// Empty string applies the rule to all agents.
    #[serde(default)]
    pub agent_id: String,
    pub metric_type: MetricType,
    pub threshold: f64,
    pub operator: Operator,
    /// Seconds the breach must persist before firing.
    pub duration: i64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub description: String,
}

fn default_enabled() -> bool {
    true
}
