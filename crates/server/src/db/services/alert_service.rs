use chrono::{DateTime, Utc};
use sqlx::Result;

use crate::db::{
    models::{Alert, AlertRule},
    DbPool,
};
use crate::web::models::alert_models::AlertRulePayload;

const RULE_COLUMNS: &str =
    "id, agent_id, metric_type, threshold, operator, duration, enabled, description";

const ALERT_COLUMNS: &str = "id, rule_id, agent_id, timestamp, message, value, resolved";

/// All rules, ordered by id. The engine filters out disabled rules itself.
pub async fn get_rules(pool: &DbPool) -> Result<Vec<AlertRule>> {
    sqlx::query_as::<_, AlertRule>(&format!(
        "SELECT {RULE_COLUMNS} FROM alert_rules ORDER BY id"
    ))
    .fetch_all(pool)
    .await
}

pub async fn create_rule(pool: &DbPool, payload: &AlertRulePayload) -> Result<AlertRule> {
    sqlx::query_as::<_, AlertRule>(&format!(
        "INSERT INTO alert_rules (agent_id, metric_type, threshold, operator, duration, enabled, description) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
         RETURNING {RULE_COLUMNS}"
    ))
    .bind(&payload.agent_id)
    .bind(payload.metric_type)
    .bind(payload.threshold)
    .bind(payload.operator)
    .bind(payload.duration)
    .bind(payload.enabled)
    .bind(&payload.description)
    .fetch_one(pool)
    .await
}

/// Full replace of a rule's fields. Returns `None` when the id is unknown.
pub async fn update_rule(
    pool: &DbPool,
    rule_id: i64,
    payload: &AlertRulePayload,
) -> Result<Option<AlertRule>> {
    sqlx::query_as::<_, AlertRule>(&format!(
        "UPDATE alert_rules SET \
            agent_id = ?1, metric_type = ?2, threshold = ?3, operator = ?4, \
            duration = ?5, enabled = ?6, description = ?7 \
         WHERE id = ?8 \
         RETURNING {RULE_COLUMNS}"
    ))
    .bind(&payload.agent_id)
    .bind(payload.metric_type)
    .bind(payload.threshold)
    .bind(payload.operator)
    .bind(payload.duration)
    .bind(payload.enabled)
    .bind(&payload.description)
    .bind(rule_id)
    .fetch_optional(pool)
    .await
}

/// Deletes a rule, returning the number of rows removed.
pub async fn delete_rule(pool: &DbPool, rule_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM alert_rules WHERE id = ?1")
        .bind(rule_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn insert_alert(
    pool: &DbPool,
    rule_id: i64,
    agent_id: &str,
    timestamp: DateTime<Utc>,
    message: &str,
    value: f64,
) -> Result<Alert> {
    sqlx::query_as::<_, Alert>(&format!(
        "INSERT INTO alerts (rule_id, agent_id, timestamp, message, value, resolved) \
         VALUES (?1, ?2, ?3, ?4, ?5, 0) \
         RETURNING {ALERT_COLUMNS}"
    ))
    .bind(rule_id)
    .bind(agent_id)
    .bind(timestamp)
    .bind(message)
    .bind(value)
    .fetch_one(pool)
    .await
}

/// Most recent alerts, newest first.
pub async fn get_recent_alerts(pool: &DbPool, limit: i64) -> Result<Vec<Alert>> {
    sqlx::query_as::<_, Alert>(&format!(
        "SELECT {ALERT_COLUMNS} FROM alerts ORDER BY timestamp DESC, id DESC LIMIT ?1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await
}
