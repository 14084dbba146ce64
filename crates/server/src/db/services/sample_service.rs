use chrono::{DateTime, Utc};
use sqlx::Result;

use crate::db::{models::Sample, DbPool};

/// Hard cap on raw rows returned by a single history read. Downsampling
/// bounds the response payload, this bounds the fetch itself.
const HISTORY_ROW_LIMIT: i64 = 10_000;

const SAMPLE_COLUMNS: &str = "agent_id, timestamp, cpu_percent, memory_used, memory_total, \
     disk_used, disk_total, network_rx, network_tx, load_avg_1, load_avg_5, load_avg_15";

/// Appends one sample. Samples are never updated or deleted by this path.
pub async fn insert_sample(pool: &DbPool, sample: &Sample) -> Result<()> {
    sqlx::query(
        "INSERT INTO samples (agent_id, timestamp, cpu_percent, memory_used, memory_total, \
         disk_used, disk_total, network_rx, network_tx, load_avg_1, load_avg_5, load_avg_15) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    )
    .bind(&sample.agent_id)
    .bind(sample.timestamp)
    .bind(sample.cpu_percent)
    .bind(sample.memory_used)
    .bind(sample.memory_total)
    .bind(sample.disk_used)
    .bind(sample.disk_total)
    .bind(sample.network_rx)
    .bind(sample.network_tx)
    .bind(sample.load_avg_1)
    .bind(sample.load_avg_5)
    .bind(sample.load_avg_15)
    .execute(pool)
    .await?;
    Ok(())
}

/// Returns one agent's samples since `since`, newest first. An unknown
/// agent id yields an empty vector, not an error.
pub async fn get_history_since(
    pool: &DbPool,
    agent_id: &str,
    since: DateTime<Utc>,
) -> Result<Vec<Sample>> {
    sqlx::query_as::<_, Sample>(&format!(
        "SELECT {SAMPLE_COLUMNS} FROM samples \
         WHERE agent_id = ?1 AND timestamp >= ?2 \
         ORDER BY timestamp DESC LIMIT ?3"
    ))
    .bind(agent_id)
    .bind(since)
    .bind(HISTORY_ROW_LIMIT)
    .fetch_all(pool)
    .await
}
