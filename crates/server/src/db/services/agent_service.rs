use sqlx::Result;

use crate::db::{models::Agent, DbPool};

/// Inserts or refreshes an agent record. Called on every accepted sample,
/// so agents are created lazily on their first report.
pub async fn upsert_agent(pool: &DbPool, agent: &Agent) -> Result<()> {
    sqlx::query(
        "INSERT INTO agents (id, name, host, last_seen, platform, version) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
         ON CONFLICT(id) DO UPDATE SET \
            name = excluded.name, \
            host = excluded.host, \
            last_seen = excluded.last_seen, \
            platform = excluded.platform, \
            version = excluded.version",
    )
    .bind(&agent.id)
    .bind(&agent.name)
    .bind(&agent.host)
    .bind(agent.last_seen)
    .bind(&agent.platform)
    .bind(&agent.version)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_agents(pool: &DbPool) -> Result<Vec<Agent>> {
    sqlx::query_as::<_, Agent>(
        "SELECT id, name, host, last_seen, platform, version FROM agents ORDER BY id",
    )
    .fetch_all(pool)
    .await
}
