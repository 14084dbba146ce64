//! Read-side orchestration: bounded history for dashboards and the agent
//! list with live-computed status.

use chrono::{DateTime, Duration, Utc};

use crate::db::{
    models::{AgentWithStatus, Sample},
    services::{agent_service, sample_service},
    DbPool,
};
use crate::metrics::{downsample, liveness};

/// Window applied when a history request omits `since`.
const DEFAULT_WINDOW_SECONDS: i64 = 300;

/// Maps the requested window to a bucket target. Short windows keep more
/// relative detail; anything beyond a day is capped outright.
fn bucket_target(window: Duration) -> usize {
    if window <= Duration::minutes(5) {
        60
    } else if window <= Duration::hours(1) {
        120
    } else if window <= Duration::hours(6) {
        240
    } else if window <= Duration::hours(24) {
        480
    } else {
        500
    }
}

pub struct QueryService {
    pool: DbPool,
}

impl QueryService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// One agent's samples over `[since, now]`, ascending, downsampled to
    /// the window's bucket target when the raw count exceeds it. Never
    /// upsamples; an unknown agent yields an empty vector.
    pub async fn history(
        &self,
        agent_id: &str,
        since: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Sample>, sqlx::Error> {
        let since = since.unwrap_or(now - Duration::seconds(DEFAULT_WINDOW_SECONDS));

        let mut samples = sample_service::get_history_since(&self.pool, agent_id, since).await?;
        // Store order is newest first; responses are ascending.
        samples.reverse();

        let target = bucket_target(now - since);
        if samples.len() <= target {
            return Ok(samples);
        }
        Ok(downsample::lttb(
            &samples,
            target,
            |s| s.timestamp.timestamp_micros() as f64,
            |s| s.cpu_percent,
        ))
    }

    /// All agents with status recomputed from each agent's own recent
    /// history. Status is a best-effort live projection, never persisted.
    pub async fn list_agents(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<AgentWithStatus>, sqlx::Error> {
        let agents = agent_service::get_agents(&self.pool).await?;
        let since = now - Duration::seconds(liveness::LOOKBACK_SECONDS);

        let mut result = Vec::with_capacity(agents.len());
        for agent in agents {
            let history = sample_service::get_history_since(&self.pool, &agent.id, since).await?;
            let status = liveness::estimate(&history, agent.last_seen, now);
            result.push(AgentWithStatus { agent, status });
        }
        Ok(result)
    }
}
