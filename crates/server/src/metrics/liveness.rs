//! Adaptive agent liveness inference.
//!
//! Rather than a single global timeout, each agent's status is inferred from
//! its own reporting cadence: an agent configured to report every minute is
//! not flagged offline as aggressively as one reporting every two seconds.

use chrono::{DateTime, Duration, Utc};

use crate::db::models::{AgentStatus, Sample};

/// How far back callers should fetch history before estimating.
pub const LOOKBACK_SECONDS: i64 = 3600;

/// Static timeout applied when there is not enough history to estimate a
/// cadence.
const FALLBACK_INTERVAL_SECONDS: i64 = 120;

/// Classifies an agent as online or offline.
///
/// `history` must be ordered newest first. With fewer than two samples the
/// static fallback rule applies. Otherwise the average interval over the
/// positive consecutive gaps predicts the third expected report time; an
/// agent that has missed three consecutive reports is considered offline,
/// which tolerates one or two reports lost to jitter.
pub fn estimate(history: &[Sample], last_seen: DateTime<Utc>, now: DateTime<Utc>) -> AgentStatus {
    let fallback = Duration::seconds(FALLBACK_INTERVAL_SECONDS);

    if history.len() < 2 {
        return if now - last_seen > fallback {
            AgentStatus::Offline
        } else {
            AgentStatus::Online
        };
    }

    // Non-positive gaps (duplicates, out-of-order rows) are skipped so they
    // cannot corrupt the average.
    let mut total = Duration::zero();
    let mut count: i32 = 0;
    for pair in history.windows(2) {
        let delta = pair[0].timestamp - pair[1].timestamp;
        if delta > Duration::zero() {
            total += delta;
            count += 1;
        }
    }

    let avg_interval = if count > 0 {
        let avg = total / count;
        if avg <= Duration::zero() {
            fallback
        } else {
            avg
        }
    } else {
        fallback
    };

    let third_expected = history[0].timestamp + avg_interval * 3;
    if now > third_expected {
        AgentStatus::Offline
    } else {
        AgentStatus::Online
    }
}
