use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One resource-usage measurement reported by an agent. Immutable once
/// stored; ordered by `(agent_id, timestamp)`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Sample {
    pub agent_id: String,
    pub timestamp: DateTime<Utc>,
    pub cpu_percent: f64,
    pub memory_used: i64,
    pub memory_total: i64,
    pub disk_used: i64,
    pub disk_total: i64,
    /// Bytes received since the previous report; zero on an agent's first sample.
    pub network_rx: i64,
    pub network_tx: i64,
    pub load_avg_1: f64,
    pub load_avg_5: f64,
    pub load_avg_15: f64,
}

/// A monitored agent. Status is never stored; it is recomputed from recent
/// report history at query time (see `metrics::liveness`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub host: String,
    pub last_seen: DateTime<Utc>,
    pub platform: String,
    pub version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Online,
    Offline,
}

/// An `Agent` together with its live-computed status.
#[derive(Debug, Clone, Serialize)]
pub struct AgentWithStatus {
    #[serde(flatten)]
    pub agent: Agent,
    pub status: AgentStatus,
}

/// The metric a rule observes, with its value derivation per sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MetricType {
    Cpu,
    Memory,
    Disk,
    Load,
}

impl MetricType {
    /// Derives the observed value from a sample. Used/total ratios guard
    /// against a zero total by evaluating to 0 instead of dividing.
    pub fn observed_value(&self, sample: &Sample) -> f64 {
        match self {
            MetricType::Cpu => sample.cpu_percent,
            MetricType::Memory => {
                if sample.memory_total > 0 {
                    sample.memory_used as f64 / sample.memory_total as f64 * 100.0
                } else {
                    0.0
                }
            }
            MetricType::Disk => {
                if sample.disk_total > 0 {
                    sample.disk_used as f64 / sample.disk_total as f64 * 100.0
                } else {
                    0.0
                }
            }
            MetricType::Load => sample.load_avg_1,
        }
    }

    /// Unit suffix used when formatting alert messages.
    pub fn unit(&self) -> &'static str {
        match self {
            MetricType::Cpu | MetricType::Memory | MetricType::Disk => "%",
            MetricType::Load => "",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricType::Cpu => "cpu",
            MetricType::Memory => "memory",
            MetricType::Disk => "disk",
            MetricType::Load => "load",
        };
        f.write_str(name)
    }
}

/// Threshold comparison operator. Exact arithmetic comparison, no epsilon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Operator {
    Gt,
    Lt,
    Gte,
    Lte,
}

impl Operator {
    pub fn compare(&self, value: f64, threshold: f64) -> bool {
        match self {
            Operator::Gt => value > threshold,
            Operator::Lt => value < threshold,
            Operator::Gte => value >= threshold,
            Operator::Lte => value <= threshold,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operator::Gt => "gt",
            Operator::Lt => "lt",
            Operator::Gte => "gte",
            Operator::Lte => "lte",
        };
        f.write_str(name)
    }
}

/// A threshold alert rule. An empty `agent_id` applies the rule to all agents.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AlertRule {
    pub id: i64,
    pub agent_id: String,
    pub metric_type: MetricType,
    pub threshold: f64,
    pub operator: Operator,
    /// Seconds the breach must persist before the rule fires.
    pub duration: i64,
    pub enabled: bool,
    pub description: String,
}

/// A fired alert. `resolved` is always false at creation; no auto-resolution
/// is modeled.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Alert {
    pub id: i64,
    pub rule_id: i64,
    pub agent_id: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub value: f64,
    pub resolved: bool,
}
