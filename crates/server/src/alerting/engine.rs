//! Stateful alert evaluation.
//!
//! Each `(rule, agent)` pair is an independent two-state machine: clear (no
//! map entry) or pending since some first-breach time (entry present). A
//! rule fires only after its breach has been observed continuously for the
//! rule's duration, then resets, so a persisting breach must accumulate a
//! fresh window before firing again.
//!
//! The pending map is process-local and rebuilt empty on restart; a restart
//! during an ongoing breach resets its debounce clock.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::{error, info, warn};

use crate::db::{
    models::{AlertRule, Sample},
    services::alert_service,
    DbPool,
};
use crate::notifications::AlertNotifier;

pub struct AlertEngine {
    pool: DbPool,
    notifier: Arc<dyn AlertNotifier>,
    /// First-breach time per (rule_id, agent_id); present only while a
    /// breach is pending. Sharded locking keeps unrelated pairs from
    /// contending during concurrent ingestion.
    pending: DashMap<(i64, String), DateTime<Utc>>,
}

impl AlertEngine {
    pub fn new(pool: DbPool, notifier: Arc<dyn AlertNotifier>) -> Self {
        Self {
            pool,
            notifier,
            pending: DashMap::new(),
        }
    }

    /// Evaluates one incoming sample against all applicable rules. The
    /// sample's own timestamp drives the debounce clock. Failures never
    /// propagate to the ingest path: a rule fetch error skips evaluation
    /// entirely (a missed alert beats blocked ingestion).
    pub async fn evaluate(&self, sample: &Sample) {
        let rules = match alert_service::get_rules(&self.pool).await {
            Ok(rules) => rules,
            Err(e) => {
                warn!(error = %e, "Failed to fetch alert rules. Skipping evaluation for this sample.");
                return;
            }
        };

        for rule in rules {
            if !rule.enabled {
                continue;
            }
            if !rule.agent_id.is_empty() && rule.agent_id != sample.agent_id {
                continue;
            }

            let value = rule.metric_type.observed_value(sample);
            if rule.operator.compare(value, rule.threshold) {
                self.handle_breach(&rule, sample, value).await;
            } else {
                // An interrupted breach never fires; the debounce clock
                // restarts on the next breach.
                self.pending.remove(&(rule.id, sample.agent_id.clone()));
            }
        }
    }

    async fn handle_breach(&self, rule: &AlertRule, sample: &Sample, value: f64) {
        let key = (rule.id, sample.agent_id.clone());
        let now = sample.timestamp;

        let since = self.pending.get(&key).map(|entry| *entry.value());
        let since = match since {
            Some(since) => since,
            None => {
                self.pending.insert(key, now);
                return;
            }
        };

        if now - since < Duration::seconds(rule.duration) {
            return;
        }

        let unit = rule.metric_type.unit();
        let message = format!(
            "{}: {:.2}{} {} {:.2}{}",
            rule.metric_type, value, unit, rule.operator, rule.threshold, unit
        );

        match alert_service::insert_alert(&self.pool, rule.id, &sample.agent_id, now, &message, value)
            .await
        {
            Ok(alert) => {
                info!(rule_id = rule.id, agent_id = %sample.agent_id, message = %message, "Alert fired.");
                // Delivery failure is logged and swallowed; the persisted
                // alert is never rolled back.
                if let Err(e) = self.notifier.notify(&alert, rule).await {
                    warn!(rule_id = rule.id, error = %e, "Alert persisted but notification failed.");
                }
            }
            Err(e) => {
                error!(rule_id = rule.id, agent_id = %sample.agent_id, error = %e, "Failed to persist alert.");
            }
        }

        self.pending.remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{MetricType, Operator};
    use crate::notifications::NotificationError;
    use crate::web::models::alert_models::AlertRulePayload;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::Mutex;

    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
        fail: bool,
    }

    impl RecordingNotifier {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                messages: Mutex::new(Vec::new()),
                fail,
            })
        }

        fn count(&self) -> usize {
            self.messages.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl AlertNotifier for RecordingNotifier {
        async fn notify(
            &self,
            alert: &crate::db::models::Alert,
            _rule: &AlertRule,
        ) -> Result<(), NotificationError> {
            self.messages.lock().unwrap().push(alert.message.clone());
            if self.fail {
                return Err(NotificationError::SenderError(
                    crate::notifications::senders::SenderError::InvalidConfiguration(
                        "stub failure".to_string(),
                    ),
                ));
            }
            Ok(())
        }
    }

    async fn test_pool() -> DbPool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::init_schema(&pool).await.unwrap();
        pool
    }

    async fn seed_rule(pool: &DbPool, payload: AlertRulePayload) -> AlertRule {
        alert_service::create_rule(pool, &payload).await.unwrap()
    }

    fn cpu_rule_payload(threshold: f64, duration: i64) -> AlertRulePayload {
        AlertRulePayload {
            agent_id: String::new(),
            metric_type: MetricType::Cpu,
            threshold,
            operator: Operator::Gt,
            duration,
            enabled: true,
            description: "high cpu".to_string(),
        }
    }

    fn sample_at(agent_id: &str, base: DateTime<Utc>, offset_secs: i64, cpu: f64) -> Sample {
        Sample {
            agent_id: agent_id.to_string(),
            timestamp: base + Duration::seconds(offset_secs),
            cpu_percent: cpu,
            memory_used: 0,
            memory_total: 0,
            disk_used: 0,
            disk_total: 0,
            network_rx: 0,
            network_tx: 0,
            load_avg_1: 0.0,
            load_avg_5: 0.0,
            load_avg_15: 0.0,
        }
    }

    async fn alert_count(pool: &DbPool) -> usize {
        alert_service::get_recent_alerts(pool, 100).await.unwrap().len()
    }

    #[tokio::test]
    async fn fires_only_after_the_full_duration() {
        let pool = test_pool().await;
        seed_rule(&pool, cpu_rule_payload(90.0, 30)).await;
        let notifier = RecordingNotifier::new(false);
        let engine = AlertEngine::new(pool.clone(), notifier.clone());
        let base = Utc::now();

        for offset in [0, 10, 20] {
            engine.evaluate(&sample_at("a1", base, offset, 95.0)).await;
        }
        assert_eq!(alert_count(&pool).await, 0);

        engine.evaluate(&sample_at("a1", base, 31, 95.0)).await;
        assert_eq!(alert_count(&pool).await, 1);
        assert_eq!(notifier.count(), 1);

        // State was reset: the continuing breach starts a fresh window.
        engine.evaluate(&sample_at("a1", base, 40, 95.0)).await;
        assert_eq!(alert_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn interrupted_breach_restarts_the_clock() {
        let pool = test_pool().await;
        seed_rule(&pool, cpu_rule_payload(90.0, 30)).await;
        let notifier = RecordingNotifier::new(false);
        let engine = AlertEngine::new(pool.clone(), notifier.clone());
        let base = Utc::now();

        engine.evaluate(&sample_at("a1", base, 0, 95.0)).await;
        engine.evaluate(&sample_at("a1", base, 15, 50.0)).await; // breach interrupted
        engine.evaluate(&sample_at("a1", base, 20, 95.0)).await; // clock restarts here
        engine.evaluate(&sample_at("a1", base, 49, 95.0)).await;
        assert_eq!(alert_count(&pool).await, 0);

        engine.evaluate(&sample_at("a1", base, 50, 95.0)).await;
        assert_eq!(alert_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn gte_memory_rule_is_inclusive_and_total_zero_is_guarded() {
        let pool = test_pool().await;
        seed_rule(
            &pool,
            AlertRulePayload {
                agent_id: String::new(),
                metric_type: MetricType::Memory,
                threshold: 80.0,
                operator: Operator::Gte,
                duration: 0,
                enabled: true,
                description: "memory".to_string(),
            },
        )
        .await;
        let notifier = RecordingNotifier::new(false);
        let engine = AlertEngine::new(pool.clone(), notifier.clone());
        let base = Utc::now();

        let mut breach = sample_at("a1", base, 0, 0.0);
        breach.memory_used = 8;
        breach.memory_total = 10;
        engine.evaluate(&breach).await; // exactly 80%: pending
        let mut breach2 = breach.clone();
        breach2.timestamp = base + Duration::seconds(1);
        engine.evaluate(&breach2).await; // fires

        let alerts = alert_service::get_recent_alerts(&pool, 100).await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].value, 80.0);
        assert_eq!(alerts[0].message, "memory: 80.00% gte 80.00%");

        // A zero total evaluates to 0%, never dividing by zero or firing.
        let mut zero_total = sample_at("a1", base, 2, 0.0);
        zero_total.memory_used = 8;
        zero_total.memory_total = 0;
        engine.evaluate(&zero_total).await;
        assert_eq!(alert_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn rules_are_scoped_per_agent() {
        let pool = test_pool().await;
        let mut payload = cpu_rule_payload(90.0, 0);
        payload.agent_id = "a1".to_string();
        seed_rule(&pool, payload).await;
        let notifier = RecordingNotifier::new(false);
        let engine = AlertEngine::new(pool.clone(), notifier.clone());
        let base = Utc::now();

        // Another agent breaching an a1-scoped rule never trips it.
        engine.evaluate(&sample_at("a2", base, 0, 99.0)).await;
        engine.evaluate(&sample_at("a2", base, 1, 99.0)).await;
        assert_eq!(alert_count(&pool).await, 0);

        engine.evaluate(&sample_at("a1", base, 2, 99.0)).await;
        engine.evaluate(&sample_at("a1", base, 3, 99.0)).await;
        assert_eq!(alert_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn agents_do_not_share_pending_state_on_a_global_rule() {
        let pool = test_pool().await;
        seed_rule(&pool, cpu_rule_payload(90.0, 30)).await;
        let notifier = RecordingNotifier::new(false);
        let engine = AlertEngine::new(pool.clone(), notifier.clone());
        let base = Utc::now();

        engine.evaluate(&sample_at("a1", base, 0, 95.0)).await;
        engine.evaluate(&sample_at("a2", base, 31, 95.0)).await; // a2's first breach
        assert_eq!(alert_count(&pool).await, 0);

        engine.evaluate(&sample_at("a1", base, 31, 95.0)).await;
        assert_eq!(alert_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn disabled_rules_are_skipped() {
        let pool = test_pool().await;
        let mut payload = cpu_rule_payload(90.0, 0);
        payload.enabled = false;
        seed_rule(&pool, payload).await;
        let notifier = RecordingNotifier::new(false);
        let engine = AlertEngine::new(pool.clone(), notifier.clone());
        let base = Utc::now();

        engine.evaluate(&sample_at("a1", base, 0, 99.0)).await;
        engine.evaluate(&sample_at("a1", base, 1, 99.0)).await;
        assert_eq!(alert_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn notification_failure_never_rolls_back_the_alert() {
        let pool = test_pool().await;
        seed_rule(&pool, cpu_rule_payload(90.0, 0)).await;
        let notifier = RecordingNotifier::new(true);
        let engine = AlertEngine::new(pool.clone(), notifier.clone());
        let base = Utc::now();

        engine.evaluate(&sample_at("a1", base, 0, 95.0)).await;
        engine.evaluate(&sample_at("a1", base, 1, 95.0)).await;

        assert_eq!(notifier.count(), 1);
        assert_eq!(alert_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn load_rule_uses_one_minute_average_without_unit() {
        let pool = test_pool().await;
        seed_rule(
            &pool,
            AlertRulePayload {
                agent_id: String::new(),
                metric_type: MetricType::Load,
                threshold: 4.0,
                operator: Operator::Gte,
                duration: 0,
                enabled: true,
                description: "load".to_string(),
            },
        )
        .await;
        let notifier = RecordingNotifier::new(false);
        let engine = AlertEngine::new(pool.clone(), notifier.clone());
        let base = Utc::now();

        let mut s = sample_at("a1", base, 0, 0.0);
        s.load_avg_1 = 6.5;
        engine.evaluate(&s).await;
        let mut s2 = s.clone();
        s2.timestamp = base + Duration::seconds(1);
        engine.evaluate(&s2).await;

        let alerts = alert_service::get_recent_alerts(&pool, 100).await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].message, "load: 6.50 gte 4.00");
    }
}
