use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use super::models::WebhookConfig;
use super::senders::{webhook::WebhookSender, SenderError};
use crate::db::models::{Alert, AlertRule};

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Sender error: {0}")]
    SenderError(#[from] SenderError),
}

/// Delivery seam for fired alerts. The alert engine only depends on this
/// trait, so tests can inject a recording stub.
#[async_trait]
pub trait AlertNotifier: Send + Sync {
    async fn notify(&self, alert: &Alert, rule: &AlertRule) -> Result<(), NotificationError>;
}

/// Dispatches fired alerts to the configured channel. With no channel
/// configured, dispatch is a logged no-op.
pub struct NotificationService {
    webhook: Option<WebhookConfig>,
    sender: WebhookSender,
}

impl NotificationService {
    pub fn new(webhook: Option<WebhookConfig>) -> Self {
        Self {
            webhook,
            sender: WebhookSender::new(),
        }
    }
}

#[async_trait]
impl AlertNotifier for NotificationService {
    async fn notify(&self, alert: &Alert, rule: &AlertRule) -> Result<(), NotificationError> {
        let Some(config) = &self.webhook else {
            debug!(rule_id = rule.id, "No notification channel configured. Skipping dispatch.");
            return Ok(());
        };
        self.sender.send(config, alert, rule).await?;
        Ok(())
    }
}
