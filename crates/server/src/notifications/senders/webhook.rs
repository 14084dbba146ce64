use reqwest::{header, Client};
use tera::{Context, Tera};

use super::SenderError;
use crate::db::models::{Alert, AlertRule};
use crate::notifications::models::WebhookConfig;

const DEFAULT_BODY_TEMPLATE: &str = r#"{
  "agent_id": {{ agent_id | json_encode() }},
  "rule": {{ rule | json_encode() }},
  "message": {{ message | json_encode() }},
  "value": {{ value }},
  "timestamp": {{ timestamp | json_encode() }}
}"#;

/// Pushes fired alerts to a configured webhook endpoint.
pub struct WebhookSender {
    client: Client,
}

impl WebhookSender {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub async fn send(
        &self,
        config: &WebhookConfig,
        alert: &Alert,
        rule: &AlertRule,
    ) -> Result<(), SenderError> {
        let template = config
            .body_template
            .as_deref()
            .unwrap_or(DEFAULT_BODY_TEMPLATE);

        let mut context = Context::new();
        context.insert("agent_id", &alert.agent_id);
        context.insert("rule", &rule.description);
        context.insert("message", &alert.message);
        context.insert("value", &alert.value);
        context.insert("timestamp", &alert.timestamp.to_rfc3339());

        let body = Tera::one_off(template, &context, false)?;

        self.client
            .post(&config.url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

impl Default for WebhookSender {
    fn default() -> Self {
        Self::new()
    }
}
