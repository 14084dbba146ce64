use serde::Deserialize;

/// Webhook delivery channel configuration, supplied by the server config.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    pub url: String,
    /// Optional Tera template for the request body. The default template
    /// posts a small JSON document with the alert fields.
    #[serde(default)]
    pub body_template: Option<String>,
}
