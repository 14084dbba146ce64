pub mod webhook;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SenderError {
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Template error: {0}")]
    TemplateError(#[from] tera::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
