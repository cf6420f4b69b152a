/// Mail adapter
///
/// Sends plain-text notification emails through an HTTP mail relay. Sends
/// are fire-and-forget from the workflow's perspective: a failure is
/// reported as a warning by the dispatcher and never retried.

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

/// Request timeout for mail calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Error type for mail operations
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// Transport-level failure (unreachable, timeout, TLS)
    #[error("Mail request failed: {0}")]
    Transport(String),

    /// The relay rejected the message
    #[error("Mail relay returned {status}: {message}")]
    Remote { status: u16, message: String },
}

/// Contract for sending one plain-text email
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        subject: &str,
        recipients: &[String],
        body: &str,
    ) -> Result<(), MailError>;
}

/// Configuration for the HTTP mail relay client
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Relay endpoint accepting a JSON message
    pub endpoint: String,

    /// Bearer token for the relay
    pub token: String,

    /// Sender address ("From")
    pub sender: String,
}

/// HTTP relay implementation of [`Mailer`]
pub struct HttpMailer {
    client: reqwest::Client,
    config: MailConfig,
}

impl HttpMailer {
    /// Creates a mail relay client with a bounded request timeout
    pub fn new(config: MailConfig) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(HttpMailer { client, config })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(
        &self,
        subject: &str,
        recipients: &[String],
        body: &str,
    ) -> Result<(), MailError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.token)
            .json(&json!({
                "from": self.config.sender,
                "to": recipients,
                "subject": subject,
                "text": body,
            }))
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = response.text().await.unwrap_or_default();
        Err(MailError::Remote {
            status: status.as_u16(),
            message,
        })
    }
}
