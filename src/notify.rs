//! Notification gateway.
//!
//! Workflows only ever call [`notify_best_effort`]: a failed email is logged
//! and swallowed, never turned into a workflow error.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum NotifyError {
    #[error("Notification rejected: {0}")]
    Rejected(String),
    #[error("Notification transport failed: {0}")]
    Transport(String),
}

/// Sends a message to a recipient. Implementations talk to SMTP, a queue, or a log.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Writes each message as a structured tracing event.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    from: String,
}

impl LogNotifier {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        if recipient.trim().is_empty() {
            return Err(NotifyError::Rejected("empty recipient".to_string()));
        }
        info!(
            from = %self.from,
            to = %recipient,
            subject = %subject,
            body_len = body.len(),
            "Email dispatched"
        );
        Ok(())
    }
}

/// Send and forget. Returns whether the message went out so callers can log it.
#[instrument(skip(notifier, body))]
pub async fn notify_best_effort(notifier: &dyn Notifier, recipient: &str, subject: &str, body: &str) -> bool {
    match notifier.send(recipient, subject, body).await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Notification failed; continuing");
            false
        }
    }
}
