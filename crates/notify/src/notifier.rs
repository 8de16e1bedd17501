use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("notification send failed: {0}")]
pub struct NotifyError(pub String);

impl NotifyError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Outbound message provider boundary (email + WhatsApp).
///
/// Implementations talk to external providers and may hang or fail; callers
/// bound each send with a timeout and treat failures as retryable.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, html: &str) -> Result<(), NotifyError>;

    /// `to` is the full number with country code (e.g. `+201001234567`).
    async fn send_whatsapp(&self, to: &str, body: &str) -> Result<(), NotifyError>;
}

/// Provider stand-in that logs instead of sending. Default wiring for local
/// runs; swap in a real provider adapter at deployment.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_email(&self, to: &str, subject: &str, _html: &str) -> Result<(), NotifyError> {
        tracing::info!(to, subject, "email send (log notifier)");
        Ok(())
    }

    async fn send_whatsapp(&self, to: &str, body: &str) -> Result<(), NotifyError> {
        tracing::info!(to, len = body.len(), "whatsapp send (log notifier)");
        Ok(())
    }
}

/// A message captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMessage {
    Email { to: String, subject: String, html: String },
    WhatsApp { to: String, body: String },
}

/// Test notifier that records sends and can be made to fail.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentMessage>>,
    failures_remaining: Mutex<u32>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `n` sends before succeeding again.
    pub fn fail_next(&self, n: u32) {
        *self.failures_remaining.lock().unwrap() = n;
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    fn try_consume_failure(&self) -> Result<(), NotifyError> {
        let mut remaining = self.failures_remaining.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            return Err(NotifyError::new("injected provider failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_email(&self, to: &str, subject: &str, html: &str) -> Result<(), NotifyError> {
        self.try_consume_failure()?;
        self.sent.lock().unwrap().push(SentMessage::Email {
            to: to.into(),
            subject: subject.into(),
            html: html.into(),
        });
        Ok(())
    }

    async fn send_whatsapp(&self, to: &str, body: &str) -> Result<(), NotifyError> {
        self.try_consume_failure()?;
        self.sent
            .lock()
            .unwrap()
            .push(SentMessage::WhatsApp { to: to.into(), body: body.into() });
        Ok(())
    }
}
