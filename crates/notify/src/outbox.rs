use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What to send and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationPayload {
    Email { to: String, subject: String, html: String },
    WhatsApp { to: String, body: String },
}

/// Dispatch state of an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    Pending,
    Sent,
    DeadLettered,
}

/// A persisted "send this" record.
///
/// Written synchronously in the unit of work that triggered it; dispatched
/// asynchronously by the outbox worker. Failed sends retry with linear
/// backoff until [`NotificationIntent::mark_failed`] dead-letters them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationIntent {
    pub id: Uuid,
    pub payload: NotificationPayload,
    pub status: IntentStatus,
    pub attempts: u32,
    pub next_attempt_at: DateTime<Utc>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NotificationIntent {
    pub fn new(payload: NotificationPayload, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            payload,
            status: IntentStatus::Pending,
            attempts: 0,
            next_attempt_at: now,
            last_error: None,
            created_at: now,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == IntentStatus::Pending && self.next_attempt_at <= now
    }

    pub fn mark_sent(&mut self) {
        self.status = IntentStatus::Sent;
        self.last_error = None;
    }

    /// Record a failed attempt. Schedules a retry `attempts × backoff` out,
    /// or dead-letters once `max_attempts` is reached.
    pub fn mark_failed(
        &mut self,
        error: impl Into<String>,
        now: DateTime<Utc>,
        backoff: Duration,
        max_attempts: u32,
    ) {
        self.attempts += 1;
        self.last_error = Some(error.into());

        if self.attempts >= max_attempts {
            self.status = IntentStatus::DeadLettered;
        } else {
            self.next_attempt_at = now + backoff * (self.attempts as i32);
        }
    }
}
