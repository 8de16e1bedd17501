//! `nilecart-notify` — outbound transactional messaging.
//!
//! Everything here is best-effort by contract: delivery failure never fails
//! the business operation that triggered the message. Business code records a
//! [`NotificationIntent`] in the outbox (same unit of work as the triggering
//! write); a background worker dispatches intents through a [`Notifier`].

pub mod compose;
pub mod notifier;
pub mod outbox;

pub use compose::EmailContent;
pub use notifier::{LogNotifier, Notifier, NotifyError, RecordingNotifier, SentMessage};
pub use outbox::{IntentStatus, NotificationIntent, NotificationPayload};
