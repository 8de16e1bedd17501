//! Asynchronous notification dispatcher.
//!
//! Polls the store's outbox for due intents and hands them to the configured
//! [`Notifier`]. Delivery is best-effort: a failed or timed-out send schedules
//! a retry with linear backoff, and an intent that exhausts its attempts is
//! dead-lettered and logged, never surfaced to the request that created it.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use uuid::Uuid;

use nilecart_notify::{IntentStatus, NotificationIntent, NotificationPayload, Notifier, NotifyError};

use crate::store::StoreDb;

#[derive(Debug, Clone)]
pub struct OutboxWorkerConfig {
    /// How often to scan for due intents.
    pub poll_interval: Duration,
    /// Hard cap on a single provider call.
    pub send_timeout: Duration,
    /// Base retry delay; attempt `n` waits `n × backoff`.
    pub backoff: chrono::Duration,
    /// Attempts before an intent is dead-lettered.
    pub max_attempts: u32,
}

impl Default for OutboxWorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            send_timeout: Duration::from_secs(10),
            backoff: chrono::Duration::seconds(30),
            max_attempts: 5,
        }
    }
}

/// Handle to a running worker. Dropping it stops the worker after its current
/// pass; [`OutboxWorkerHandle::shutdown`] additionally waits for that pass.
pub struct OutboxWorkerHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl OutboxWorkerHandle {
    /// Signal the worker and wait for its current pass to finish.
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        let _ = self.task.await;
    }
}

/// Outbox polling loop.
pub struct OutboxWorker {
    db: Arc<StoreDb>,
    notifier: Arc<dyn Notifier>,
    config: OutboxWorkerConfig,
}

impl OutboxWorker {
    /// Spawn the worker onto the current runtime.
    pub fn spawn(
        db: Arc<StoreDb>,
        notifier: Arc<dyn Notifier>,
        config: OutboxWorkerConfig,
    ) -> OutboxWorkerHandle {
        let (stop, mut stopped) = watch::channel(false);
        let worker = OutboxWorker { db, notifier, config };

        let task = tokio::spawn(async move {
            loop {
                worker.run_pass().await;

                tokio::select! {
                    _ = tokio::time::sleep(worker.config.poll_interval) => {}
                    changed = stopped.changed() => {
                        // Err means the handle was dropped; stop either way.
                        if changed.is_err() || *stopped.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        OutboxWorkerHandle { stop, task }
    }

    /// Dispatch every currently-due intent once.
    pub async fn run_pass(&self) {
        let due = match self.claim_due() {
            Ok(due) => due,
            Err(err) => {
                error!(%err, "outbox scan failed");
                return;
            }
        };

        for intent in due {
            let outcome = self.dispatch(&intent).await;
            self.settle(intent.id, outcome);
        }
    }

    fn claim_due(&self) -> Result<Vec<NotificationIntent>, crate::store::StoreError> {
        let now = Utc::now();
        self.db.read(|state| {
            let mut due: Vec<NotificationIntent> =
                state.outbox.values().filter(|i| i.is_due(now)).cloned().collect();
            due.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
            due
        })
    }

    async fn dispatch(&self, intent: &NotificationIntent) -> Result<(), NotifyError> {
        let send = async {
            match &intent.payload {
                NotificationPayload::Email { to, subject, html } => {
                    self.notifier.send_email(to, subject, html).await
                }
                NotificationPayload::WhatsApp { to, body } => {
                    self.notifier.send_whatsapp(to, body).await
                }
            }
        };

        match tokio::time::timeout(self.config.send_timeout, send).await {
            Ok(result) => result,
            Err(_) => Err(NotifyError::new("send timed out")),
        }
    }

    fn settle(&self, intent_id: Uuid, outcome: Result<(), NotifyError>) {
        let settled = self.db.write(|state| {
            let Some(intent) = state.outbox.get_mut(&intent_id) else {
                return None;
            };
            match &outcome {
                Ok(()) => intent.mark_sent(),
                Err(err) => intent.mark_failed(
                    err.to_string(),
                    Utc::now(),
                    self.config.backoff,
                    self.config.max_attempts,
                ),
            }
            Some((intent.status, intent.attempts))
        });

        match settled {
            Ok(Some((IntentStatus::Sent, _))) => {
                debug!(intent_id = %intent_id, "notification sent");
            }
            Ok(Some((IntentStatus::DeadLettered, attempts))) => {
                error!(intent_id = %intent_id, attempts, "notification dead-lettered");
            }
            Ok(Some((IntentStatus::Pending, attempts))) => {
                warn!(intent_id = %intent_id, attempts, "notification send failed, will retry");
            }
            Ok(None) => {}
            Err(err) => error!(%err, "outbox settle failed"),
        }
    }
}
