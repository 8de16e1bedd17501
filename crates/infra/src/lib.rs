//! `nilecart-infra` — storage and orchestration.
//!
//! The document store is an in-process map behind one lock; that single lock
//! is also the unit-of-work boundary, so an order insert, its sale-counter
//! increments, the analytics ledger update, and the notification outbox
//! append commit together or not at all.

pub mod outbox_worker;
pub mod store;
pub mod workflow;

pub use outbox_worker::{OutboxWorker, OutboxWorkerConfig, OutboxWorkerHandle};
pub use store::{StoreDb, StoreError};
pub use workflow::{OrderWorkflow, WorkflowError};
