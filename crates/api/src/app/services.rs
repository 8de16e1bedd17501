use std::sync::Arc;

use nilecart_infra::{OrderWorkflow, StoreDb};

/// Shared application services handed to every handler via `Extension`.
pub struct AppServices {
    pub db: Arc<StoreDb>,
    pub workflow: OrderWorkflow,
}

/// Wire up the store and the order workflow.
///
/// `admin_email` is where new-order and cancellation-request emails go. The
/// outbox worker is spawned separately by the caller (`main.rs` or a test)
/// so it can pick the notifier and runtime.
pub fn build_services(admin_email: impl Into<String>) -> AppServices {
    let db = Arc::new(StoreDb::new());
    let workflow = OrderWorkflow::new(db.clone(), admin_email);
    AppServices { db, workflow }
}
