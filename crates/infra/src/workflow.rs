//! Order workflow orchestration.
//!
//! Every mutating operation runs as one unit of work against the store: the
//! order write, its sale-counter increments, the analytics ledger update, and
//! any notification intents commit under the same lock. Actual notification
//! delivery is asynchronous (see [`crate::outbox_worker`]) and best-effort.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::info;

use nilecart_analytics::AnalyticsReport;
use nilecart_auth::{Role, User};
use nilecart_core::{DomainError, UserId};
use nilecart_notify::{compose, NotificationIntent, NotificationPayload};
use nilecart_orders::{Order, OrderDraft, OrderId, OrderStatus, PaymentResult};

use crate::store::{DbState, StoreDb, StoreError};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Order pricing and status-transition workflow.
pub struct OrderWorkflow {
    db: Arc<StoreDb>,
    /// Recipient of new-order and cancellation-request emails.
    admin_email: String,
}

impl OrderWorkflow {
    pub fn new(db: Arc<StoreDb>, admin_email: impl Into<String>) -> Self {
        Self { db, admin_email: admin_email.into() }
    }

    /// Validate, price, and persist a checkout draft.
    ///
    /// The order insert, the `sale_sold` increments for on-sale products, the
    /// analytics ledger update, and the admin-email outbox record commit in
    /// one unit of work.
    pub fn place_order(&self, user_id: UserId, draft: OrderDraft) -> WorkflowResult<Order> {
        let now = Utc::now();
        let order = Order::place(user_id, draft, now)?;

        let placed = self.db.write(|state| {
            for item in &order.line_items {
                if let Some(product) = state.products.get_mut(&item.product_id) {
                    product.record_sale_units(item.qty);
                }
            }

            state.ledger.record_placed(&order);

            // The admin hears about every order, profile on file or not.
            let buyer = state
                .users
                .get(&user_id)
                .cloned()
                .unwrap_or_else(|| placeholder_buyer(user_id));
            let email = compose::admin_order_email(&order, &buyer);
            enqueue(
                state,
                NotificationPayload::Email {
                    to: self.admin_email.clone(),
                    subject: email.subject,
                    html: email.html,
                },
            );

            state.orders.insert(order.id, order.clone());
            order.clone()
        })?;

        info!(order_id = %placed.id, total = %placed.total_price, "order placed");
        Ok(placed)
    }

    /// Apply a status transition and enqueue the matching customer message.
    pub fn update_status(&self, order_id: &OrderId, to: OrderStatus) -> WorkflowResult<Order> {
        let now = Utc::now();

        let updated = self.db.write(|state| -> Result<Order, DomainError> {
            let order = state.orders.get_mut(order_id).ok_or(DomainError::NotFound)?;

            let from = order.status;
            order.set_status(to, now)?;
            let snapshot = order.clone();

            state.ledger.record_status_change(&snapshot, from);

            // Customer WhatsApp messages only go out when a phone is on file;
            // absent phone is a silent skip, not an error.
            if matches!(to, OrderStatus::Confirmed | OrderStatus::Canceled) {
                if let Some(buyer) = state.users.get(&snapshot.user_id).cloned() {
                    if let Some(phone) = buyer.full_phone_number() {
                        let body = match to {
                            OrderStatus::Confirmed => compose::whatsapp_receipt(&snapshot, &buyer),
                            _ => compose::whatsapp_cancellation(&snapshot, &buyer),
                        };
                        enqueue(state, NotificationPayload::WhatsApp { to: phone, body });
                    }
                }
            }

            Ok(snapshot)
        })??;

        info!(order_id = %order_id, status = %to, "order status updated");
        Ok(updated)
    }

    /// Customer-initiated cancellation request.
    ///
    /// Does not change the order status; it enqueues an admin email and leaves
    /// the actual cancellation to a later `update_status` call.
    pub fn request_cancellation(
        &self,
        order_id: &OrderId,
        requester_id: UserId,
        requester_role: Role,
    ) -> WorkflowResult<()> {
        self.db.write(|state| -> Result<(), DomainError> {
            let order = state.orders.get(order_id).ok_or(DomainError::NotFound)?;

            if order.user_id != requester_id && !requester_role.is_admin() {
                return Err(DomainError::Unauthorized);
            }
            if order.is_delivered {
                return Err(DomainError::invalid_transition(
                    "cannot cancel a delivered order",
                ));
            }

            let buyer = state
                .users
                .get(&order.user_id)
                .cloned()
                .unwrap_or_else(|| placeholder_buyer(order.user_id));
            let email = compose::cancellation_request_email(order, &buyer);
            enqueue(
                state,
                NotificationPayload::Email {
                    to: self.admin_email.clone(),
                    subject: email.subject,
                    html: email.html,
                },
            );
            Ok(())
        })??;

        info!(order_id = %order_id, "cancellation requested");
        Ok(())
    }

    /// Record a payment confirmation snapshot.
    pub fn mark_paid(&self, order_id: &OrderId, result: PaymentResult) -> WorkflowResult<Order> {
        let now = Utc::now();
        let order = self.db.write(|state| -> Result<Order, DomainError> {
            let order = state.orders.get_mut(order_id).ok_or(DomainError::NotFound)?;
            order.mark_paid(result, now);
            Ok(order.clone())
        })??;
        Ok(order)
    }

    pub fn get_order(&self, order_id: &OrderId) -> WorkflowResult<Order> {
        self.db
            .order(order_id)?
            .ok_or_else(|| DomainError::not_found().into())
    }

    /// All orders, oldest first (FIFO processing queue for the admin).
    pub fn list_orders(&self) -> WorkflowResult<Vec<Order>> {
        let mut orders = self.db.read(|state| state.orders.values().cloned().collect::<Vec<_>>())?;
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(orders)
    }

    /// Orders owned by one user, oldest first.
    pub fn list_orders_for(&self, user_id: UserId) -> WorkflowResult<Vec<Order>> {
        let mut orders = self.db.read(|state| {
            state
                .orders
                .values()
                .filter(|o| o.user_id == user_id)
                .cloned()
                .collect::<Vec<_>>()
        })?;
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(orders)
    }

    /// Dashboard statistics, served from the incrementally maintained ledger.
    pub fn analytics(&self) -> WorkflowResult<AnalyticsReport> {
        Ok(self.db.read(|state| state.ledger.report())?)
    }
}

fn enqueue(state: &mut DbState, payload: NotificationPayload) {
    let intent = NotificationIntent::new(payload, Utc::now());
    state.outbox.insert(intent.id, intent);
}

/// Stand-in buyer detail when the owning user record has been purged.
fn placeholder_buyer(user_id: UserId) -> User {
    User {
        id: user_id,
        first_name: "Customer".into(),
        last_name: format!("#{user_id}"),
        email: String::new(),
        role: Role::Customer,
        phone_number: None,
        country_code: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nilecart_catalog::{Product, SaleTerms};
    use nilecart_notify::IntentStatus;
    use nilecart_orders::{LineItem, PaymentMethod, ShippingAddress};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn buyer(phone: Option<&str>) -> User {
        User {
            id: UserId::new(),
            first_name: "Mona".into(),
            last_name: "Hassan".into(),
            email: "mona@example.com".into(),
            role: Role::Customer,
            phone_number: phone.map(Into::into),
            country_code: None,
        }
    }

    fn draft_for(product: &Product, qty: u32, state: &str) -> OrderDraft {
        let unit = dec!(250);
        OrderDraft {
            line_items: vec![LineItem {
                product_id: product.id,
                name: product.name.clone(),
                price: unit,
                qty,
                size: "M".into(),
                color: "white".into(),
                image: product.image.clone(),
            }],
            shipping_address: ShippingAddress {
                street: "12 Tahrir St".into(),
                city: "Cairo".into(),
                state: state.into(),
                zip: "11511".into(),
                country: "Egypt".into(),
            },
            payment_method: PaymentMethod::CashOnDelivery,
            items_price: unit * Decimal::from(qty),
        }
    }

    fn setup(phone: Option<&str>) -> (Arc<StoreDb>, OrderWorkflow, User, Product) {
        let db = Arc::new(StoreDb::new());
        let workflow = OrderWorkflow::new(db.clone(), "admin@nilecart.test");
        let user = buyer(phone);
        db.upsert_user(user.clone()).unwrap();
        let mut product = Product::new("Linen Shirt", "", "/img/shirt.jpg", dec!(450), 20, Utc::now());
        product
            .set_sale(SaleTerms { sale_price: dec!(250), sale_limit: 10, is_sale_active: true })
            .unwrap();
        db.upsert_product(product.clone()).unwrap();
        (db, workflow, user, product)
    }

    fn pending_outbox(db: &StoreDb) -> Vec<NotificationIntent> {
        db.read(|s| {
            s.outbox
                .values()
                .filter(|i| i.status == IntentStatus::Pending)
                .cloned()
                .collect()
        })
        .unwrap()
    }

    #[test]
    fn placing_an_order_prices_persists_counts_and_notifies() {
        let (db, workflow, user, product) = setup(Some("1001234567"));

        let order = workflow.place_order(user.id, draft_for(&product, 2, "Cairo")).unwrap();

        assert_eq!(order.shipping_price, dec!(70));
        assert_eq!(order.total_price, dec!(570.00));
        assert_eq!(order.status, OrderStatus::Pending);

        // Sale counter advanced by qty inside the same unit of work.
        assert_eq!(db.product(&product.id).unwrap().unwrap().sale_sold, 2);

        // Exactly one admin email intent.
        let outbox = pending_outbox(&db);
        assert_eq!(outbox.len(), 1);
        assert!(matches!(&outbox[0].payload, NotificationPayload::Email { to, .. } if to == "admin@nilecart.test"));

        // Ledger already reflects the order.
        let report = workflow.analytics().unwrap();
        assert_eq!(report.total_orders, 1);
        assert_eq!(report.total_revenue, dec!(570.00));
    }

    #[test]
    fn admin_is_notified_even_without_a_stored_buyer_profile() {
        let (db, workflow, _user, product) = setup(None);

        // Authenticated buyer who never saved a profile.
        let ghost = UserId::new();
        workflow.place_order(ghost, draft_for(&product, 1, "Cairo")).unwrap();

        let outbox = pending_outbox(&db);
        assert_eq!(outbox.len(), 1);
        assert!(matches!(&outbox[0].payload, NotificationPayload::Email { to, .. } if to == "admin@nilecart.test"));
    }

    #[test]
    fn sale_counter_advances_even_when_sale_is_exhausted() {
        let (db, workflow, user, mut product) = setup(None);
        product
            .set_sale(SaleTerms { sale_price: dec!(250), sale_limit: 1, is_sale_active: true })
            .unwrap();
        db.upsert_product(product.clone()).unwrap();

        workflow.place_order(user.id, draft_for(&product, 3, "Giza")).unwrap();
        // 3 > limit 1: counter still advances unconditionally.
        assert_eq!(db.product(&product.id).unwrap().unwrap().sale_sold, 3);
    }

    #[test]
    fn empty_draft_is_rejected_and_nothing_is_written() {
        let (db, workflow, user, product) = setup(None);
        let mut draft = draft_for(&product, 1, "Cairo");
        draft.line_items.clear();

        let err = workflow.place_order(user.id, draft).unwrap_err();
        assert!(matches!(err, WorkflowError::Domain(DomainError::Validation(_))));
        assert!(db.read(|s| s.orders.is_empty()).unwrap());
        assert!(pending_outbox(&db).is_empty());
        assert_eq!(db.product(&product.id).unwrap().unwrap().sale_sold, 0);
    }

    #[test]
    fn confirming_enqueues_a_whatsapp_receipt_when_phone_on_file() {
        let (db, workflow, user, product) = setup(Some("1001234567"));
        let order = workflow.place_order(user.id, draft_for(&product, 2, "Cairo")).unwrap();

        workflow.update_status(&order.id, OrderStatus::Confirmed).unwrap();

        let whatsapp: Vec<_> = pending_outbox(&db)
            .into_iter()
            .filter(|i| matches!(i.payload, NotificationPayload::WhatsApp { .. }))
            .collect();
        assert_eq!(whatsapp.len(), 1);
        match &whatsapp[0].payload {
            NotificationPayload::WhatsApp { to, body } => {
                assert_eq!(to, "+201001234567");
                assert!(body.contains("has been confirmed"));
                assert!(body.contains("*Total: 570.00 EGP*"));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn confirming_without_a_phone_skips_the_receipt_silently() {
        let (db, workflow, user, product) = setup(None);
        let order = workflow.place_order(user.id, draft_for(&product, 1, "Cairo")).unwrap();

        workflow.update_status(&order.id, OrderStatus::Confirmed).unwrap();

        assert!(pending_outbox(&db)
            .iter()
            .all(|i| matches!(i.payload, NotificationPayload::Email { .. })));
    }

    #[test]
    fn canceling_enqueues_a_cancellation_notice_and_keeps_counters() {
        let (db, workflow, user, product) = setup(Some("1001234567"));
        let order = workflow.place_order(user.id, draft_for(&product, 2, "Cairo")).unwrap();

        workflow.update_status(&order.id, OrderStatus::Canceled).unwrap();

        // Counters are never decremented on cancellation.
        assert_eq!(db.product(&product.id).unwrap().unwrap().sale_sold, 2);

        // But the ledger no longer counts the order.
        let report = workflow.analytics().unwrap();
        assert_eq!(report.total_orders, 0);

        let notice = pending_outbox(&db)
            .into_iter()
            .find(|i| matches!(i.payload, NotificationPayload::WhatsApp { .. }))
            .expect("cancellation notice");
        match notice.payload {
            NotificationPayload::WhatsApp { body, .. } => {
                assert!(body.contains("has been canceled"))
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn delivered_orders_cannot_be_canceled() {
        let (_db, workflow, user, product) = setup(None);
        let order = workflow.place_order(user.id, draft_for(&product, 1, "Cairo")).unwrap();
        workflow.update_status(&order.id, OrderStatus::Confirmed).unwrap();
        workflow.update_status(&order.id, OrderStatus::Delivered).unwrap();

        let err = workflow.update_status(&order.id, OrderStatus::Canceled).unwrap_err();
        assert!(matches!(err, WorkflowError::Domain(DomainError::InvalidTransition(_))));
    }

    #[test]
    fn cancellation_request_enforces_ownership() {
        let (db, workflow, user, product) = setup(None);
        let order = workflow.place_order(user.id, draft_for(&product, 1, "Cairo")).unwrap();

        let stranger = UserId::new();
        let err = workflow
            .request_cancellation(&order.id, stranger, Role::Customer)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Domain(DomainError::Unauthorized)));

        // Owner may request; admin may request on anyone's behalf.
        workflow.request_cancellation(&order.id, user.id, Role::Customer).unwrap();
        workflow.request_cancellation(&order.id, stranger, Role::Admin).unwrap();

        let emails = pending_outbox(&db)
            .into_iter()
            .filter(|i| matches!(&i.payload, NotificationPayload::Email { subject, .. } if subject.contains("Cancellation Request")))
            .count();
        assert_eq!(emails, 2);
    }

    #[test]
    fn cancellation_request_rejected_for_delivered_orders() {
        let (_db, workflow, user, product) = setup(None);
        let order = workflow.place_order(user.id, draft_for(&product, 1, "Cairo")).unwrap();
        workflow.update_status(&order.id, OrderStatus::Confirmed).unwrap();
        workflow.update_status(&order.id, OrderStatus::Delivered).unwrap();

        let err = workflow
            .request_cancellation(&order.id, user.id, Role::Customer)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Domain(DomainError::InvalidTransition(_))));
    }

    #[test]
    fn cancellation_request_leaves_status_untouched() {
        let (_db, workflow, user, product) = setup(None);
        let order = workflow.place_order(user.id, draft_for(&product, 1, "Cairo")).unwrap();
        workflow.request_cancellation(&order.id, user.id, Role::Customer).unwrap();
        assert_eq!(workflow.get_order(&order.id).unwrap().status, OrderStatus::Pending);
    }

    #[test]
    fn orders_list_oldest_first() {
        let (_db, workflow, user, product) = setup(None);
        let first = workflow.place_order(user.id, draft_for(&product, 1, "Cairo")).unwrap();
        let second = workflow.place_order(user.id, draft_for(&product, 1, "Giza")).unwrap();

        let all = workflow.list_orders().unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].created_at <= all[1].created_at);
        assert_eq!(all[0].id, first.id);
        assert_eq!(all[1].id, second.id);
    }

    #[test]
    fn my_orders_only_returns_the_requesters() {
        let (db, workflow, user, product) = setup(None);
        let other = buyer(None);
        db.upsert_user(other.clone()).unwrap();

        workflow.place_order(user.id, draft_for(&product, 1, "Cairo")).unwrap();
        workflow.place_order(other.id, draft_for(&product, 1, "Cairo")).unwrap();

        assert_eq!(workflow.list_orders_for(user.id).unwrap().len(), 1);
    }

    #[test]
    fn mark_paid_records_the_snapshot() {
        let (_db, workflow, user, product) = setup(None);
        let order = workflow.place_order(user.id, draft_for(&product, 1, "Cairo")).unwrap();

        let paid = workflow
            .mark_paid(
                &order.id,
                PaymentResult {
                    id: "pay_9".into(),
                    status: "COMPLETED".into(),
                    update_time: "t".into(),
                    email_address: "mona@example.com".into(),
                },
            )
            .unwrap();
        assert!(paid.is_paid);
    }

    #[test]
    fn missing_order_is_not_found() {
        let (_db, workflow, _user, _product) = setup(None);
        let err = workflow.get_order(&OrderId::new()).unwrap_err();
        assert!(matches!(err, WorkflowError::Domain(DomainError::NotFound)));
    }
}
