use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use nilecart_catalog::ProductId;
use nilecart_core::{impl_uuid_id, DomainError, DomainResult, Entity, UserId};
use nilecart_pricing::{compute_shipping_price, round2};

use crate::status::OrderStatus;

/// Order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl_uuid_id!(OrderId, "OrderId");

/// A frozen snapshot of a purchased product at checkout time.
///
/// Independent of later catalog mutation: `name`, `price`, and `image` are
/// copied, not referenced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    /// Unit price at time of purchase.
    pub price: Decimal,
    pub qty: u32,
    pub size: String,
    pub color: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    /// Governorate; drives the shipping zone.
    pub state: String,
    pub zip: String,
    pub country: String,
}

/// Payment method. Cash on delivery is the only one offered today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "Cash on Delivery")]
    CashOnDelivery,
}

/// Gateway payment confirmation snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentResult {
    pub id: String,
    pub status: String,
    pub update_time: String,
    pub email_address: String,
}

/// Checkout input as submitted by the client.
///
/// `items_price` is the client-computed subtotal; shipping/tax/total are
/// recomputed server-side and any client-submitted values for them ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub line_items: Vec<LineItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub items_price: Decimal,
}

/// A customer order.
///
/// # Invariants
/// - `total_price == round2(items_price + tax_price + shipping_price)`.
/// - `tax_price` is always zero (current policy).
/// - `is_delivered`/`delivered_at` track `status == Delivered`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub line_items: Vec<LineItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub items_price: Decimal,
    pub tax_price: Decimal,
    pub shipping_price: Decimal,
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_result: Option<PaymentResult>,
    pub is_delivered: bool,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Validate a checkout draft and build the order with authoritative prices.
    ///
    /// Shipping is derived from the destination governorate and tax forced to
    /// zero regardless of what the client sent. The client-computed
    /// `items_price` subtotal is trusted as-is (known trust-boundary gap,
    /// preserved deliberately; see DESIGN.md).
    pub fn place(user_id: UserId, draft: OrderDraft, now: DateTime<Utc>) -> DomainResult<Order> {
        if draft.line_items.is_empty() {
            return Err(DomainError::validation("no order items"));
        }
        if draft.line_items.iter().any(|item| item.qty == 0) {
            return Err(DomainError::validation("line item qty must be at least 1"));
        }
        if draft.items_price < Decimal::ZERO {
            return Err(DomainError::validation("items_price must not be negative"));
        }

        let shipping_price = compute_shipping_price(&draft.shipping_address.state);
        let tax_price = Decimal::ZERO;
        let total_price = round2(draft.items_price + tax_price + shipping_price);

        Ok(Order {
            id: OrderId::new(),
            user_id,
            line_items: draft.line_items,
            shipping_address: draft.shipping_address,
            payment_method: draft.payment_method,
            items_price: draft.items_price,
            tax_price,
            shipping_price,
            total_price,
            status: OrderStatus::Pending,
            is_paid: false,
            paid_at: None,
            payment_result: None,
            is_delivered: false,
            delivered_at: None,
            created_at: now,
        })
    }

    /// Total units across all line items.
    pub fn units(&self) -> u32 {
        self.line_items.iter().map(|item| item.qty).sum()
    }

    /// Apply a status transition, keeping delivery metadata in sync.
    ///
    /// Moving to `Delivered` stamps `delivered_at`; moving anywhere else
    /// clears it, so a re-opened delivered order (were that ever permitted)
    /// would not keep stale delivery metadata.
    pub fn set_status(&mut self, to: OrderStatus, now: DateTime<Utc>) -> DomainResult<()> {
        self.status.validate_transition(to)?;
        self.status = to;

        if to == OrderStatus::Delivered {
            self.is_delivered = true;
            self.delivered_at = Some(now);
        } else {
            self.is_delivered = false;
            self.delivered_at = None;
        }
        Ok(())
    }

    /// Record payment confirmation.
    pub fn mark_paid(&mut self, result: PaymentResult, now: DateTime<Utc>) {
        self.is_paid = true;
        self.paid_at = Some(now);
        self.payment_result = Some(result);
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn address(state: &str) -> ShippingAddress {
        ShippingAddress {
            street: "12 Tahrir St".into(),
            city: "Cairo".into(),
            state: state.into(),
            zip: "11511".into(),
            country: "Egypt".into(),
        }
    }

    fn line(qty: u32, price: Decimal) -> LineItem {
        LineItem {
            product_id: ProductId::new(),
            name: "Linen Shirt".into(),
            price,
            qty,
            size: "M".into(),
            color: "white".into(),
            image: "/img/shirt.jpg".into(),
        }
    }

    fn draft(state: &str, items_price: Decimal) -> OrderDraft {
        OrderDraft {
            line_items: vec![line(2, dec!(250))],
            shipping_address: address(state),
            payment_method: PaymentMethod::CashOnDelivery,
            items_price,
        }
    }

    #[test]
    fn cairo_order_gets_zone_a_shipping_and_recomputed_total() {
        let order = Order::place(UserId::new(), draft("Cairo", dec!(500)), Utc::now()).unwrap();
        assert_eq!(order.shipping_price, dec!(70));
        assert_eq!(order.tax_price, dec!(0));
        assert_eq!(order.total_price, dec!(570.00));
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(!order.is_paid);
    }

    #[test]
    fn messy_governorate_input_still_resolves_its_zone() {
        let order =
            Order::place(UserId::new(), draft("alexandria ", dec!(100)), Utc::now()).unwrap();
        assert_eq!(order.shipping_price, dec!(90));
        assert_eq!(order.total_price, dec!(190.00));
    }

    #[test]
    fn unknown_governorate_gets_default_shipping() {
        let order = Order::place(UserId::new(), draft("Aswan", dec!(100)), Utc::now()).unwrap();
        assert_eq!(order.shipping_price, dec!(120));
    }

    #[test]
    fn empty_order_is_rejected() {
        let mut d = draft("Cairo", dec!(0));
        d.line_items.clear();
        let err = Order::place(UserId::new(), d, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn zero_qty_line_is_rejected() {
        let mut d = draft("Cairo", dec!(500));
        d.line_items.push(line(0, dec!(10)));
        assert!(Order::place(UserId::new(), d, Utc::now()).is_err());
    }

    #[test]
    fn delivered_transition_sets_delivery_metadata() {
        let mut order = Order::place(UserId::new(), draft("Giza", dec!(500)), Utc::now()).unwrap();
        order.set_status(OrderStatus::Confirmed, Utc::now()).unwrap();
        assert!(!order.is_delivered);

        order.set_status(OrderStatus::Delivered, Utc::now()).unwrap();
        assert!(order.is_delivered);
        assert!(order.delivered_at.is_some());
    }

    #[test]
    fn non_delivered_transition_clears_delivery_metadata() {
        let mut order = Order::place(UserId::new(), draft("Giza", dec!(500)), Utc::now()).unwrap();
        order.set_status(OrderStatus::Confirmed, Utc::now()).unwrap();
        order.set_status(OrderStatus::Canceled, Utc::now()).unwrap();
        assert!(!order.is_delivered);
        assert!(order.delivered_at.is_none());
    }

    #[test]
    fn canceling_a_delivered_order_fails() {
        let mut order = Order::place(UserId::new(), draft("Giza", dec!(500)), Utc::now()).unwrap();
        order.set_status(OrderStatus::Confirmed, Utc::now()).unwrap();
        order.set_status(OrderStatus::Delivered, Utc::now()).unwrap();

        let err = order.set_status(OrderStatus::Canceled, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition(_)));
        assert_eq!(order.status, OrderStatus::Delivered);
        assert!(order.is_delivered);
    }

    #[test]
    fn mark_paid_records_the_gateway_snapshot() {
        let mut order = Order::place(UserId::new(), draft("Cairo", dec!(500)), Utc::now()).unwrap();
        order.mark_paid(
            PaymentResult {
                id: "pay_1".into(),
                status: "COMPLETED".into(),
                update_time: "2026-08-01T10:00:00Z".into(),
                email_address: "buyer@example.com".into(),
            },
            Utc::now(),
        );
        assert!(order.is_paid);
        assert!(order.paid_at.is_some());
        assert_eq!(order.payment_result.as_ref().unwrap().id, "pay_1");
    }

    #[test]
    fn units_sums_line_quantities() {
        let mut d = draft("Cairo", dec!(500));
        d.line_items.push(line(3, dec!(10)));
        let order = Order::place(UserId::new(), d, Utc::now()).unwrap();
        assert_eq!(order.units(), 5);
    }
}
