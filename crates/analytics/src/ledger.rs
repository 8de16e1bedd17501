use std::collections::BTreeMap;

use rust_decimal::Decimal;

use nilecart_catalog::ProductId;
use nilecart_orders::{Order, OrderStatus};

use crate::report::{rank_top_products, AnalyticsReport, TopProduct};

/// Incrementally maintained order statistics.
///
/// Updated in the same unit of work as order placement and status changes, so
/// the dashboard report is served without rescanning the order set. Canceled
/// orders contribute nothing: cancellation removes the order's entire prior
/// contribution (cancellation is terminal, so nothing is ever re-added).
#[derive(Debug, Default)]
pub struct AnalyticsLedger {
    total_revenue: Decimal,
    total_orders: u64,
    total_products_sold: u64,
    status_counts: BTreeMap<String, u64>,
    per_product: BTreeMap<ProductId, TopProduct>,
}

impl AnalyticsLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a newly placed (pending) order in.
    pub fn record_placed(&mut self, order: &Order) {
        debug_assert_eq!(order.status, OrderStatus::Pending);
        self.add(order);
    }

    /// Track a status transition that has already been applied to `order`.
    ///
    /// `from` is the status before the transition; `order.status` is the new
    /// one. Non-cancel transitions only move the histogram bucket.
    pub fn record_status_change(&mut self, order: &Order, from: OrderStatus) {
        if order.status == OrderStatus::Canceled {
            // Remove the order's contribution, including its old bucket.
            self.remove(order, from);
            return;
        }

        self.decrement_status(from);
        *self.status_counts.entry(order.status.to_string()).or_default() += 1;
    }

    pub fn report(&self) -> AnalyticsReport {
        AnalyticsReport {
            total_revenue: self.total_revenue,
            total_orders: self.total_orders,
            total_products_sold: self.total_products_sold,
            status_counts: self
                .status_counts
                .iter()
                .filter(|&(_, &n)| n > 0)
                .map(|(k, &n)| (k.clone(), n))
                .collect(),
            top_products: rank_top_products(self.per_product.values().cloned().collect()),
        }
    }

    fn add(&mut self, order: &Order) {
        self.total_revenue += order.total_price;
        self.total_orders += 1;
        self.total_products_sold += u64::from(order.units());
        *self.status_counts.entry(order.status.to_string()).or_default() += 1;

        for item in &order.line_items {
            let entry = self.per_product.entry(item.product_id).or_insert_with(|| TopProduct {
                product_id: item.product_id,
                name: item.name.clone(),
                image: item.image.clone(),
                qty: 0,
                revenue: Decimal::ZERO,
            });
            entry.qty += u64::from(item.qty);
            entry.revenue += item.price * Decimal::from(item.qty);
        }
    }

    fn remove(&mut self, order: &Order, bucket: OrderStatus) {
        self.total_revenue -= order.total_price;
        self.total_orders = self.total_orders.saturating_sub(1);
        self.total_products_sold = self.total_products_sold.saturating_sub(u64::from(order.units()));
        self.decrement_status(bucket);

        for item in &order.line_items {
            if let Some(entry) = self.per_product.get_mut(&item.product_id) {
                entry.qty = entry.qty.saturating_sub(u64::from(item.qty));
                entry.revenue -= item.price * Decimal::from(item.qty);
                if entry.qty == 0 {
                    self.per_product.remove(&item.product_id);
                }
            }
        }
    }

    fn decrement_status(&mut self, status: OrderStatus) {
        if let Some(n) = self.status_counts.get_mut(&status.to_string()) {
            *n = n.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::compute_report;
    use chrono::Utc;
    use nilecart_core::UserId;
    use nilecart_orders::{LineItem, OrderDraft, PaymentMethod, ShippingAddress};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn place(product_id: ProductId, qty: u32, unit_price: Decimal, state: &str) -> Order {
        let draft = OrderDraft {
            line_items: vec![LineItem {
                product_id,
                name: "Galabeya".into(),
                price: unit_price,
                qty,
                size: "L".into(),
                color: "navy".into(),
                image: "/img/galabeya.jpg".into(),
            }],
            shipping_address: ShippingAddress {
                street: "5 Nile St".into(),
                city: "x".into(),
                state: state.into(),
                zip: "".into(),
                country: "Egypt".into(),
            },
            payment_method: PaymentMethod::CashOnDelivery,
            items_price: unit_price * Decimal::from(qty),
        };
        Order::place(UserId::new(), draft, Utc::now()).unwrap()
    }

    #[test]
    fn placed_then_canceled_order_leaves_no_trace() {
        let mut ledger = AnalyticsLedger::new();
        let mut order = place(ProductId::new(), 2, dec!(100), "Cairo");

        ledger.record_placed(&order);
        assert_eq!(ledger.report().total_orders, 1);

        let from = order.status;
        order.set_status(OrderStatus::Canceled, Utc::now()).unwrap();
        ledger.record_status_change(&order, from);

        let report = ledger.report();
        assert_eq!(report.total_orders, 0);
        assert_eq!(report.total_revenue, dec!(0));
        assert_eq!(report.total_products_sold, 0);
        assert!(report.status_counts.is_empty());
        assert!(report.top_products.is_empty());
    }

    #[test]
    fn status_change_moves_the_histogram_bucket() {
        let mut ledger = AnalyticsLedger::new();
        let mut order = place(ProductId::new(), 1, dec!(100), "Giza");
        ledger.record_placed(&order);

        let from = order.status;
        order.set_status(OrderStatus::Confirmed, Utc::now()).unwrap();
        ledger.record_status_change(&order, from);

        let report = ledger.report();
        assert_eq!(report.status_counts.get("confirmed"), Some(&1));
        assert_eq!(report.status_counts.get("pending"), None);
        assert_eq!(report.total_orders, 1);
    }

    // Transition scripts: 0 = stay pending, 1 = confirm, 2 = confirm+deliver,
    // 3 = cancel from pending, 4 = confirm then cancel.
    fn apply_script(order: &mut Order, ledger: &mut AnalyticsLedger, script: u8) {
        let steps: &[OrderStatus] = match script {
            0 => &[],
            1 => &[OrderStatus::Confirmed],
            2 => &[OrderStatus::Confirmed, OrderStatus::Delivered],
            3 => &[OrderStatus::Canceled],
            _ => &[OrderStatus::Confirmed, OrderStatus::Canceled],
        };
        for &to in steps {
            let from = order.status;
            order.set_status(to, Utc::now()).unwrap();
            ledger.record_status_change(order, from);
        }
    }

    proptest! {
        #[test]
        fn ledger_agrees_with_the_full_scan(
            cases in prop::collection::vec(
                (0u8..3, 1u32..5, 1u32..500, 0u8..5),
                0..12,
            )
        ) {
            // A small shared product pool so top-product aggregation overlaps.
            let pool: Vec<ProductId> = (0..3).map(|_| ProductId::new()).collect();

            let mut ledger = AnalyticsLedger::new();
            let mut orders = Vec::new();

            for (product_ix, qty, price, script) in cases {
                let mut order = place(
                    pool[product_ix as usize],
                    qty,
                    Decimal::from(price),
                    "Cairo",
                );
                ledger.record_placed(&order);
                apply_script(&mut order, &mut ledger, script);
                orders.push(order);
            }

            prop_assert_eq!(ledger.report(), compute_report(orders.iter()));
        }
    }
}
