use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use nilecart_catalog::ProductId;
use nilecart_orders::{Order, OrderStatus};

/// Per-product sales aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopProduct {
    pub product_id: ProductId,
    /// Representative name/image: taken from the first line item seen.
    pub name: String,
    pub image: String,
    pub qty: u64,
    /// Σ qty × unit price across contributing line items.
    pub revenue: Decimal,
}

/// Dashboard statistics. Canceled orders are excluded from everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub total_revenue: Decimal,
    pub total_orders: u64,
    pub total_products_sold: u64,
    pub status_counts: BTreeMap<String, u64>,
    /// Top 5 by quantity sold, descending.
    pub top_products: Vec<TopProduct>,
}

pub(crate) const TOP_PRODUCTS_LIMIT: usize = 5;

/// Sort per-product rows and truncate to the dashboard's top list.
///
/// Quantity descending; ties broken by revenue, then name, so the ordering is
/// deterministic.
pub(crate) fn rank_top_products(mut rows: Vec<TopProduct>) -> Vec<TopProduct> {
    rows.retain(|p| p.qty > 0);
    rows.sort_by(|a, b| {
        b.qty
            .cmp(&a.qty)
            .then_with(|| b.revenue.cmp(&a.revenue))
            .then_with(|| a.name.cmp(&b.name))
    });
    rows.truncate(TOP_PRODUCTS_LIMIT);
    rows
}

/// Full scan over the order set.
///
/// This is the definitional computation the incremental
/// [`crate::AnalyticsLedger`] must agree with.
pub fn compute_report<'a>(orders: impl IntoIterator<Item = &'a Order>) -> AnalyticsReport {
    let mut total_revenue = Decimal::ZERO;
    let mut total_orders = 0u64;
    let mut total_products_sold = 0u64;
    let mut status_counts: BTreeMap<String, u64> = BTreeMap::new();
    let mut per_product: BTreeMap<ProductId, TopProduct> = BTreeMap::new();

    for order in orders {
        if order.status == OrderStatus::Canceled {
            continue;
        }

        total_revenue += order.total_price;
        total_orders += 1;
        *status_counts.entry(order.status.to_string()).or_default() += 1;

        for item in &order.line_items {
            total_products_sold += u64::from(item.qty);
            let entry = per_product.entry(item.product_id).or_insert_with(|| TopProduct {
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

    AnalyticsReport {
        total_revenue,
        total_orders,
        total_products_sold,
        status_counts,
        top_products: rank_top_products(per_product.into_values().collect()),
    }
}
