//! `nilecart-analytics` — revenue/status/top-product statistics over the
//! order set.
//!
//! [`compute_report`] is the definitional full scan. [`AnalyticsLedger`] is an
//! incrementally maintained aggregate kept in step with order placement and
//! status changes so serving the admin dashboard never rescans the order set;
//! the two must always agree (property-tested below).

pub mod ledger;
pub mod report;

pub use ledger::AnalyticsLedger;
pub use report::{compute_report, AnalyticsReport, TopProduct};
