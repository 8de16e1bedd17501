//! `nilecart-orders` — order domain: checkout validation, server-side price
//! recomputation, and the order status state machine.

pub mod order;
pub mod status;

pub use order::{LineItem, Order, OrderDraft, OrderId, PaymentMethod, PaymentResult, ShippingAddress};
pub use status::OrderStatus;
