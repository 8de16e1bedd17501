//! `nilecart-coupons` — percentage discount codes.

pub mod coupon;

pub use coupon::{Coupon, CouponId};
