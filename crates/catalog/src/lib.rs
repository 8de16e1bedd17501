//! `nilecart-catalog` — product catalog domain.
//!
//! Products own their sale counters and reviews; orders only ever hold frozen
//! snapshots of catalog data.

pub mod product;
pub mod slide;

pub use product::{Product, ProductId, ProductUpdate, Review, SaleTerms};
pub use slide::{Slide, SlideId};
