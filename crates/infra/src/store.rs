//! In-memory document store.
//!
//! Collections live in one `RwLock`-guarded state struct. `read`/`write`
//! closures are the transaction primitives: everything done inside a single
//! `write` call is atomic with respect to every other store access, which is
//! what the order workflow relies on for its multi-collection writes.

use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;
use uuid::Uuid;

use nilecart_analytics::AnalyticsLedger;
use nilecart_auth::User;
use nilecart_catalog::{Product, ProductId, Slide, SlideId};
use nilecart_core::UserId;
use nilecart_coupons::{Coupon, CouponId};
use nilecart_notify::NotificationIntent;
use nilecart_orders::{Order, OrderId};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A writer panicked while holding the lock; the store is unusable.
    #[error("store lock poisoned")]
    LockPoisoned,
}

/// All persisted collections plus the derived analytics ledger.
#[derive(Debug, Default)]
pub struct DbState {
    pub products: HashMap<ProductId, Product>,
    pub orders: HashMap<OrderId, Order>,
    pub users: HashMap<UserId, User>,
    pub coupons: HashMap<CouponId, Coupon>,
    pub slides: HashMap<SlideId, Slide>,
    pub outbox: HashMap<Uuid, NotificationIntent>,
    pub ledger: AnalyticsLedger,
}

/// Process-wide document store handle.
#[derive(Debug, Default)]
pub struct StoreDb {
    inner: RwLock<DbState>,
}

impl StoreDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a read-only closure against a consistent snapshot of the state.
    pub fn read<R>(&self, f: impl FnOnce(&DbState) -> R) -> Result<R, StoreError> {
        let state = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(f(&state))
    }

    /// Run a mutating closure as a unit of work.
    pub fn write<R>(&self, f: impl FnOnce(&mut DbState) -> R) -> Result<R, StoreError> {
        let mut state = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        Ok(f(&mut state))
    }

    // Convenience single-document accessors used by the read-side handlers.

    pub fn product(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        self.read(|s| s.products.get(id).cloned())
    }

    pub fn order(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        self.read(|s| s.orders.get(id).cloned())
    }

    pub fn user(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        self.read(|s| s.users.get(id).cloned())
    }

    pub fn upsert_user(&self, user: User) -> Result<(), StoreError> {
        self.write(|s| {
            s.users.insert(user.id, user);
        })
    }

    pub fn upsert_product(&self, product: Product) -> Result<(), StoreError> {
        self.write(|s| {
            s.products.insert(product.id, product);
        })
    }

    /// Products, optionally filtered by a case-insensitive name keyword.
    pub fn list_products(&self, keyword: Option<&str>) -> Result<Vec<Product>, StoreError> {
        self.read(|s| {
            let mut products: Vec<Product> = match keyword {
                Some(kw) if !kw.trim().is_empty() => {
                    let needle = kw.trim().to_lowercase();
                    s.products
                        .values()
                        .filter(|p| p.name.to_lowercase().contains(&needle))
                        .cloned()
                        .collect()
                }
                _ => s.products.values().cloned().collect(),
            };
            products.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
            products
        })
    }

    /// Top rated products, capped.
    pub fn top_products(&self, limit: usize) -> Result<Vec<Product>, StoreError> {
        self.read(|s| {
            let mut products: Vec<Product> = s.products.values().cloned().collect();
            products.sort_by(|a, b| b.rating.cmp(&a.rating).then(a.id.cmp(&b.id)));
            products.truncate(limit);
            products
        })
    }

    pub fn remove_product(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        self.write(|s| s.products.remove(id))
    }

    pub fn coupon_by_code(&self, normalized_code: &str) -> Result<Option<Coupon>, StoreError> {
        self.read(|s| s.coupons.values().find(|c| c.code == normalized_code).cloned())
    }

    pub fn list_coupons(&self) -> Result<Vec<Coupon>, StoreError> {
        self.read(|s| {
            let mut coupons: Vec<Coupon> = s.coupons.values().cloned().collect();
            coupons.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
            coupons
        })
    }

    pub fn remove_coupon(&self, id: &CouponId) -> Result<Option<Coupon>, StoreError> {
        self.write(|s| s.coupons.remove(id))
    }

    pub fn insert_slide(&self, slide: Slide) -> Result<(), StoreError> {
        self.write(|s| {
            s.slides.insert(slide.id, slide);
        })
    }

    /// Carousel slides, oldest first so the landing page order is stable.
    pub fn list_slides(&self) -> Result<Vec<Slide>, StoreError> {
        self.read(|s| {
            let mut slides: Vec<Slide> = s.slides.values().cloned().collect();
            slides.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
            slides
        })
    }

    pub fn remove_slide(&self, id: &SlideId) -> Result<Option<Slide>, StoreError> {
        self.write(|s| s.slides.remove(id))
    }
}
