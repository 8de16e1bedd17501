use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use nilecart_core::{impl_uuid_id, DomainError, DomainResult, Entity, UserId};

/// Product identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(Uuid);

impl_uuid_id!(ProductId, "ProductId");

/// A customer review. One per user per product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub user_id: UserId,
    /// Reviewer display name, frozen at review time.
    pub name: String,
    /// 1..=5.
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Sale configuration submitted by an admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleTerms {
    pub sale_price: Decimal,
    pub sale_limit: u32,
    pub is_sale_active: bool,
}

/// Partial update of product details. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub price: Option<Decimal>,
    pub sizes: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub count_in_stock: Option<u32>,
}

/// Catalog product.
///
/// # Invariants
/// - `rating == average(reviews.rating)` and `num_reviews == reviews.len()`
///   (maintained by [`Product::add_review`]).
/// - A sale is *available* only while `is_sale_active && sale_sold < sale_limit`.
///   The stored flag is never trusted alone; availability is derived at read
///   time via [`Product::sale_available`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub image: String,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub price: Decimal,
    pub is_sale_active: bool,
    pub sale_price: Decimal,
    pub sale_limit: u32,
    pub sale_sold: u32,
    pub count_in_stock: u32,
    pub reviews: Vec<Review>,
    /// Derived: average review rating.
    pub rating: Decimal,
    /// Derived: review count.
    pub num_reviews: u32,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        image: impl Into<String>,
        price: Decimal,
        count_in_stock: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ProductId::new(),
            name: name.into(),
            description: description.into(),
            image: image.into(),
            sizes: Vec::new(),
            colors: Vec::new(),
            price,
            is_sale_active: false,
            sale_price: Decimal::ZERO,
            sale_limit: 0,
            sale_sold: 0,
            count_in_stock,
            reviews: Vec::new(),
            rating: Decimal::ZERO,
            num_reviews: 0,
            created_at: now,
        }
    }

    /// Whether the sale window is currently open.
    ///
    /// The comparison is strict: once `sale_sold == sale_limit` the sale is
    /// exhausted and the base price applies, even though `is_sale_active`
    /// stays set until an admin flips it.
    pub fn sale_available(&self) -> bool {
        self.is_sale_active && self.sale_sold < self.sale_limit
    }

    /// Replace the sale terms and restart sold accounting.
    ///
    /// `sale_sold` resets to 0 unconditionally, even when merely adjusting an
    /// active sale's limit.
    pub fn set_sale(&mut self, terms: SaleTerms) -> DomainResult<()> {
        if terms.sale_price < Decimal::ZERO {
            return Err(DomainError::validation("sale_price must not be negative"));
        }
        self.sale_price = terms.sale_price;
        self.sale_limit = terms.sale_limit;
        self.is_sale_active = terms.is_sale_active;
        self.sale_sold = 0;
        Ok(())
    }

    /// Record units sold against the sale window.
    ///
    /// Unconditional while the flag is set: the counter keeps advancing even
    /// when the order was billed at base price because the sale was already
    /// exhausted ("sold" means allocated, not fulfilled).
    pub fn record_sale_units(&mut self, qty: u32) {
        if self.is_sale_active {
            self.sale_sold = self.sale_sold.saturating_add(qty);
        }
    }

    /// Append a review and recompute the derived rating fields.
    pub fn add_review(
        &mut self,
        user_id: UserId,
        name: impl Into<String>,
        rating: u8,
        comment: impl Into<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if !(1..=5).contains(&rating) {
            return Err(DomainError::validation("rating must be between 1 and 5"));
        }
        if self.reviews.iter().any(|r| r.user_id == user_id) {
            return Err(DomainError::conflict("product already reviewed"));
        }

        self.reviews.push(Review {
            user_id,
            name: name.into(),
            rating,
            comment: comment.into(),
            created_at: now,
        });

        self.num_reviews = self.reviews.len() as u32;
        let sum: Decimal = self.reviews.iter().map(|r| Decimal::from(r.rating)).sum();
        self.rating = sum / Decimal::from(self.reviews.len() as u32);
        Ok(())
    }

    /// Apply a partial admin update. `None` fields keep their current value.
    pub fn apply_update(&mut self, update: ProductUpdate) -> DomainResult<()> {
        if let Some(price) = update.price {
            if price < Decimal::ZERO {
                return Err(DomainError::validation("price must not be negative"));
            }
            self.price = price;
        }
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(image) = update.image {
            self.image = image;
        }
        if let Some(sizes) = update.sizes {
            self.sizes = sizes;
        }
        if let Some(colors) = update.colors {
            self.colors = colors;
        }
        if let Some(count) = update.count_in_stock {
            self.count_in_stock = count;
        }
        Ok(())
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn test_product() -> Product {
        Product::new("Linen Shirt", "Breathable linen", "/img/shirt.jpg", dec!(450), 20, Utc::now())
    }

    #[test]
    fn sale_is_unavailable_until_configured() {
        let product = test_product();
        assert!(!product.sale_available());
    }

    #[test]
    fn set_sale_resets_sold_counter_unconditionally() {
        let mut product = test_product();
        product
            .set_sale(SaleTerms { sale_price: dec!(80), sale_limit: 10, is_sale_active: true })
            .unwrap();
        product.record_sale_units(7);
        assert_eq!(product.sale_sold, 7);

        // Adjusting an active sale's limit still restarts accounting.
        product
            .set_sale(SaleTerms { sale_price: dec!(80), sale_limit: 15, is_sale_active: true })
            .unwrap();
        assert_eq!(product.sale_sold, 0);
    }

    #[test]
    fn sale_exhausts_at_limit_with_strict_comparison() {
        let mut product = test_product();
        product
            .set_sale(SaleTerms { sale_price: dec!(300), sale_limit: 3, is_sale_active: true })
            .unwrap();
        product.record_sale_units(2);
        assert!(product.sale_available());

        product.record_sale_units(1);
        assert_eq!(product.sale_sold, 3);
        assert!(!product.sale_available());
        // The flag is not auto-cleared.
        assert!(product.is_sale_active);
    }

    #[test]
    fn record_sale_units_is_a_no_op_when_sale_inactive() {
        let mut product = test_product();
        product.record_sale_units(5);
        assert_eq!(product.sale_sold, 0);
    }

    #[test]
    fn add_review_recomputes_derived_fields() {
        let mut product = test_product();
        product.add_review(UserId::new(), "Aya", 4, "good", Utc::now()).unwrap();
        product.add_review(UserId::new(), "Omar", 5, "great", Utc::now()).unwrap();

        assert_eq!(product.num_reviews, 2);
        assert_eq!(product.rating, dec!(4.5));
    }

    #[test]
    fn second_review_by_same_user_is_rejected() {
        let mut product = test_product();
        let user = UserId::new();
        product.add_review(user, "Aya", 4, "good", Utc::now()).unwrap();

        let err = product.add_review(user, "Aya", 2, "changed my mind", Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(product.num_reviews, 1);
    }

    #[test]
    fn out_of_range_rating_is_rejected() {
        let mut product = test_product();
        let err = product.add_review(UserId::new(), "Aya", 6, "!!", Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        let err = product.add_review(UserId::new(), "Aya", 0, "??", Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn apply_update_only_touches_provided_fields() {
        let mut product = test_product();
        product
            .apply_update(ProductUpdate {
                price: Some(dec!(500)),
                count_in_stock: Some(12),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(product.price, dec!(500));
        assert_eq!(product.count_in_stock, 12);
        assert_eq!(product.name, "Linen Shirt");
    }

    #[test]
    fn negative_price_update_is_rejected() {
        let mut product = test_product();
        let err = product
            .apply_update(ProductUpdate { price: Some(dec!(-1)), ..Default::default() })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
