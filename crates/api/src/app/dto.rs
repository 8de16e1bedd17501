use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use nilecart_orders::Order;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub price: Decimal,
    pub count_in_stock: u32,
    pub sizes: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub rating: u8,
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCouponRequest {
    pub code: String,
    pub discount_percentage: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct ValidateCouponRequest {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateSlideRequest {
    pub image: String,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub country_code: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

/// Buyer detail attached to an order read.
#[derive(Debug, Serialize)]
pub struct BuyerSummary {
    pub name: String,
    pub email: String,
}

/// An order with its buyer summary populated, the shape order-detail reads
/// return.
#[derive(Debug, Serialize)]
pub struct OrderWithBuyer {
    #[serde(flatten)]
    pub order: Order,
    pub user: Option<BuyerSummary>,
}
