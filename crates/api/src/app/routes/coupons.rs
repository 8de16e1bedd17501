use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;

use nilecart_core::DomainError;
use nilecart_coupons::{coupon::normalize_code, Coupon, CouponId};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_coupons).post(create_coupon))
        .route("/:id", delete(delete_coupon))
        .route("/validate", post(validate_coupon))
}

/// Admin: all coupons.
pub async fn list_coupons(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if !principal.is_admin() {
        return errors::forbidden();
    }
    match services.db.list_coupons() {
        Ok(coupons) => Json(coupons).into_response(),
        Err(e) => errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string()),
    }
}

/// Admin: create a coupon. Codes are unique after upper-normalization.
pub async fn create_coupon(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateCouponRequest>,
) -> axum::response::Response {
    if !principal.is_admin() {
        return errors::forbidden();
    }

    let coupon = match Coupon::new(&body.code, body.discount_percentage, Utc::now()) {
        Ok(coupon) => coupon,
        Err(e) => return errors::domain_error_to_response(e),
    };

    // Uniqueness check and insert under one write lock.
    let result = services.db.write(|state| -> Result<Coupon, DomainError> {
        if state.coupons.values().any(|c| c.code == coupon.code) {
            return Err(DomainError::conflict("coupon code already exists"));
        }
        state.coupons.insert(coupon.id, coupon.clone());
        Ok(coupon)
    });

    match result {
        Ok(Ok(coupon)) => (StatusCode::CREATED, Json(coupon)).into_response(),
        Ok(Err(e)) => errors::domain_error_to_response(e),
        Err(e) => errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string()),
    }
}

/// Admin: remove a coupon.
pub async fn delete_coupon(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if !principal.is_admin() {
        return errors::forbidden();
    }

    let coupon_id: CouponId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid coupon id"),
    };

    match services.db.remove_coupon(&coupon_id) {
        Ok(Some(_)) => Json(serde_json::json!({"message": "coupon removed"})).into_response(),
        Ok(None) => errors::domain_error_to_response(DomainError::NotFound),
        Err(e) => errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string()),
    }
}

/// Check a code at checkout. Unknown or deactivated codes both read as
/// "invalid or expired" so the response never reveals which.
pub async fn validate_coupon(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::ValidateCouponRequest>,
) -> axum::response::Response {
    let normalized = normalize_code(&body.code);

    let coupon = match services.db.coupon_by_code(&normalized) {
        Ok(coupon) => coupon,
        Err(e) => {
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
    };

    match coupon {
        Some(coupon) if coupon.is_redeemable() => Json(serde_json::json!({
            "code": coupon.code,
            "discount_percentage": coupon.discount_percentage,
        }))
        .into_response(),
        _ => errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "invalid or expired coupon",
        ),
    }
}
