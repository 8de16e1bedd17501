use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use nilecart_catalog::{Product, ProductId, ProductUpdate, SaleTerms};
use nilecart_core::DomainError;

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/top", get(top_products))
        .route("/:id", get(get_product).put(update_product).delete(delete_product))
        .route("/:id/sale", put(set_sale))
        .route("/:id/reviews", post(create_review))
}

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub keyword: Option<String>,
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ProductQuery>,
) -> axum::response::Response {
    match services.db.list_products(query.keyword.as_deref()) {
        Ok(products) => Json(products).into_response(),
        Err(e) => errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string()),
    }
}

pub async fn top_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.db.top_products(5) {
        Ok(products) => Json(products).into_response(),
        Err(e) => errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string()),
    }
}

/// Admin: add a catalog product.
pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateProductRequest>,
) -> axum::response::Response {
    if !principal.is_admin() {
        return errors::forbidden();
    }
    if body.price < rust_decimal::Decimal::ZERO {
        return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "price must not be negative");
    }

    let mut product = Product::new(
        body.name,
        body.description.unwrap_or_default(),
        body.image.unwrap_or_default(),
        body.price,
        body.count_in_stock,
        Utc::now(),
    );
    if let Some(sizes) = body.sizes {
        product.sizes = sizes;
    }
    if let Some(colors) = body.colors {
        product.colors = colors;
    }

    match services.db.upsert_product(product.clone()) {
        Ok(()) => (StatusCode::CREATED, Json(product)).into_response(),
        Err(e) => errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string()),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let product_id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id"),
    };

    match services.db.product(&product_id) {
        Ok(Some(product)) => Json(product).into_response(),
        Ok(None) => errors::domain_error_to_response(DomainError::NotFound),
        Err(e) => errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string()),
    }
}

/// Admin: partial product update.
pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(update): Json<ProductUpdate>,
) -> axum::response::Response {
    if !principal.is_admin() {
        return errors::forbidden();
    }
    mutate_product(&services, &id, |product| product.apply_update(update))
}

/// Admin: remove a product.
pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if !principal.is_admin() {
        return errors::forbidden();
    }

    let product_id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id"),
    };

    match services.db.remove_product(&product_id) {
        Ok(Some(_)) => Json(serde_json::json!({"message": "product removed"})).into_response(),
        Ok(None) => errors::domain_error_to_response(DomainError::NotFound),
        Err(e) => errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string()),
    }
}

/// Admin: replace the sale terms (resets the sold counter).
pub async fn set_sale(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(terms): Json<SaleTerms>,
) -> axum::response::Response {
    if !principal.is_admin() {
        return errors::forbidden();
    }
    mutate_product(&services, &id, |product| product.set_sale(terms))
}

pub async fn create_review(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::CreateReviewRequest>,
) -> axum::response::Response {
    // Reviewer display name comes from the stored profile, never the body.
    let reviewer_name = match services.db.user(&principal.user_id()) {
        Ok(Some(user)) => user.full_name(),
        Ok(None) => "Customer".to_string(),
        Err(e) => {
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
    };

    mutate_product(&services, &id, |product| {
        product.add_review(principal.user_id(), reviewer_name, body.rating, body.comment, Utc::now())
    })
}

/// Parse the id, apply `f` to the stored product under the write lock, and
/// return the updated product.
fn mutate_product(
    services: &AppServices,
    id: &str,
    f: impl FnOnce(&mut Product) -> Result<(), DomainError>,
) -> axum::response::Response {
    let product_id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id"),
    };

    let result = services.db.write(|state| -> Result<Product, DomainError> {
        let product = state.products.get_mut(&product_id).ok_or(DomainError::NotFound)?;
        f(product)?;
        Ok(product.clone())
    });

    match result {
        Ok(Ok(product)) => Json(product).into_response(),
        Ok(Err(e)) => errors::domain_error_to_response(e),
        Err(e) => errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string()),
    }
}
