use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use chrono::Utc;

use nilecart_catalog::{Slide, SlideId};
use nilecart_core::DomainError;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_slides).post(create_slide))
        .route("/:id", delete(delete_slide))
}

/// Landing-page carousel slides, oldest first.
pub async fn list_slides(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.db.list_slides() {
        Ok(slides) => Json(slides).into_response(),
        Err(e) => errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string()),
    }
}

/// Admin: add a slide.
pub async fn create_slide(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateSlideRequest>,
) -> axum::response::Response {
    if !principal.is_admin() {
        return errors::forbidden();
    }

    let slide = match Slide::new(body.image, body.title, body.description, Utc::now()) {
        Ok(slide) => slide,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.db.insert_slide(slide.clone()) {
        Ok(()) => (StatusCode::CREATED, Json(slide)).into_response(),
        Err(e) => errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string()),
    }
}

/// Admin: remove a slide.
pub async fn delete_slide(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if !principal.is_admin() {
        return errors::forbidden();
    }

    let slide_id: SlideId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid slide id"),
    };

    match services.db.remove_slide(&slide_id) {
        Ok(Some(_)) => Json(serde_json::json!({"message": "slide removed"})).into_response(),
        Ok(None) => errors::domain_error_to_response(DomainError::NotFound),
        Err(e) => errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string()),
    }
}
