use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use nilecart_auth::User;
use nilecart_core::DomainError;

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/profile", get(get_profile).put(update_profile))
}

pub async fn get_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.db.user(&principal.user_id()) {
        Ok(Some(user)) => Json(user).into_response(),
        Ok(None) => errors::domain_error_to_response(DomainError::NotFound),
        Err(e) => errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string()),
    }
}

/// Upsert the requester's stored profile. The id and role always come from
/// the token, never from the body.
pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::UpdateProfileRequest>,
) -> axum::response::Response {
    let user = User {
        id: principal.user_id(),
        first_name: body.first_name,
        last_name: body.last_name,
        email: body.email,
        role: principal.role(),
        phone_number: body.phone_number,
        country_code: body.country_code,
    };

    match services.db.upsert_user(user.clone()) {
        Ok(()) => Json(user).into_response(),
        Err(e) => errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string()),
    }
}
