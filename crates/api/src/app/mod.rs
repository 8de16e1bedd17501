//! Axum application wiring.
//!
//! `services.rs` holds the store + workflow shared by every handler,
//! `routes/` has one file per domain area, `dto.rs` the request/response
//! shapes, and `errors.rs` the error-to-status mapping.

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(jwt_secret: String, services: Arc<AppServices>) -> Router {
    let jwt = Arc::new(nilecart_auth::Hs256JwtValidator::new(jwt_secret));
    let auth_state = middleware::AuthState { jwt };

    // Protected routes: require a valid bearer token.
    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new())
}
