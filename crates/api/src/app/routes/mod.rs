use axum::Router;

pub mod coupons;
pub mod orders;
pub mod products;
pub mod slides;
pub mod system;
pub mod users;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/orders", orders::router())
        .nest("/products", products::router())
        .nest("/coupons", coupons::router())
        .nest("/slides", slides::router())
        .nest("/users", users::router())
}
