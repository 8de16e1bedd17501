use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};

use nilecart_orders::{OrderDraft, OrderId, OrderStatus, PaymentResult};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(place_order).get(list_orders))
        .route("/myorders", get(my_orders))
        .route("/analytics", get(analytics))
        .route("/:id", get(get_order))
        .route("/:id/pay", put(pay_order))
        .route("/:id/status", put(update_status))
        .route("/:id/cancel", post(request_cancellation))
}

pub async fn place_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(draft): Json<OrderDraft>,
) -> axum::response::Response {
    match services.workflow.place_order(principal.user_id(), draft) {
        Ok(order) => (StatusCode::CREATED, Json(order)).into_response(),
        Err(e) => errors::workflow_error_to_response(e),
    }
}

/// Admin: all orders, oldest first.
pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if !principal.is_admin() {
        return errors::forbidden();
    }
    match services.workflow.list_orders() {
        Ok(orders) => Json(orders).into_response(),
        Err(e) => errors::workflow_error_to_response(e),
    }
}

pub async fn my_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.workflow.list_orders_for(principal.user_id()) {
        Ok(orders) => Json(orders).into_response(),
        Err(e) => errors::workflow_error_to_response(e),
    }
}

/// Admin: dashboard statistics.
pub async fn analytics(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if !principal.is_admin() {
        return errors::forbidden();
    }
    match services.workflow.analytics() {
        Ok(report) => Json(report).into_response(),
        Err(e) => errors::workflow_error_to_response(e),
    }
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let order_id: OrderId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid order id"),
    };

    let order = match services.workflow.get_order(&order_id) {
        Ok(order) => order,
        Err(e) => return errors::workflow_error_to_response(e),
    };

    let user = match services.db.user(&order.user_id) {
        Ok(user) => user.map(|u| dto::BuyerSummary { name: u.full_name(), email: u.email }),
        Err(_) => None,
    };

    Json(dto::OrderWithBuyer { order, user }).into_response()
}

pub async fn pay_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(result): Json<PaymentResult>,
) -> axum::response::Response {
    let order_id: OrderId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid order id"),
    };

    match services.workflow.mark_paid(&order_id, result) {
        Ok(order) => Json(order).into_response(),
        Err(e) => errors::workflow_error_to_response(e),
    }
}

/// Admin: drive the order state machine.
pub async fn update_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateStatusRequest>,
) -> axum::response::Response {
    if !principal.is_admin() {
        return errors::forbidden();
    }

    let order_id: OrderId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid order id"),
    };

    let status: OrderStatus = match body.status.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.workflow.update_status(&order_id, status) {
        Ok(order) => Json(order).into_response(),
        Err(e) => errors::workflow_error_to_response(e),
    }
}

pub async fn request_cancellation(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let order_id: OrderId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid order id"),
    };

    match services.workflow.request_cancellation(&order_id, principal.user_id(), principal.role()) {
        Ok(()) => Json(serde_json::json!({
            "message": "cancellation request submitted"
        }))
        .into_response(),
        Err(e) => errors::workflow_error_to_response(e),
    }
}
