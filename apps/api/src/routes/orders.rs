//! Order endpoints: checkout and order history.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use store_core::{Order, OrderItem};
use store_db::CheckoutOutcome;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(checkout))
        .route("/orders/all", get(list_all_orders))
        .route("/orders/{id}", get(get_order))
}

/// POST /orders - convert the user's cart into an order.
///
/// Fails with 400 on an empty cart and 409 when stock ran out; either way
/// nothing is changed.
async fn checkout(
    auth: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<CheckoutOutcome>)> {
    let outcome = state.db.orders().checkout(&auth.user_id).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// GET /orders - the user's own orders, newest first.
async fn list_orders(auth: AuthUser, State(state): State<AppState>) -> ApiResult<Json<Vec<Order>>> {
    Ok(Json(state.db.orders().list_for_user(&auth.user_id).await?))
}

/// GET /orders/all (admin) - every order in the system.
async fn list_all_orders(
    auth: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Order>>> {
    auth.require_admin()?;
    Ok(Json(state.db.orders().list_all().await?))
}

#[derive(Debug, Serialize)]
pub struct OrderDetailResponse {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// GET /orders/{id} - one order with its line items.
///
/// Owners see their own orders; admins see any. Everyone else gets a 403.
async fn get_order(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<OrderDetailResponse>> {
    let order = state.db.orders().get_by_id(&id).await?;

    if order.user_id != auth.user_id && !auth.role.is_admin() {
        return Err(ApiError::Forbidden(
            "Not authorized to access this order".to_string(),
        ));
    }

    let items = state.db.orders().items(&order.id).await?;

    Ok(Json(OrderDetailResponse { order, items }))
}
