//! Cart endpoints. All cart state belongs to the authenticated user; the
//! cart itself is created lazily on first access.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use serde::Deserialize;

use store_core::CartItem;
use store_db::CartView;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cart", get(get_cart).post(add_item).delete(clear_cart))
        .route("/cart/items/{id}", put(update_item))
        .route("/cart/items/{id}/remove", delete(remove_item))
}

/// GET /cart - the user's cart with lines and running total.
async fn get_cart(auth: AuthUser, State(state): State<AppState>) -> ApiResult<Json<CartView>> {
    Ok(Json(state.db.carts().view(&auth.user_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    pub quantity: i64,
}

/// POST /cart - add a product; repeated adds merge into one line.
async fn add_item(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AddItemRequest>,
) -> ApiResult<(StatusCode, Json<CartItem>)> {
    let item = state
        .db
        .carts()
        .add_item(&auth.user_id, &req.product_id, req.quantity)
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i64,
}

/// PUT /cart/items/{id} - set a line to an absolute quantity; below 1
/// deletes the line.
async fn update_item(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateItemRequest>,
) -> ApiResult<Json<CartView>> {
    state
        .db
        .carts()
        .update_item(&auth.user_id, &id, req.quantity)
        .await?;

    Ok(Json(state.db.carts().view(&auth.user_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct RemoveItemRequest {
    pub quantity: i64,
}

/// DELETE /cart/items/{id}/remove - remove units from a line. Removing
/// exactly what the line holds deletes it; removing more fails.
async fn remove_item(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RemoveItemRequest>,
) -> ApiResult<Json<CartView>> {
    state
        .db
        .carts()
        .remove_item(&auth.user_id, &id, req.quantity)
        .await?;

    Ok(Json(state.db.carts().view(&auth.user_id).await?))
}

/// DELETE /cart - drop every line.
async fn clear_cart(auth: AuthUser, State(state): State<AppState>) -> ApiResult<Json<CartView>> {
    state.db.carts().clear(&auth.user_id).await?;
    Ok(Json(state.db.carts().view(&auth.user_id).await?))
}
