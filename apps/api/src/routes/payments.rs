//! Payment settlement and invoice endpoints.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use store_core::{Invoice, Payment, PaymentMethod};
use store_db::SettlementOutcome;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders/{id}/payments", post(settle).get(get_payment))
        .route("/orders/{id}/invoice", get(get_invoice))
}

#[derive(Debug, Deserialize, Default)]
pub struct SettleRequest {
    /// Falls back to the user's preferred method when omitted.
    pub method: Option<PaymentMethod>,
}

/// POST /orders/{id}/payments - settle payment for an order.
///
/// Idempotent: settling an already-settled order returns the original
/// payment and invoice with a 200 rather than an error.
async fn settle(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SettleRequest>,
) -> ApiResult<Json<SettlementOutcome>> {
    let order = state.db.orders().get_by_id(&id).await?;
    authorize(&auth, &order.user_id)?;

    let method = match req.method {
        Some(method) => method,
        None => state.db.users().get_by_id(&auth.user_id).await?.payment_method,
    };

    let outcome = state.db.payments().settle(&id, method).await?;
    Ok(Json(outcome))
}

/// GET /orders/{id}/payments - the payment for an order, if any.
async fn get_payment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Payment>> {
    let order = state.db.orders().get_by_id(&id).await?;
    authorize(&auth, &order.user_id)?;

    state
        .db
        .payments()
        .get_by_order(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No payment for order: {id}")))
}

/// GET /orders/{id}/invoice - the invoice issued at settlement.
async fn get_invoice(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Invoice>> {
    let order = state.db.orders().get_by_id(&id).await?;
    authorize(&auth, &order.user_id)?;

    Ok(Json(state.db.payments().invoice_for_order(&id).await?))
}

/// Owners and admins only; everyone else gets a 403.
fn authorize(auth: &AuthUser, owner_id: &str) -> Result<(), ApiError> {
    if owner_id != auth.user_id && !auth.role.is_admin() {
        return Err(ApiError::Forbidden(
            "Not authorized to access this order".to_string(),
        ));
    }
    Ok(())
}
