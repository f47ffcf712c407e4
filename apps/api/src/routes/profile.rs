//! The authenticated user's own profile.

use axum::extract::State;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;

use store_core::{validation, PaymentMethod};

use crate::auth::{hash_password, verify_password, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::routes::users::UserResponse;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/profile/password", put(change_password))
}

/// GET /profile - the authenticated user's record.
async fn get_profile(
    auth: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<UserResponse>> {
    let user = state.db.users().get_by_id(&auth.user_id).await?;
    Ok(Json(user.into()))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub location: Option<String>,
    pub payment_method: Option<PaymentMethod>,
}

/// PUT /profile - update mutable profile fields.
///
/// Email and role are not changeable here; only the fields present in the
/// request are touched.
async fn update_profile(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<UserResponse>> {
    let mut user = state.db.users().get_by_id(&auth.user_id).await?;

    if let Some(username) = req.username {
        validation::validate_username(&username)?;
        user.username = username.trim().to_string();
    }
    if let Some(location) = req.location {
        user.location = location;
    }
    if let Some(payment_method) = req.payment_method {
        user.payment_method = payment_method;
    }

    state.db.users().update(&user).await?;

    Ok(Json(user.into()))
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// PUT /profile/password - rotate the password.
async fn change_password(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    validation::validate_password(&req.new_password)?;

    let mut user = state.db.users().get_by_id(&auth.user_id).await?;

    if !verify_password(&req.current_password, &user.password_hash) {
        return Err(ApiError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    user.password_hash = hash_password(&req.new_password)?;
    state.db.users().update(&user).await?;

    Ok(Json(serde_json::json!({ "updated": true })))
}
