//! User administration endpoints.
//!
//! Listing and inspecting accounts is admin-only; users reach their own
//! record through `/profile`.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use store_core::{validation, PaymentMethod, Role, User};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;

/// A user as clients see it. The password hash never leaves the server.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub location: String,
    pub role: Role,
    pub payment_method: PaymentMethod,
    pub is_verified: bool,
    pub joined_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            location: user.location,
            role: user.role,
            payment_method: user.payment_method,
            is_verified: user.is_verified,
            joined_at: user.joined_at,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

/// GET /users - list all accounts (admin).
async fn list_users(
    auth: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    auth.require_admin()?;

    let users = state.db.users().list().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /users/{id} - fetch one account (admin, or the account itself).
async fn get_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    if auth.user_id != id {
        auth.require_admin()?;
    }

    let user = state.db.users().get_by_id(&id).await?;
    Ok(Json(user.into()))
}

#[derive(Debug, Deserialize)]
pub struct AdminUpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub role: Option<Role>,
    pub payment_method: Option<PaymentMethod>,
    pub is_verified: Option<bool>,
}

/// PUT /users/{id} - update an account (admin).
///
/// Only fields present in the request change; uniqueness of username and
/// email is re-checked by the schema.
async fn update_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AdminUpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    auth.require_admin()?;

    let mut user = state.db.users().get_by_id(&id).await?;

    if let Some(username) = req.username {
        validation::validate_username(&username)?;
        user.username = username.trim().to_string();
    }
    if let Some(email) = req.email {
        validation::validate_email(&email)?;
        user.email = email.trim().to_lowercase();
    }
    if let Some(location) = req.location {
        user.location = location;
    }
    if let Some(role) = req.role {
        user.role = role;
    }
    if let Some(payment_method) = req.payment_method {
        user.payment_method = payment_method;
    }
    if let Some(is_verified) = req.is_verified {
        user.is_verified = is_verified;
    }

    state.db.users().update(&user).await?;

    Ok(Json(user.into()))
}

/// DELETE /users/{id} - remove an account (admin).
async fn delete_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    auth.require_admin()?;

    state.db.users().delete(&id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
