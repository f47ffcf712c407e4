//! Registration and login.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use store_core::{validation, PaymentMethod, Role, User};

use crate::auth::{hash_password, verify_password};
use crate::error::{ApiError, ApiResult};
use crate::routes::users::UserResponse;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub location: String,
    /// Role is accepted at registration to keep bootstrap simple; the
    /// first admin is created this way.
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/register - create an account and return a token.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    validation::validate_username(&req.username)?;
    validation::validate_email(&req.email)?;
    validation::validate_password(&req.password)?;

    let user = User {
        id: Uuid::new_v4().to_string(),
        username: req.username.trim().to_string(),
        email: req.email.trim().to_lowercase(),
        password_hash: hash_password(&req.password)?,
        location: req.location,
        role: req.role,
        payment_method: req.payment_method,
        is_verified: false,
        joined_at: Utc::now(),
    };

    state.db.users().insert(&user).await?;

    info!(user_id = %user.id, username = %user.username, "User registered");

    let token = state.jwt.issue(&user.id, user.role)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// POST /auth/login - exchange credentials for a token.
///
/// Unknown email and wrong password produce the same 401, so the endpoint
/// doesn't reveal which accounts exist.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let email = req.email.trim().to_lowercase();

    let user = state
        .db
        .users()
        .get_by_email(&email)
        .await?
        .filter(|user| verify_password(&req.password, &user.password_hash))
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    info!(user_id = %user.id, "User logged in");

    let token = state.jwt.issue(&user.id, user.role)?;

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}
