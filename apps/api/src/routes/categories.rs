//! Category catalog endpoints. Reads are public, writes are admin-only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use store_core::{validation, Category};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
}

/// GET /categories
async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.db.categories().list().await?))
}

/// GET /categories/{id}
async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Category>> {
    Ok(Json(state.db.categories().get_by_id(&id).await?))
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

/// POST /categories (admin)
async fn create_category(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CategoryRequest>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    auth.require_admin()?;
    validation::validate_name(&req.name)?;

    let category = Category {
        id: Uuid::new_v4().to_string(),
        name: req.name.trim().to_string(),
        description: req.description,
    };

    state.db.categories().insert(&category).await?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /categories/{id} (admin)
async fn update_category(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CategoryRequest>,
) -> ApiResult<Json<Category>> {
    auth.require_admin()?;
    validation::validate_name(&req.name)?;

    let mut category = state.db.categories().get_by_id(&id).await?;
    category.name = req.name.trim().to_string();
    category.description = req.description;

    state.db.categories().update(&category).await?;

    Ok(Json(category))
}

/// DELETE /categories/{id} (admin)
async fn delete_category(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    auth.require_admin()?;

    state.db.categories().delete(&id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
