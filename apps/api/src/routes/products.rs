//! Product catalog endpoints. Reads are public, writes are admin-only.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use store_core::{validation, Product, DEFAULT_PAGE_SIZE};
use store_db::ProductQuery;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/low-stock", get(low_stock))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub category_id: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

/// GET /products?category_id=&search=&page=&page_size=
async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<ProductListResponse>> {
    let page = state
        .db
        .products()
        .list(&ProductQuery {
            category_id: params.category_id,
            search: params.search,
            page: params.page.unwrap_or(1),
            page_size: params.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        })
        .await?;

    Ok(Json(ProductListResponse {
        products: page.products,
        total: page.total,
        page: page.page,
        page_size: page.page_size,
    }))
}

/// GET /products/{id}
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.db.products().get_by_id(&id).await?))
}

#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock: i64,
    #[serde(default)]
    pub min_stock_level: i64,
    pub category_id: Option<String>,
}

/// POST /products (admin)
async fn create_product(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ProductRequest>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    auth.require_admin()?;
    validation::validate_name(&req.name)?;
    validation::validate_price_cents(req.price_cents)?;
    validation::validate_stock(req.stock)?;

    // A dangling category id should fail loudly, not via a bare FK error.
    if let Some(category_id) = &req.category_id {
        state.db.categories().get_by_id(category_id).await?;
    }

    let now = Utc::now();
    let product = Product {
        id: Uuid::new_v4().to_string(),
        name: req.name.trim().to_string(),
        description: req.description,
        price_cents: req.price_cents,
        stock: req.stock,
        min_stock_level: req.min_stock_level,
        category_id: req.category_id,
        created_at: now,
        updated_at: now,
    };

    state.db.products().insert(&product).await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /products/{id} (admin)
async fn update_product(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ProductRequest>,
) -> ApiResult<Json<Product>> {
    auth.require_admin()?;
    validation::validate_name(&req.name)?;
    validation::validate_price_cents(req.price_cents)?;
    validation::validate_stock(req.stock)?;

    if let Some(category_id) = &req.category_id {
        state.db.categories().get_by_id(category_id).await?;
    }

    let mut product = state.db.products().get_by_id(&id).await?;
    product.name = req.name.trim().to_string();
    product.description = req.description;
    product.price_cents = req.price_cents;
    product.stock = req.stock;
    product.min_stock_level = req.min_stock_level;
    product.category_id = req.category_id;
    product.updated_at = Utc::now();

    state.db.products().update(&product).await?;

    Ok(Json(product))
}

/// DELETE /products/{id} (admin)
async fn delete_product(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    auth.require_admin()?;

    state.db.products().delete(&id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}

/// GET /products/low-stock (admin) - products at or below their threshold.
async fn low_stock(
    auth: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Product>>> {
    auth.require_admin()?;

    Ok(Json(state.db.products().low_stock().await?))
}
