//! # Storefront API
//!
//! Axum HTTP server for the storefront backend.
//!
//! ## Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  routes/   - one module per resource, thin handlers         │
//! │  auth      - JWT + Argon2, AuthUser extractor               │
//! │  error     - ApiError → HTTP status + {"error": msg}        │
//! │  config    - environment variables                          │
//! └──────────────────────────┬──────────────────────────────────┘
//!                            │
//!                    store-db / store-core
//! ```
//!
//! Handlers never contain business logic: they validate input, call a
//! repository, and shape the response.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use store_db::Database;

use crate::auth::JwtManager;
use crate::config::Config;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: JwtManager,
}

impl AppState {
    pub fn new(db: Database, config: &Config) -> Self {
        AppState {
            db,
            jwt: JwtManager::new(&config.jwt_secret, config.jwt_ttl_secs),
        }
    }
}

/// Builds the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::auth::router())
        .merge(routes::users::router())
        .merge(routes::profile::router())
        .merge(routes::categories::router())
        .merge(routes::products::router())
        .merge(routes::cart::router())
        .merge(routes::orders::router())
        .merge(routes::payments::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
