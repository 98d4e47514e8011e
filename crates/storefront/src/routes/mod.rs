//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                  - Landing payload (featured categories)
//! GET  /categories        - Category listing
//! GET  /categories/{slug} - Single category with active products (404 on miss)
//! GET  /health            - Health check
//! ```
//!
//! Everything here is public and read-only; mutations live in the admin
//! binary behind its permission gates.

pub mod categories;
pub mod home;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/categories", get(categories::index))
        .route("/categories/{slug}", get(categories::show))
}
