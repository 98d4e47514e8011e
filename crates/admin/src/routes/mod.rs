//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! All routes below are nested under `/admin` by the binary and gated
//! authenticated -> verified -> permission, in that order, before validation
//! and before any mutation.
//!
//! ```text
//! GET    /                          - Dashboard counts        (admin.access)
//!
//! GET    /categories                - List categories         (categories.view)
//! POST   /categories                - Create category         (categories.view)
//! PATCH  /categories/{id}           - Update category         (categories.view)
//! DELETE /categories/{id}           - Delete category         (categories.view)
//!
//! GET    /users                     - List users with roles   (users.view)
//! POST   /users                     - Create user             (users.view)
//! PATCH  /users/{id}                - Update user             (users.view)
//! DELETE /users/{id}                - Delete user             (users.view)
//!
//! GET    /products                  - List products + images  (products.view)
//! POST   /products                  - Create product          (products.view)
//! PATCH  /products/{id}             - Update product          (products.view)
//! DELETE /products/{id}             - Delete product          (products.view)
//! POST   /products/{id}/images      - Attach image            (products.view)
//! PATCH  /products/{id}/images/{image_id}/main - Set main image (products.view)
//! DELETE /products/{id}/images/{image_id}      - Delete image   (products.view)
//!
//! GET    /roles                     - List roles + permissions (roles.view)
//! POST   /roles                     - Create role              (roles.view)
//! PATCH  /roles/{id}                - Update role (full-replace permission sync) (roles.view)
//! DELETE /roles/{id}                - Delete role (system roles refused)         (roles.view)
//! ```

pub mod categories;
pub mod dashboard;
pub mod products;
pub mod response;
pub mod roles;
pub mod users;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Create all admin routes (mounted under `/admin` by the binary).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .nest("/categories", categories::router())
        .nest("/users", users::router())
        .nest("/products", products::router())
        .nest("/roles", roles::router())
}
