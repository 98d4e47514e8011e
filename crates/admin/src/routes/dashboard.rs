//! Dashboard route handler.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::{
    authz,
    db::{CategoryRepository, ProductRepository, RoleRepository, UserRepository},
    error::Result,
    middleware::OptionalPrincipal,
    state::AppState,
};

const GATE: &str = "admin.access";

/// Entity counts shown on the admin landing page.
#[derive(Debug, Serialize)]
pub struct DashboardCounts {
    pub users: i64,
    pub roles: i64,
    pub categories: i64,
    pub products: i64,
}

/// Dashboard overview.
#[instrument(skip(principal, state))]
pub async fn index(
    OptionalPrincipal(principal): OptionalPrincipal,
    State(state): State<AppState>,
) -> Result<Json<DashboardCounts>> {
    authz::authorize_admin(principal.as_ref(), GATE)?;

    let pool = state.pool();
    let counts = DashboardCounts {
        users: UserRepository::new(pool).count().await?,
        roles: RoleRepository::new(pool).count().await?,
        categories: CategoryRepository::new(pool).count().await?,
        products: ProductRepository::new(pool).count().await?,
    };

    Ok(Json(counts))
}
