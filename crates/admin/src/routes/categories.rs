//! Category management route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
};
use tracing::instrument;

use atelier_core::CategoryId;

use crate::{
    authz,
    db::CategoryRepository,
    error::Result,
    middleware::OptionalPrincipal,
    models::Category,
    routes::response::ActionResponse,
    state::AppState,
    validate::{self, CategoryInput},
};

const GATE: &str = "categories.view";

/// Build the category router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index).post(store))
        .route("/{id}", patch(update).delete(destroy))
}

/// List all categories.
#[instrument(skip(principal, state))]
pub async fn index(
    OptionalPrincipal(principal): OptionalPrincipal,
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>> {
    authz::authorize_admin(principal.as_ref(), GATE)?;

    let repo = CategoryRepository::new(state.pool());
    Ok(Json(repo.list_all().await?))
}

/// Create a category.
#[instrument(skip(principal, state, input))]
pub async fn store(
    OptionalPrincipal(principal): OptionalPrincipal,
    State(state): State<AppState>,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, Json<ActionResponse<Category>>)> {
    authz::authorize_admin(principal.as_ref(), GATE)?;

    let repo = CategoryRepository::new(state.pool());
    let valid = validate::category::validate(&repo, &input, None).await?;
    let category = repo.create(&valid.name, &valid.slug).await?;

    tracing::info!(category_id = %category.id, "category created");

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::created("Category", category)),
    ))
}

/// Update a category.
#[instrument(skip(principal, state, input))]
pub async fn update(
    OptionalPrincipal(principal): OptionalPrincipal,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<ActionResponse<Category>>> {
    authz::authorize_admin(principal.as_ref(), GATE)?;

    let repo = CategoryRepository::new(state.pool());
    let valid = validate::category::validate(&repo, &input, Some(id)).await?;
    let category = repo.update(id, &valid.name, &valid.slug).await?;

    Ok(Json(ActionResponse::updated("Category", category)))
}

/// Delete a category. Refused while it still owns products.
#[instrument(skip(principal, state))]
pub async fn destroy(
    OptionalPrincipal(principal): OptionalPrincipal,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<ActionResponse<()>>> {
    authz::authorize_admin(principal.as_ref(), GATE)?;

    let repo = CategoryRepository::new(state.pool());
    repo.delete(id).await?;

    Ok(Json(ActionResponse::deleted("Category")))
}
