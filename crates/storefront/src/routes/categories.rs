//! Public category page handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use crate::db::CategoryRepository;
use crate::error::{AppError, Result};
use crate::models::{Category, CategoryPage};
use crate::state::AppState;

/// Public category listing.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let repo = CategoryRepository::new(state.pool());
    Ok(Json(repo.list_all().await?))
}

/// Single category lookup by slug, with its active products.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CategoryPage>> {
    let repo = CategoryRepository::new(state.pool());
    let page = repo
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no category with slug {slug}")))?;

    Ok(Json(page))
}
