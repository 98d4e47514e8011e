//! Landing page handler.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::db::CategoryRepository;
use crate::error::Result;
use crate::models::Category;
use crate::state::AppState;

/// Landing page payload.
#[derive(Debug, Serialize)]
pub struct HomePage {
    pub categories: Vec<Category>,
}

/// Public landing page.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Result<Json<HomePage>> {
    let repo = CategoryRepository::new(state.pool());
    let categories = repo.list_all().await?;

    Ok(Json(HomePage { categories }))
}
