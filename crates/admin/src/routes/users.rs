//! User management route handlers.
//!
//! Plaintext passwords are hashed before persistence; an omitted or empty
//! password on update leaves the stored digest untouched.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
};
use tracing::instrument;

use atelier_core::UserId;

use crate::{
    authz,
    db::UserRepository,
    error::Result,
    middleware::OptionalPrincipal,
    models::{User, UserWithRoles},
    routes::response::ActionResponse,
    services::password,
    state::AppState,
    validate::{self, UserInput},
};

const GATE: &str = "users.view";

/// Build the user router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index).post(store))
        .route("/{id}", patch(update).delete(destroy))
}

/// List all users with their assigned roles.
#[instrument(skip(principal, state))]
pub async fn index(
    OptionalPrincipal(principal): OptionalPrincipal,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserWithRoles>>> {
    authz::authorize_admin(principal.as_ref(), GATE)?;

    let repo = UserRepository::new(state.pool());
    Ok(Json(repo.list_all().await?))
}

/// Create a user.
#[instrument(skip(principal, state, input))]
pub async fn store(
    OptionalPrincipal(principal): OptionalPrincipal,
    State(state): State<AppState>,
    Json(input): Json<UserInput>,
) -> Result<(StatusCode, Json<ActionResponse<User>>)> {
    authz::authorize_admin(principal.as_ref(), GATE)?;

    let repo = UserRepository::new(state.pool());
    let valid = validate::user::validate_create(&repo, &input).await?;

    let digest = password::hash_password(&valid.password)?;
    let user = repo
        .create(&valid.name, &valid.email, &digest, valid.role.as_deref())
        .await?;

    tracing::info!(user_id = %user.id, "user created");

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::created("User", user)),
    ))
}

/// Update a user, full-replacing their role assignment.
#[instrument(skip(principal, state, input))]
pub async fn update(
    OptionalPrincipal(principal): OptionalPrincipal,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(input): Json<UserInput>,
) -> Result<Json<ActionResponse<User>>> {
    authz::authorize_admin(principal.as_ref(), GATE)?;

    let repo = UserRepository::new(state.pool());
    let valid = validate::user::validate_update(&repo, &input, id).await?;

    // None keeps the stored digest unchanged
    let digest = valid
        .password
        .as_ref()
        .map(password::hash_password)
        .transpose()?;

    let user = repo
        .update(id, &valid.name, &valid.email, digest.as_deref(), &valid.role)
        .await?;

    Ok(Json(ActionResponse::updated("User", user)))
}

/// Delete a user.
#[instrument(skip(principal, state))]
pub async fn destroy(
    OptionalPrincipal(principal): OptionalPrincipal,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<ActionResponse<()>>> {
    authz::authorize_admin(principal.as_ref(), GATE)?;

    let repo = UserRepository::new(state.pool());
    repo.delete(id).await?;

    Ok(Json(ActionResponse::deleted("User")))
}
