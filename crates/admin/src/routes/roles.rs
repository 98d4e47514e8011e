//! Role management route handlers.
//!
//! Permission sync is full-replace: an update carrying `permissions: P`
//! leaves the role with exactly P. System roles ("admin", "user") are
//! protected from deletion.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
};
use serde::Serialize;
use tracing::instrument;

use atelier_core::{PermissionName, RoleId};

use crate::{
    authz,
    db::RoleRepository,
    error::{AppError, Result},
    middleware::OptionalPrincipal,
    models::{Role, RoleWithAccess},
    routes::response::ActionResponse,
    state::AppState,
    validate::{self, RoleInput},
};

const GATE: &str = "roles.view";

/// Build the role router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index).post(store))
        .route("/{id}", patch(update).delete(destroy))
}

/// Payload for the role listing: roles with their access, plus the full
/// permission catalog for assignment pickers.
#[derive(Debug, Serialize)]
pub struct RolesIndex {
    pub roles: Vec<RoleWithAccess>,
    pub permissions: Vec<PermissionName>,
}

/// List all roles with permissions and user counts.
#[instrument(skip(principal, state))]
pub async fn index(
    OptionalPrincipal(principal): OptionalPrincipal,
    State(state): State<AppState>,
) -> Result<Json<RolesIndex>> {
    authz::authorize_admin(principal.as_ref(), GATE)?;

    let repo = RoleRepository::new(state.pool());
    let roles = repo.list_all().await?;
    let permissions = repo
        .list_permissions()
        .await?
        .into_iter()
        .map(|p| p.name)
        .collect();

    Ok(Json(RolesIndex { roles, permissions }))
}

/// Create a role, optionally granting an initial permission set.
#[instrument(skip(principal, state, input))]
pub async fn store(
    OptionalPrincipal(principal): OptionalPrincipal,
    State(state): State<AppState>,
    Json(input): Json<RoleInput>,
) -> Result<(StatusCode, Json<ActionResponse<Role>>)> {
    authz::authorize_admin(principal.as_ref(), GATE)?;

    let repo = RoleRepository::new(state.pool());
    let valid = validate::role::validate(&repo, &input, None).await?;
    let role = repo
        .create(&valid.name, valid.permissions.as_deref())
        .await?;

    tracing::info!(role_id = %role.id, "role created");

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::created("Role", role)),
    ))
}

/// Update a role. A present `permissions` list full-replaces the role's set;
/// an omitted list leaves it untouched.
#[instrument(skip(principal, state, input))]
pub async fn update(
    OptionalPrincipal(principal): OptionalPrincipal,
    State(state): State<AppState>,
    Path(id): Path<RoleId>,
    Json(input): Json<RoleInput>,
) -> Result<Json<ActionResponse<Role>>> {
    authz::authorize_admin(principal.as_ref(), GATE)?;

    let repo = RoleRepository::new(state.pool());
    let valid = validate::role::validate(&repo, &input, Some(id)).await?;
    let role = repo
        .update(id, &valid.name, valid.permissions.as_deref())
        .await?;

    Ok(Json(ActionResponse::updated("Role", role)))
}

/// Delete a role. System roles are refused without side effects.
#[instrument(skip(principal, state))]
pub async fn destroy(
    OptionalPrincipal(principal): OptionalPrincipal,
    State(state): State<AppState>,
    Path(id): Path<RoleId>,
) -> Result<Json<ActionResponse<()>>> {
    authz::authorize_admin(principal.as_ref(), GATE)?;

    let repo = RoleRepository::new(state.pool());
    let role = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("role {id} does not exist")))?;

    if role.is_system() {
        return Err(AppError::Conflict(
            "System roles cannot be deleted.".to_owned(),
        ));
    }

    repo.delete(id).await?;

    Ok(Json(ActionResponse::deleted("Role")))
}
