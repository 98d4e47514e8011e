//! Principal extraction for admin route handlers.
//!
//! The extractor only resolves WHO is making the request; deciding what they
//! may do is [`crate::authz::authorize`], which every handler calls
//! explicitly. Roles and permissions are loaded fresh from the database per
//! request, so an access change takes effect on the very next call.
//!
//! Identity sources, in order:
//!
//! 1. The session (`current_user_id`), populated by the external login flow.
//! 2. The `X-Atelier-User-Id` header, only when
//!    `ADMIN_TRUST_IDENTITY_HEADER` is enabled - for deployments where an
//!    authenticating reverse proxy fronts the admin and asserts identity.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use atelier_core::UserId;

use crate::db::UserRepository;
use crate::error::AppError;
use crate::models::{Principal, session_keys};
use crate::state::AppState;

/// Header an identity proxy may use to assert the acting user.
pub const IDENTITY_HEADER: &str = "x-atelier-user-id";

/// Extractor that resolves the current principal, if any.
///
/// Yields `None` for anonymous requests; the authorization engine turns that
/// into `Unauthenticated` at the gate.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(
///     OptionalPrincipal(principal): OptionalPrincipal,
///     State(state): State<AppState>,
/// ) -> Result<Json<Payload>> {
///     authz::authorize_admin(principal.as_ref(), "categories.view")?;
///     // ...
/// }
/// ```
pub struct OptionalPrincipal(pub Option<Principal>);

impl FromRequestParts<AppState> for OptionalPrincipal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(user_id) = resolve_user_id(parts, state).await else {
            return Ok(Self(None));
        };

        let repo = UserRepository::new(state.pool());
        let principal = repo.load_principal(user_id).await?;

        if principal.is_none() {
            // Stale session or bogus header; treat as anonymous
            tracing::debug!(user_id = %user_id, "principal id did not resolve to a user");
        }

        Ok(Self(principal))
    }
}

async fn resolve_user_id(parts: &Parts, state: &AppState) -> Option<UserId> {
    // Session first (set by the external login flow)
    if let Some(session) = parts.extensions.get::<Session>()
        && let Ok(Some(id)) = session.get::<i32>(session_keys::CURRENT_USER_ID).await
    {
        return Some(UserId::new(id));
    }

    // Identity proxy header, only when explicitly trusted
    if state.config().trust_identity_header
        && let Some(value) = parts.headers.get(IDENTITY_HEADER)
        && let Ok(raw) = value.to_str()
        && let Ok(id) = raw.parse::<i32>()
    {
        return Some(UserId::new(id));
    }

    None
}
