//! The authorization engine.
//!
//! Authorization is a pure function over a principal and a required
//! capability - not ambient middleware state. Every orchestrator entry point
//! calls [`authorize`] explicitly, before validation and before any mutation,
//! so an unauthorized caller never triggers partial side effects.
//!
//! Two check modes exist:
//!
//! - **Role check**: the gate names one or more roles (pipe-delimited strings
//!   like `"admin|editor"` are supported). ALLOW iff the principal holds any
//!   of them.
//! - **Permission check**: the gate names a single permission. ALLOW iff the
//!   permission is present in the union of permissions across the principal's
//!   roles.
//!
//! A gate declared with zero capabilities is a configuration error and fails
//! closed.

use thiserror::Error;

use crate::models::Principal;

/// Authorization failures, ordered by when they are detected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthzError {
    /// No principal is attached to the request (401).
    #[error("authentication required")]
    Unauthenticated,
    /// The principal has not verified their email address (403).
    #[error("email verification required")]
    Unverified,
    /// The principal lacks every requested role, or the requested
    /// permission (403).
    #[error("principal lacks the required capability")]
    Forbidden,
    /// The gate was declared with zero roles/permissions (500). Never fails
    /// open.
    #[error("no capabilities specified for gate")]
    MisconfiguredGate,
}

/// A capability a gate can require.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    /// Any of the contained (normalized) role names.
    Roles(Vec<String>),
    /// A single permission name.
    Permission(String),
}

impl Capability {
    /// Build a role capability from role specifiers.
    ///
    /// Each specifier may itself be a pipe-delimited list (`"admin|editor"`).
    /// Names are split, trimmed, lower-cased, and de-duplicated before
    /// comparison. An input that normalizes to nothing produces an empty set,
    /// which [`authorize`] rejects as a misconfigured gate.
    #[must_use]
    pub fn roles<'a>(specs: impl IntoIterator<Item = &'a str>) -> Self {
        let mut names: Vec<String> = Vec::new();
        for spec in specs {
            for part in spec.split('|') {
                let name = part.trim().to_lowercase();
                if !name.is_empty() && !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        Self::Roles(names)
    }

    /// Build a permission capability.
    #[must_use]
    pub fn permission(name: &str) -> Self {
        Self::Permission(name.to_owned())
    }
}

/// Decide whether `principal` may exercise `capability`.
///
/// Check order: authentication, then gate configuration, then the capability
/// itself. The function has no side effects and consults nothing beyond its
/// arguments, so granting a permission takes effect as soon as the caller
/// reloads the principal.
///
/// # Errors
///
/// - [`AuthzError::Unauthenticated`] when `principal` is `None`
/// - [`AuthzError::MisconfiguredGate`] when the capability is empty
/// - [`AuthzError::Forbidden`] when the principal lacks the capability
pub fn authorize(
    principal: Option<&Principal>,
    capability: &Capability,
) -> Result<(), AuthzError> {
    let principal = principal.ok_or(AuthzError::Unauthenticated)?;

    match capability {
        Capability::Roles(names) => {
            if names.is_empty() {
                return Err(AuthzError::MisconfiguredGate);
            }
            if principal.has_any_role(names.iter().map(String::as_str)) {
                Ok(())
            } else {
                Err(AuthzError::Forbidden)
            }
        }
        Capability::Permission(name) => {
            if name.trim().is_empty() {
                return Err(AuthzError::MisconfiguredGate);
            }
            if principal.has_permission(name) {
                Ok(())
            } else {
                Err(AuthzError::Forbidden)
            }
        }
    }
}

/// Require the principal's email address to be verified.
///
/// Admin gates run this between the authentication check and [`authorize`].
///
/// # Errors
///
/// Returns [`AuthzError::Unverified`] for an unverified principal.
pub fn require_verified(principal: &Principal) -> Result<(), AuthzError> {
    if principal.verified {
        Ok(())
    } else {
        Err(AuthzError::Unverified)
    }
}

/// Run the full admin gate chain: authenticated, verified, holds `permission`.
///
/// # Errors
///
/// Fails with the first check that does not pass, in that order.
pub fn authorize_admin(
    principal: Option<&Principal>,
    permission: &str,
) -> Result<(), AuthzError> {
    let present = principal.ok_or(AuthzError::Unauthenticated)?;
    require_verified(present)?;
    authorize(principal, &Capability::permission(permission))
}
