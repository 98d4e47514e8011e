//! User domain types.
//!
//! The stored password digest is deliberately absent from these types: it is
//! written by the repositories and never read back into the application, so it
//! cannot leak into any response payload.

use chrono::{DateTime, Utc};
use serde::Serialize;

use atelier_core::{Email, UserId};

/// A user account.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address (unique, stored lower-cased).
    pub email: Email,
    /// When the email address was verified, if ever.
    pub email_verified_at: Option<DateTime<Utc>>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the user has completed email verification.
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        self.email_verified_at.is_some()
    }
}

/// A user together with their assigned role names (list payloads).
#[derive(Debug, Clone, Serialize)]
pub struct UserWithRoles {
    #[serde(flatten)]
    pub user: User,
    /// Names of the roles assigned to this user.
    pub roles: Vec<String>,
}
