//! The authenticated principal.

use std::collections::HashSet;

use atelier_core::{Email, UserId};

/// The authenticated user making a request, with their access resolved.
///
/// Role names are normalized to lowercase at construction so gate comparisons
/// are case-insensitive; permission names are compared exactly. A `Principal`
/// is loaded fresh from the database on every request, so role and permission
/// changes take effect on the very next call.
#[derive(Debug, Clone)]
pub struct Principal {
    /// The user's ID.
    pub id: UserId,
    /// The user's display name.
    pub name: String,
    /// The user's email address.
    pub email: Email,
    /// Whether the user's email address is verified.
    pub verified: bool,
    roles: HashSet<String>,
    permissions: HashSet<String>,
}

impl Principal {
    /// Build a principal from resolved role and permission names.
    #[must_use]
    pub fn new(
        id: UserId,
        name: String,
        email: Email,
        verified: bool,
        roles: impl IntoIterator<Item = String>,
        permissions: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            verified,
            roles: roles.into_iter().map(|r| r.to_lowercase()).collect(),
            permissions: permissions.into_iter().collect(),
        }
    }

    /// Whether the principal holds the given role (case-insensitive).
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(&role.to_lowercase())
    }

    /// Whether any of the given normalized role names is held.
    #[must_use]
    pub fn has_any_role<'a>(&self, roles: impl IntoIterator<Item = &'a str>) -> bool {
        roles.into_iter().any(|r| self.roles.contains(r))
    }

    /// Whether the permission is present in the union of permissions across
    /// the principal's roles.
    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// The principal's role names (lowercased).
    #[must_use]
    pub const fn roles(&self) -> &HashSet<String> {
        &self.roles
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn principal(roles: &[&str], permissions: &[&str]) -> Principal {
        Principal::new(
            UserId::new(1),
            "Test User".to_owned(),
            Email::parse("user@example.com").unwrap(),
            true,
            roles.iter().map(|r| (*r).to_owned()),
            permissions.iter().map(|p| (*p).to_owned()),
        )
    }

    #[test]
    fn test_roles_are_normalized() {
        let p = principal(&["Admin"], &[]);
        assert!(p.has_role("admin"));
        assert!(p.has_role("ADMIN"));
        assert!(!p.has_role("user"));
    }

    #[test]
    fn test_permissions_exact() {
        let p = principal(&["admin"], &["categories.view"]);
        assert!(p.has_permission("categories.view"));
        assert!(!p.has_permission("categories.edit"));
    }
}
