//! Role and permission domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use atelier_core::{PermissionId, PermissionName, RoleId};

/// Roles that are protected from deletion.
pub const SYSTEM_ROLES: [&str; 2] = ["admin", "user"];

/// Whether a role name designates a system role ("admin" or "user").
///
/// System roles must never be deleted; a delete request targeting one is
/// rejected without side effects.
#[must_use]
pub fn is_system_role(name: &str) -> bool {
    SYSTEM_ROLES
        .iter()
        .any(|system| system.eq_ignore_ascii_case(name.trim()))
}

/// A named bundle of permissions, assignable to users.
#[derive(Debug, Clone, Serialize)]
pub struct Role {
    /// Unique role ID.
    pub id: RoleId,
    /// Role name (unique).
    pub name: String,
    /// When the role was created.
    pub created_at: DateTime<Utc>,
    /// When the role was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Whether this role is protected from deletion.
    #[must_use]
    pub fn is_system(&self) -> bool {
        is_system_role(&self.name)
    }
}

/// A role together with its permissions and user count (list payloads).
#[derive(Debug, Clone, Serialize)]
pub struct RoleWithAccess {
    #[serde(flatten)]
    pub role: Role,
    /// Permission names granted to this role.
    pub permissions: Vec<PermissionName>,
    /// Number of users currently holding this role.
    pub users_count: i64,
}

/// An atomic named capability.
#[derive(Debug, Clone, Serialize)]
pub struct Permission {
    /// Unique permission ID.
    pub id: PermissionId,
    /// Permission name (`resource.action`).
    pub name: PermissionName,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_roles() {
        assert!(is_system_role("admin"));
        assert!(is_system_role("user"));
        assert!(is_system_role("Admin"));
        assert!(is_system_role(" user "));
        assert!(!is_system_role("editor"));
        assert!(!is_system_role(""));
    }
}
