//! Role and permission repository for database operations.
//!
//! Permission sync is full-replace: the new set exactly replaces the old
//! within one transaction. Sync touches only `role_permissions` rows - the
//! role and permission rows themselves are never mutated by it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use atelier_core::{PermissionId, PermissionName, RoleId};

use super::{RepositoryError, map_unique_violation};
use crate::models::{Permission, Role, RoleWithAccess};

/// Internal row type for role queries.
#[derive(Debug, sqlx::FromRow)]
struct RoleRow {
    id: i32,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RoleRow> for Role {
    fn from(row: RoleRow) -> Self {
        Self {
            id: RoleId::new(row.id),
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Internal row type for permission queries.
#[derive(Debug, sqlx::FromRow)]
struct PermissionRow {
    id: i32,
    name: String,
}

impl TryFrom<PermissionRow> for Permission {
    type Error = RepositoryError;

    fn try_from(row: PermissionRow) -> Result<Self, Self::Error> {
        let name = PermissionName::parse(&row.name).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid permission name in database: {e}"))
        })?;

        Ok(Self {
            id: PermissionId::new(row.id),
            name,
        })
    }
}

/// Repository for role and permission database operations.
pub struct RoleRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RoleRepository<'a> {
    /// Create a new role repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all roles with their permissions and user counts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list_all(&self) -> Result<Vec<RoleWithAccess>, RepositoryError> {
        let roles = sqlx::query_as::<_, RoleRow>(
            r"
            SELECT id, name, created_at, updated_at
            FROM roles
            ORDER BY id ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        let permission_rows = sqlx::query_as::<_, (i32, String)>(
            r"
            SELECT rp.role_id, p.name
            FROM role_permissions rp
            JOIN permissions p ON p.id = rp.permission_id
            ORDER BY p.name ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        let count_rows = sqlx::query_as::<_, (i32, i64)>(
            r"
            SELECT role_id, COUNT(*)
            FROM user_roles
            GROUP BY role_id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        let mut permissions_by_role: HashMap<i32, Vec<PermissionName>> = HashMap::new();
        for (role_id, name) in permission_rows {
            let name = PermissionName::parse(&name).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid permission name in database: {e}"))
            })?;
            permissions_by_role.entry(role_id).or_default().push(name);
        }

        let counts: HashMap<i32, i64> = count_rows.into_iter().collect();

        Ok(roles
            .into_iter()
            .map(|row| {
                let id = row.id;
                RoleWithAccess {
                    role: row.into(),
                    permissions: permissions_by_role.remove(&id).unwrap_or_default(),
                    users_count: counts.get(&id).copied().unwrap_or(0),
                }
            })
            .collect())
    }

    /// Get a role by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: RoleId) -> Result<Option<Role>, RepositoryError> {
        let row = sqlx::query_as::<_, RoleRow>(
            r"
            SELECT id, name, created_at, updated_at
            FROM roles
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Get a role with its permissions and user count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_with_access(
        &self,
        id: RoleId,
    ) -> Result<Option<RoleWithAccess>, RepositoryError> {
        let Some(role) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let permission_names = sqlx::query_as::<_, (String,)>(
            r"
            SELECT p.name
            FROM role_permissions rp
            JOIN permissions p ON p.id = rp.permission_id
            WHERE rp.role_id = $1
            ORDER BY p.name ASC
            ",
        )
        .bind(id.as_i32())
        .fetch_all(self.pool)
        .await?;

        let permissions = permission_names
            .into_iter()
            .map(|(name,)| {
                PermissionName::parse(&name).map_err(|e| {
                    RepositoryError::DataCorruption(format!(
                        "invalid permission name in database: {e}"
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let users_count = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*) FROM user_roles WHERE role_id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_one(self.pool)
        .await?;

        Ok(Some(RoleWithAccess {
            role,
            permissions,
            users_count,
        }))
    }

    /// Whether a role name is already taken, optionally excluding one record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn name_exists(
        &self,
        name: &str,
        exclude: Option<RoleId>,
    ) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS (
                SELECT 1 FROM roles
                WHERE name = $1 AND ($2::int4 IS NULL OR id <> $2)
            )
            ",
        )
        .bind(name)
        .bind(exclude.as_ref().map(RoleId::as_i32))
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Create a role, optionally granting an initial permission set.
    ///
    /// The insert and the permission sync share one transaction: a failing
    /// sync rolls the role row back too.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        permissions: Option<&[PermissionName]>,
    ) -> Result<Role, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, RoleRow>(
            r"
            INSERT INTO roles (name)
            VALUES ($1)
            RETURNING id, name, created_at, updated_at
            ",
        )
        .bind(name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "role name already exists"))?;

        if let Some(permissions) = permissions {
            sync_permissions(&mut tx, RoleId::new(row.id), permissions).await?;
        }

        tx.commit().await?;

        Ok(row.into())
    }

    /// Update a role's name and, when given, full-replace its permission set.
    ///
    /// `permissions: None` leaves existing associations untouched;
    /// `permissions: Some(&[])` revokes everything.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the role doesn't exist.
    /// Returns `RepositoryError::Conflict` on a name-uniqueness race.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: RoleId,
        name: &str,
        permissions: Option<&[PermissionName]>,
    ) -> Result<Role, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, RoleRow>(
            r"
            UPDATE roles
            SET name = $1, updated_at = now()
            WHERE id = $2
            RETURNING id, name, created_at, updated_at
            ",
        )
        .bind(name)
        .bind(id.as_i32())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "role name already exists"))?
        .ok_or(RepositoryError::NotFound)?;

        if let Some(permissions) = permissions {
            sync_permissions(&mut tx, id, permissions).await?;
        }

        tx.commit().await?;

        Ok(row.into())
    }

    /// Delete a role.
    ///
    /// System-role protection lives in the orchestrator, which checks the
    /// role's name before calling this.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the role doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: RoleId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM roles WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// List all permissions.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list_permissions(&self) -> Result<Vec<Permission>, RepositoryError> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r"
            SELECT id, name FROM permissions ORDER BY name ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Of the given permission names, return those that do NOT exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn missing_permissions(
        &self,
        names: &[String],
    ) -> Result<Vec<String>, RepositoryError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let existing = sqlx::query_as::<_, (String,)>(
            r"
            SELECT name FROM permissions WHERE name = ANY($1)
            ",
        )
        .bind(names)
        .fetch_all(self.pool)
        .await?;

        let existing: Vec<String> = existing.into_iter().map(|(name,)| name).collect();

        Ok(names
            .iter()
            .filter(|name| !existing.contains(name))
            .cloned()
            .collect())
    }

    /// Count all roles.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(r"SELECT COUNT(*) FROM roles")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }
}

/// Full-replace a role's permission set within an open transaction.
///
/// Deletes every existing association row, then inserts one per named
/// permission. Only association rows are touched.
async fn sync_permissions(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    role_id: RoleId,
    permissions: &[PermissionName],
) -> Result<(), RepositoryError> {
    let conn: &mut PgConnection = &mut *tx;

    sqlx::query(
        r"
        DELETE FROM role_permissions WHERE role_id = $1
        ",
    )
    .bind(role_id.as_i32())
    .execute(&mut *conn)
    .await?;

    if permissions.is_empty() {
        return Ok(());
    }

    // De-duplicate so the inserted-row count matches the requested set
    let mut names: Vec<String> = Vec::with_capacity(permissions.len());
    for permission in permissions {
        let name = permission.as_str().to_owned();
        if !names.contains(&name) {
            names.push(name);
        }
    }

    let result = sqlx::query(
        r"
        INSERT INTO role_permissions (role_id, permission_id)
        SELECT $1, id FROM permissions WHERE name = ANY($2)
        ",
    )
    .bind(role_id.as_i32())
    .bind(&names)
    .execute(&mut *conn)
    .await?;

    // The validator checked existence; a shortfall here means a permission
    // was removed concurrently.
    if result.rows_affected() != names.len() as u64 {
        return Err(RepositoryError::Conflict(
            "one or more permissions no longer exist".to_owned(),
        ));
    }

    Ok(())
}
