//! User repository for database operations.
//!
//! The password digest column is write-only from the application's point of
//! view: it is set on create, conditionally overwritten on update, and never
//! selected into a domain type.
//!
//! Role sync is full-replace and shares the transaction of the create/update
//! that triggered it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use atelier_core::{Email, UserId};

use super::{RepositoryError, map_unique_violation};
use crate::models::{Principal, User, UserWithRoles};

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    name: String,
    email: String,
    email_verified_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            name: row.name,
            email,
            email_verified_at: row.email_verified_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all users with their assigned role names.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list_all(&self) -> Result<Vec<UserWithRoles>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, name, email, email_verified_at, created_at, updated_at
            FROM users
            ORDER BY id ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        let role_rows = sqlx::query_as::<_, (i32, String)>(
            r"
            SELECT ur.user_id, r.name
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            ORDER BY r.name ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        let mut roles_by_user: HashMap<i32, Vec<String>> = HashMap::new();
        for (user_id, name) in role_rows {
            roles_by_user.entry(user_id).or_default().push(name);
        }

        rows.into_iter()
            .map(|row| {
                let id = row.id;
                Ok(UserWithRoles {
                    user: row.try_into()?,
                    roles: roles_by_user.remove(&id).unwrap_or_default(),
                })
            })
            .collect()
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, name, email, email_verified_at, created_at, updated_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a user with their role names.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_with_roles(
        &self,
        id: UserId,
    ) -> Result<Option<UserWithRoles>, RepositoryError> {
        let Some(user) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let roles = self.role_names(id).await?;

        Ok(Some(UserWithRoles { user, roles }))
    }

    /// Whether an email address is already taken, optionally excluding one record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn email_exists(
        &self,
        email: &Email,
        exclude: Option<UserId>,
    ) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS (
                SELECT 1 FROM users
                WHERE email = $1 AND ($2::int4 IS NULL OR id <> $2)
            )
            ",
        )
        .bind(email.as_str())
        .bind(exclude.as_ref().map(UserId::as_i32))
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Create a user with a pre-hashed password, optionally assigning a role.
    ///
    /// The insert and the role sync share one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists or the
    /// role is gone.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
        role: Option<&str>,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, email_verified_at, created_at, updated_at
            ",
        )
        .bind(name)
        .bind(email.as_str())
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "email already exists"))?;

        if let Some(role) = role {
            sync_role(&mut tx, UserId::new(row.id), role).await?;
        }

        tx.commit().await?;

        row.try_into()
    }

    /// Update a user and full-replace their role assignment.
    ///
    /// `password_hash: None` leaves the stored digest untouched - an update
    /// with an omitted or empty password never overwrites an existing one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` on an email-uniqueness race or a
    /// missing role.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: UserId,
        name: &str,
        email: &Email,
        password_hash: Option<&str>,
        role: &str,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(
            r"
            UPDATE users
            SET name = $1,
                email = $2,
                password_hash = COALESCE($3, password_hash),
                updated_at = now()
            WHERE id = $4
            RETURNING id, name, email, email_verified_at, created_at, updated_at
            ",
        )
        .bind(name)
        .bind(email.as_str())
        .bind(password_hash)
        .bind(id.as_i32())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "email already exists"))?
        .ok_or(RepositoryError::NotFound)?;

        sync_role(&mut tx, id, role).await?;

        tx.commit().await?;

        row.try_into()
    }

    /// Delete a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM users WHERE id = $1
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

    /// Mark a user's email as verified.
    ///
    /// The verification flow itself (mail-out, token) lives elsewhere; this
    /// is the persistence hook it and the seeder use.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn mark_verified(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET email_verified_at = now(), updated_at = now()
            WHERE id = $1
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

    /// Load the principal for a user: identity plus the union of roles and
    /// permissions, resolved fresh from the database.
    ///
    /// Returns `None` for an unknown id (e.g. a stale session).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn load_principal(&self, id: UserId) -> Result<Option<Principal>, RepositoryError> {
        let Some(user) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let roles = self.role_names(id).await?;

        let permissions = sqlx::query_as::<_, (String,)>(
            r"
            SELECT DISTINCT p.name
            FROM user_roles ur
            JOIN role_permissions rp ON rp.role_id = ur.role_id
            JOIN permissions p ON p.id = rp.permission_id
            WHERE ur.user_id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_all(self.pool)
        .await?;

        let verified = user.is_verified();
        Ok(Some(Principal::new(
            user.id,
            user.name,
            user.email,
            verified,
            roles,
            permissions.into_iter().map(|(name,)| name),
        )))
    }

    /// Count all users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(r"SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    async fn role_names(&self, id: UserId) -> Result<Vec<String>, RepositoryError> {
        let rows = sqlx::query_as::<_, (String,)>(
            r"
            SELECT r.name
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            WHERE ur.user_id = $1
            ORDER BY r.name ASC
            ",
        )
        .bind(id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(|(name,)| name).collect())
    }
}

/// Full-replace a user's role assignment within an open transaction.
///
/// The user ends up holding exactly the named role; prior assignments are
/// revoked. Only `user_roles` rows are touched.
async fn sync_role(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: UserId,
    role: &str,
) -> Result<(), RepositoryError> {
    let conn: &mut PgConnection = &mut *tx;

    sqlx::query(
        r"
        DELETE FROM user_roles WHERE user_id = $1
        ",
    )
    .bind(user_id.as_i32())
    .execute(&mut *conn)
    .await?;

    let result = sqlx::query(
        r"
        INSERT INTO user_roles (user_id, role_id)
        SELECT $1, id FROM roles WHERE name = $2
        ",
    )
    .bind(user_id.as_i32())
    .bind(role)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::Conflict(format!(
            "role does not exist: {role}"
        )));
    }

    Ok(())
}
