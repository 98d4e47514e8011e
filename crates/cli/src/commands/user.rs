//! User bootstrap command.
//!
//! # Usage
//!
//! ```bash
//! atelier user create -e admin@example.com -n "Admin Name" -p <password> --role admin
//! ```
//!
//! The created user is marked email-verified so it can pass the admin gate
//! chain immediately.

use secrecy::SecretString;
use thiserror::Error;

use atelier_admin::db::UserRepository;
use atelier_admin::services::password;
use atelier_core::Email;

/// Errors that can occur while creating a user.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Invalid role: {0}. Valid roles: admin, user")]
    InvalidRole(String),
}

/// Create a user with a hashed password and role.
///
/// # Errors
///
/// Returns an error if the inputs are invalid, the email is taken, or the
/// database operation fails.
pub async fn create(
    email: &str,
    name: &str,
    plaintext: &str,
    role: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let email = Email::parse(email).map_err(|e| UserError::InvalidEmail(e.to_string()))?;

    if !["admin", "user"].contains(&role) {
        return Err(UserError::InvalidRole(role.to_owned()).into());
    }

    let pool = super::connect().await?;
    let repo = UserRepository::new(&pool);

    let digest = password::hash_password(&SecretString::from(plaintext.to_owned()))?;
    let user = repo.create(name, &email, &digest, Some(role)).await?;
    repo.mark_verified(user.id).await?;

    tracing::info!(user_id = %user.id, email = %user.email, role, "user created");
    Ok(())
}
