//! User request validation.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use atelier_core::{Email, UserId};

use super::{ValidationErrors, present};
use crate::db::UserRepository;
use crate::error::AppError;

const NAME_MAX: usize = 255;
const EMAIL_MAX: usize = 255;
const PASSWORD_MIN: usize = 6;

/// Roles a user payload may assign.
const ASSIGNABLE_ROLES: [&str; 2] = ["admin", "user"];

/// Incoming user payload (create and update).
#[derive(Debug, Deserialize)]
pub struct UserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    /// Plaintext password; never logged, hashed before persistence.
    pub password: Option<SecretString>,
    pub role: Option<String>,
}

/// A fully validated create payload.
#[derive(Debug)]
pub struct ValidatedUserCreate {
    pub name: String,
    pub email: Email,
    pub password: SecretString,
    pub role: Option<String>,
}

/// A fully validated update payload.
///
/// `password: None` means the stored digest is kept unchanged.
#[derive(Debug)]
pub struct ValidatedUserUpdate {
    pub name: String,
    pub email: Email,
    pub password: Option<SecretString>,
    pub role: String,
}

/// Validate a user create payload.
///
/// # Errors
///
/// Returns `AppError::Validation` with the full field violation set, or a
/// repository error if a uniqueness lookup fails.
pub async fn validate_create(
    repo: &UserRepository<'_>,
    input: &UserInput,
) -> Result<ValidatedUserCreate, AppError> {
    let mut errors = ValidationErrors::new();

    let name = validate_name(&mut errors, input.name.as_ref());
    let email = validate_email(&mut errors, repo, input.email.as_ref(), None).await?;

    let password = match password_if_present(input.password.as_ref()) {
        Some(password) => {
            validate_password_strength(&mut errors, &password);
            Some(password)
        }
        None => {
            errors.add("password", "The password field is required.");
            None
        }
    };

    let role = match input.role.as_deref() {
        Some(role) => {
            validate_role_choice(&mut errors, role);
            Some(role.to_owned())
        }
        None => None,
    };

    errors.into_result(()).map_err(AppError::Validation)?;

    match (name, email, password) {
        (Some(name), Some(email), Some(password)) => Ok(ValidatedUserCreate {
            name,
            email,
            password,
            role,
        }),
        _ => Err(AppError::Internal("validator invariant broken".to_owned())),
    }
}

/// Validate a user update payload.
///
/// The email uniqueness check excludes the user being updated. An omitted or
/// empty password validates to `None`, which keeps the existing digest.
///
/// # Errors
///
/// Returns `AppError::Validation` with the full field violation set, or a
/// repository error if a uniqueness lookup fails.
pub async fn validate_update(
    repo: &UserRepository<'_>,
    input: &UserInput,
    id: UserId,
) -> Result<ValidatedUserUpdate, AppError> {
    let mut errors = ValidationErrors::new();

    let name = validate_name(&mut errors, input.name.as_ref());
    let email = validate_email(&mut errors, repo, input.email.as_ref(), Some(id)).await?;

    let password = password_if_present(input.password.as_ref());
    if let Some(ref password) = password {
        validate_password_strength(&mut errors, password);
    }

    let role = match present(input.role.as_ref()) {
        Some(role) => {
            validate_role_choice(&mut errors, role);
            Some(role.to_owned())
        }
        None => {
            errors.add("role", "The role field is required.");
            None
        }
    };

    errors.into_result(()).map_err(AppError::Validation)?;

    match (name, email, role) {
        (Some(name), Some(email), Some(role)) => Ok(ValidatedUserUpdate {
            name,
            email,
            password,
            role,
        }),
        _ => Err(AppError::Internal("validator invariant broken".to_owned())),
    }
}

fn validate_name(errors: &mut ValidationErrors, name: Option<&String>) -> Option<String> {
    match present(name) {
        Some(name) if name.len() > NAME_MAX => {
            errors.add(
                "name",
                format!("The name may not be greater than {NAME_MAX} characters."),
            );
            None
        }
        Some(name) => Some(name.to_owned()),
        None => {
            errors.add("name", "The name field is required.");
            None
        }
    }
}

async fn validate_email(
    errors: &mut ValidationErrors,
    repo: &UserRepository<'_>,
    email: Option<&String>,
    exclude: Option<UserId>,
) -> Result<Option<Email>, AppError> {
    let Some(raw) = present(email) else {
        errors.add("email", "The email field is required.");
        return Ok(None);
    };

    if raw.len() > EMAIL_MAX {
        errors.add(
            "email",
            format!("The email may not be greater than {EMAIL_MAX} characters."),
        );
        return Ok(None);
    }

    let email = match Email::parse(raw) {
        Ok(email) => email,
        Err(_) => {
            errors.add("email", "The email must be a valid email address.");
            return Ok(None);
        }
    };

    if repo.email_exists(&email, exclude).await? {
        errors.add("email", "The email has already been taken.");
    }

    Ok(Some(email))
}

/// Treat an absent or empty password as not supplied.
fn password_if_present(password: Option<&SecretString>) -> Option<SecretString> {
    password
        .filter(|p| !p.expose_secret().is_empty())
        .cloned()
}

fn validate_password_strength(errors: &mut ValidationErrors, password: &SecretString) {
    if password.expose_secret().len() < PASSWORD_MIN {
        errors.add(
            "password",
            format!("The password must be at least {PASSWORD_MIN} characters."),
        );
    }
}

fn validate_role_choice(errors: &mut ValidationErrors, role: &str) {
    if !ASSIGNABLE_ROLES.contains(&role) {
        errors.add("role", "The selected role is invalid.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_if_present_treats_empty_as_absent() {
        assert!(password_if_present(None).is_none());
        assert!(password_if_present(Some(&SecretString::from(""))).is_none());
        assert!(password_if_present(Some(&SecretString::from("secret"))).is_some());
    }

    #[test]
    fn test_role_choice() {
        let mut errors = ValidationErrors::new();
        validate_role_choice(&mut errors, "admin");
        validate_role_choice(&mut errors, "user");
        assert!(errors.is_empty());

        validate_role_choice(&mut errors, "superuser");
        assert!(errors.has("role"));
    }

    #[test]
    fn test_password_strength() {
        let mut errors = ValidationErrors::new();
        validate_password_strength(&mut errors, &SecretString::from("abcdef"));
        assert!(errors.is_empty());

        validate_password_strength(&mut errors, &SecretString::from("short"));
        assert!(errors.has("password"));
    }

    #[test]
    fn test_name_rules() {
        let mut errors = ValidationErrors::new();
        assert!(validate_name(&mut errors, None).is_none());
        assert!(errors.has("name"));

        let mut errors = ValidationErrors::new();
        let long = "x".repeat(256);
        assert!(validate_name(&mut errors, Some(&long)).is_none());
        assert!(errors.has("name"));

        let mut errors = ValidationErrors::new();
        let ok = "Jane Doe".to_owned();
        assert_eq!(validate_name(&mut errors, Some(&ok)).as_deref(), Some("Jane Doe"));
        assert!(errors.is_empty());
    }
}
