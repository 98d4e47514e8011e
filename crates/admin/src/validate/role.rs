//! Role request validation.

use serde::Deserialize;

use atelier_core::{PermissionName, RoleId};

use super::{ValidationErrors, present};
use crate::db::RoleRepository;
use crate::error::AppError;

const NAME_MAX: usize = 255;

/// Incoming role payload (create and update).
#[derive(Debug, Clone, Deserialize)]
pub struct RoleInput {
    pub name: Option<String>,
    /// Permission names to full-replace-sync. Omitted leaves the current set
    /// untouched; an empty list revokes everything.
    pub permissions: Option<Vec<String>>,
}

/// A fully validated role payload.
#[derive(Debug, Clone)]
pub struct ValidatedRole {
    pub name: String,
    pub permissions: Option<Vec<PermissionName>>,
}

/// Validate a role payload.
///
/// `exclude` carries the id of the record being updated so it may keep its
/// own name. Every named permission must already exist.
///
/// # Errors
///
/// Returns `AppError::Validation` with the full field violation set, or a
/// repository error if a lookup fails.
pub async fn validate(
    repo: &RoleRepository<'_>,
    input: &RoleInput,
    exclude: Option<RoleId>,
) -> Result<ValidatedRole, AppError> {
    let mut errors = ValidationErrors::new();

    let name = match present(input.name.as_ref()) {
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
    };

    if let Some(ref name) = name
        && repo.name_exists(name, exclude).await?
    {
        errors.add("name", "The name has already been taken.");
    }

    let permissions = match input.permissions.as_ref() {
        Some(names) => Some(validate_permissions(&mut errors, repo, names).await?),
        None => None,
    };

    errors.into_result(()).map_err(AppError::Validation)?;

    match name {
        Some(name) => Ok(ValidatedRole { name, permissions }),
        None => Err(AppError::Internal("validator invariant broken".to_owned())),
    }
}

async fn validate_permissions(
    errors: &mut ValidationErrors,
    repo: &RoleRepository<'_>,
    names: &[String],
) -> Result<Vec<PermissionName>, AppError> {
    let mut parsed = Vec::with_capacity(names.len());
    let mut lookup = Vec::with_capacity(names.len());

    for raw in names {
        match PermissionName::parse(raw) {
            Ok(name) => {
                lookup.push(raw.clone());
                parsed.push(name);
            }
            Err(_) => {
                errors.add(
                    "permissions",
                    format!("The permission {raw} is invalid."),
                );
            }
        }
    }

    for missing in repo.missing_permissions(&lookup).await? {
        errors.add(
            "permissions",
            format!("The permission {missing} does not exist."),
        );
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_distinguishes_omitted_from_empty() {
        let omitted: RoleInput = serde_json::from_str(r#"{"name": "editor"}"#).expect("deserialize");
        assert!(omitted.permissions.is_none());

        let empty: RoleInput =
            serde_json::from_str(r#"{"name": "editor", "permissions": []}"#).expect("deserialize");
        assert_eq!(empty.permissions.as_deref(), Some(&[] as &[String]));
    }
}
