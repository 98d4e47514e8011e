//! Category request validation.

use serde::Deserialize;

use atelier_core::{CategoryId, Slug};

use super::{ValidationErrors, present};
use crate::db::CategoryRepository;
use crate::error::AppError;

const NAME_MAX: usize = 50;

/// Incoming category payload (create and update).
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryInput {
    pub name: Option<String>,
    pub slug: Option<String>,
}

/// A fully validated category payload.
#[derive(Debug, Clone)]
pub struct ValidatedCategory {
    pub name: String,
    pub slug: Slug,
}

/// Validate a category payload.
///
/// `exclude` carries the id of the record being updated so it may keep its
/// own name and slug.
///
/// # Errors
///
/// Returns `AppError::Validation` with the full field violation set, or a
/// repository error if a uniqueness lookup fails.
pub async fn validate(
    repo: &CategoryRepository<'_>,
    input: &CategoryInput,
    exclude: Option<CategoryId>,
) -> Result<ValidatedCategory, AppError> {
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

    let slug = match present(input.slug.as_ref()) {
        Some(raw) => match Slug::parse(raw) {
            Ok(slug) => Some(slug),
            Err(e) => {
                errors.add("slug", format!("The slug is invalid: {e}."));
                None
            }
        },
        None => {
            errors.add("slug", "The slug field is required.");
            None
        }
    };

    if let Some(ref slug) = slug
        && repo.slug_exists(slug, exclude).await?
    {
        errors.add("slug", "The slug has already been taken.");
    }

    errors
        .into_result(())
        .map_err(AppError::Validation)?;

    // Both are present once the violation set is empty
    match (name, slug) {
        (Some(name), Some(slug)) => Ok(ValidatedCategory { name, slug }),
        _ => Err(AppError::Internal(
            "validator invariant broken".to_owned(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_limit_matches_column_constraint() {
        assert_eq!(NAME_MAX, 50);
    }

    #[test]
    fn test_input_deserializes_with_missing_fields() {
        let input: CategoryInput = serde_json::from_str("{}").expect("deserialize");
        assert!(input.name.is_none());
        assert!(input.slug.is_none());
    }
}
