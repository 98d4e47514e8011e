//! Product request validation.

use rust_decimal::Decimal;
use serde::Deserialize;

use atelier_core::{CategoryId, Price, ProductId, Slug};

use super::{ValidationErrors, present};
use crate::db::ProductRepository;
use crate::error::AppError;

const NAME_MAX: usize = 255;
const DESCRIPTION_MAX: usize = 255;

/// Incoming product payload (create and update). All fields are required.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: Option<String>,
    pub slug: Option<String>,
    /// Decimal amount, e.g. `"19.99"`.
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub is_active: Option<bool>,
}

/// A fully validated product payload.
#[derive(Debug, Clone)]
pub struct ValidatedProduct {
    pub name: String,
    pub slug: Slug,
    pub price: Price,
    pub stock: i32,
    pub description: String,
    pub category_id: CategoryId,
    pub is_active: bool,
}

/// Validate a product payload.
///
/// `exclude` carries the id of the record being updated so it may keep its
/// own slug.
///
/// # Errors
///
/// Returns `AppError::Validation` with the full field violation set, or a
/// repository error if a lookup fails.
pub async fn validate(
    repo: &ProductRepository<'_>,
    input: &ProductInput,
    exclude: Option<ProductId>,
) -> Result<ValidatedProduct, AppError> {
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

    let price = match input.price {
        Some(amount) => match Price::new(amount) {
            Ok(price) => Some(price),
            Err(_) => {
                errors.add("price", "The price must be at least 0.");
                None
            }
        },
        None => {
            errors.add("price", "The price field is required.");
            None
        }
    };

    let stock = match input.stock {
        Some(stock) if stock < 0 => {
            errors.add("stock", "The stock must be at least 0.");
            None
        }
        Some(stock) => Some(stock),
        None => {
            errors.add("stock", "The stock field is required.");
            None
        }
    };

    let description = match present(input.description.as_ref()) {
        Some(description) if description.len() > DESCRIPTION_MAX => {
            errors.add(
                "description",
                format!("The description may not be greater than {DESCRIPTION_MAX} characters."),
            );
            None
        }
        Some(description) => Some(description.to_owned()),
        None => {
            errors.add("description", "The description field is required.");
            None
        }
    };

    let category_id = match input.category_id {
        Some(id) => {
            let category_id = CategoryId::new(id);
            if repo.category_exists(category_id).await? {
                Some(category_id)
            } else {
                errors.add("category_id", "The selected category is invalid.");
                None
            }
        }
        None => {
            errors.add("category_id", "The category field is required.");
            None
        }
    };

    let is_active = match input.is_active {
        Some(is_active) => Some(is_active),
        None => {
            errors.add("is_active", "The is active field is required.");
            None
        }
    };

    errors.into_result(()).map_err(AppError::Validation)?;

    match (name, slug, price, stock, description, category_id, is_active) {
        (
            Some(name),
            Some(slug),
            Some(price),
            Some(stock),
            Some(description),
            Some(category_id),
            Some(is_active),
        ) => Ok(ValidatedProduct {
            name,
            slug,
            price,
            stock,
            description,
            category_id,
            is_active,
        }),
        _ => Err(AppError::Internal("validator invariant broken".to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_deserializes_price_from_string() {
        let input: ProductInput =
            serde_json::from_str(r#"{"price": "19.99", "stock": 3}"#).expect("deserialize");
        assert_eq!(input.price, Some(Decimal::new(1999, 2)));
        assert_eq!(input.stock, Some(3));
    }

    #[test]
    fn test_input_deserializes_with_missing_fields() {
        let input: ProductInput = serde_json::from_str("{}").expect("deserialize");
        assert!(input.name.is_none());
        assert!(input.is_active.is_none());
    }
}
