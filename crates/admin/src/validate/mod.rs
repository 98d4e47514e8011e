//! Request validators.
//!
//! Every mutating operation has a bound validator that runs after the
//! authorization gate and before any entity mutation. Validators collect the
//! FULL set of field-level violations - not just the first - and a failed
//! validation never writes anything.
//!
//! Uniqueness and existence rules consult the repositories; a race that slips
//! past them still surfaces as a `Conflict` from the unique index at write
//! time.

pub mod category;
pub mod product;
pub mod role;
pub mod user;

use std::collections::BTreeMap;

use serde::Serialize;

pub use category::{CategoryInput, ValidatedCategory};
pub use product::{ProductInput, ValidatedProduct};
pub use role::{RoleInput, ValidatedRole};
pub use user::{UserInput, ValidatedUserCreate, ValidatedUserUpdate};

/// An ordered map of field name to violation messages.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Create an empty set of violations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation against a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    /// Whether any violations were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether a specific field has violations.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// The recorded violations.
    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }

    /// Finish validation: `Ok(value)` when nothing was recorded, otherwise
    /// the collected violations.
    ///
    /// # Errors
    ///
    /// Returns `self` when any violation was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

/// Treat an absent or empty string as missing (a required rule fails on both).
pub(crate) fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_all_violations() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "The name field is required.");
        errors.add("slug", "The slug field is required.");
        errors.add("slug", "The slug has already been taken.");

        assert!(!errors.is_empty());
        assert!(errors.has("name"));
        assert_eq!(errors.fields()["slug"].len(), 2);
    }

    #[test]
    fn test_into_result() {
        let empty = ValidationErrors::new();
        assert!(empty.into_result(1).is_ok());

        let mut errors = ValidationErrors::new();
        errors.add("name", "The name field is required.");
        assert!(errors.into_result(1).is_err());
    }

    #[test]
    fn test_present() {
        assert_eq!(present(Some(&"x".to_owned())), Some("x"));
        assert_eq!(present(Some(&"  ".to_owned())), None);
        assert_eq!(present(None), None);
    }

    #[test]
    fn test_serializes_as_field_map() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "The name field is required.");

        let json = serde_json::to_value(&errors).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"name": ["The name field is required."]})
        );
    }
}
