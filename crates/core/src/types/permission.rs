//! Permission name type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PermissionName`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PermissionNameError {
    /// The input string is empty.
    #[error("permission name cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("permission name must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input is not of the form `resource.action`.
    #[error("permission name must be of the form resource.action")]
    BadFormat,
}

/// An atomic named capability, following the `<resource>.<action>` convention
/// (e.g. `categories.view`, `users.delete`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct PermissionName(String);

impl PermissionName {
    /// Maximum length of a permission name.
    pub const MAX_LENGTH: usize = 100;

    /// Parse a `PermissionName` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, too long, or not of the form
    /// `resource.action` with non-empty parts.
    pub fn parse(s: &str) -> Result<Self, PermissionNameError> {
        if s.is_empty() {
            return Err(PermissionNameError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(PermissionNameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let Some((resource, action)) = s.split_once('.') else {
            return Err(PermissionNameError::BadFormat);
        };

        if resource.is_empty() || action.is_empty() {
            return Err(PermissionNameError::BadFormat);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the permission name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the resource part (before the dot).
    #[must_use]
    pub fn resource(&self) -> &str {
        self.0.split('.').next().unwrap_or("")
    }

    /// Returns the action part (after the first dot).
    #[must_use]
    pub fn action(&self) -> &str {
        self.0.split_once('.').map_or("", |(_, action)| action)
    }
}

impl fmt::Display for PermissionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PermissionName {
    type Err = PermissionNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for PermissionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for PermissionName {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for PermissionName {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for PermissionName {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(PermissionName::parse("categories.view").is_ok());
        assert!(PermissionName::parse("users.delete").is_ok());
        assert!(PermissionName::parse("admin.access").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(
            PermissionName::parse(""),
            Err(PermissionNameError::Empty)
        ));
    }

    #[test]
    fn test_parse_bad_format() {
        assert!(matches!(
            PermissionName::parse("categories"),
            Err(PermissionNameError::BadFormat)
        ));
        assert!(matches!(
            PermissionName::parse(".view"),
            Err(PermissionNameError::BadFormat)
        ));
        assert!(matches!(
            PermissionName::parse("categories."),
            Err(PermissionNameError::BadFormat)
        ));
    }

    #[test]
    fn test_parts() {
        let name = PermissionName::parse("categories.view").unwrap();
        assert_eq!(name.resource(), "categories");
        assert_eq!(name.action(), "view");
    }

    #[test]
    fn test_nested_action() {
        let name = PermissionName::parse("orders.items.edit").unwrap();
        assert_eq!(name.resource(), "orders");
        assert_eq!(name.action(), "items.edit");
    }
}
