//! Category domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use atelier_core::{CategoryId, Slug};

/// A product category.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    /// Unique category ID.
    pub id: CategoryId,
    /// Category name (unique).
    pub name: String,
    /// URL-safe identifier (unique).
    pub slug: Slug,
    /// When the category was created.
    pub created_at: DateTime<Utc>,
    /// When the category was last updated.
    pub updated_at: DateTime<Utc>,
}
