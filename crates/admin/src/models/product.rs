//! Product and product image domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use atelier_core::{CategoryId, Price, ProductId, ProductImageId, Slug};

/// A product in the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// URL-safe identifier (unique).
    pub slug: Slug,
    /// Unit price.
    pub price: Price,
    /// Units in stock.
    pub stock: i32,
    /// Product description.
    pub description: String,
    /// Owning category.
    pub category_id: CategoryId,
    /// Whether the product is visible on the storefront.
    pub is_active: bool,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

/// An image attached to a product.
///
/// At most one image per product carries `is_main`; the repository swaps the
/// flag atomically when a new main image is chosen.
#[derive(Debug, Clone, Serialize)]
pub struct ProductImage {
    /// Unique image ID.
    pub id: ProductImageId,
    /// Owning product.
    pub product_id: ProductId,
    /// Image URI or path.
    pub image: String,
    /// Whether this is the product's main image.
    pub is_main: bool,
}

/// A product together with its images (list payloads).
#[derive(Debug, Clone, Serialize)]
pub struct ProductWithImages {
    #[serde(flatten)]
    pub product: Product,
    /// Images attached to this product.
    pub images: Vec<ProductImage>,
}
