//! Category read repository for the public storefront.

use rust_decimal::Decimal;
use sqlx::PgPool;

use atelier_core::{CategoryId, Price, ProductId, Slug};

use super::RepositoryError;
use crate::models::{Category, CategoryPage, Product};

/// Internal row type for category queries.
#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    name: String,
    slug: String,
}

impl TryFrom<CategoryRow> for Category {
    type Error = RepositoryError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        let slug = Slug::parse(&row.slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid slug in database: {e}"))
        })?;

        Ok(Self {
            id: CategoryId::new(row.id),
            name: row.name,
            slug,
        })
    }
}

/// Internal row type for product queries, joined with the main image.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    slug: String,
    price: Decimal,
    stock: i32,
    description: String,
    image: Option<String>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let slug = Slug::parse(&row.slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid slug in database: {e}"))
        })?;
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price in database: {e}"))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            slug,
            price,
            stock: row.stock,
            description: row.description,
            image: row.image,
        })
    }
}

/// Read repository for public category pages.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all categories for the public listing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list_all(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT id, name, slug
            FROM categories
            ORDER BY name ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Look up a category by slug, with its active products.
    ///
    /// Returns `None` when no category carries the slug (the route answers
    /// 404).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<CategoryPage>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT id, name, slug
            FROM categories
            WHERE slug = $1
            ",
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let category: Category = row.try_into()?;

        let products = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT p.id, p.name, p.slug, p.price, p.stock, p.description,
                   pi.image AS image
            FROM products p
            LEFT JOIN product_images pi
                ON pi.product_id = p.id AND pi.is_main
            WHERE p.category_id = $1 AND p.is_active
            ORDER BY p.name ASC
            ",
        )
        .bind(category.id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(Some(CategoryPage {
            category,
            products: products
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<Vec<_>, _>>()?,
        }))
    }
}
