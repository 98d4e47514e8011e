//! Product and product image repository for database operations.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use atelier_core::{CategoryId, Price, ProductId, ProductImageId, Slug};

use super::{RepositoryError, map_fk_violation, map_unique_violation};
use crate::models::{Product, ProductImage, ProductWithImages};

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    slug: String,
    price: Decimal,
    stock: i32,
    description: String,
    category_id: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
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
            category_id: CategoryId::new(row.category_id),
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Internal row type for product image queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductImageRow {
    id: i32,
    product_id: i32,
    image: String,
    is_main: bool,
}

impl From<ProductImageRow> for ProductImage {
    fn from(row: ProductImageRow) -> Self {
        Self {
            id: ProductImageId::new(row.id),
            product_id: ProductId::new(row.product_id),
            image: row.image,
            is_main: row.is_main,
        }
    }
}

/// Fields for creating or replacing a product.
#[derive(Debug, Clone)]
pub struct ProductFields<'a> {
    pub name: &'a str,
    pub slug: &'a Slug,
    pub price: Price,
    pub stock: i32,
    pub description: &'a str,
    pub category_id: CategoryId,
    pub is_active: bool,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all products with their images.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list_all(&self) -> Result<Vec<ProductWithImages>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, slug, price, stock, description, category_id,
                   is_active, created_at, updated_at
            FROM products
            ORDER BY id ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        let image_rows = sqlx::query_as::<_, ProductImageRow>(
            r"
            SELECT id, product_id, image, is_main
            FROM product_images
            ORDER BY is_main DESC, id ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        let mut images_by_product: HashMap<i32, Vec<ProductImage>> = HashMap::new();
        for row in image_rows {
            images_by_product
                .entry(row.product_id)
                .or_default()
                .push(row.into());
        }

        rows.into_iter()
            .map(|row| {
                let id = row.id;
                Ok(ProductWithImages {
                    product: row.try_into()?,
                    images: images_by_product.remove(&id).unwrap_or_default(),
                })
            })
            .collect()
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, slug, price, stock, description, category_id,
                   is_active, created_at, updated_at
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Whether a product slug is already taken, optionally excluding one record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn slug_exists(
        &self,
        slug: &Slug,
        exclude: Option<ProductId>,
    ) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS (
                SELECT 1 FROM products
                WHERE slug = $1 AND ($2::int4 IS NULL OR id <> $2)
            )
            ",
        )
        .bind(slug.as_str())
        .bind(exclude.as_ref().map(ProductId::as_i32))
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Whether a category exists (for referential validation).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn category_exists(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let exists =
            sqlx::query_scalar::<_, bool>(r"SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1)")
                .bind(id.as_i32())
                .fetch_one(self.pool)
                .await?;

        Ok(exists)
    }

    /// Create a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug already exists or the
    /// category is gone (race not caught by pre-validation).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, fields: &ProductFields<'_>) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO products (name, slug, price, stock, description, category_id, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, slug, price, stock, description, category_id,
                      is_active, created_at, updated_at
            ",
        )
        .bind(fields.name)
        .bind(fields.slug.as_str())
        .bind(fields.price.amount())
        .bind(fields.stock)
        .bind(fields.description)
        .bind(fields.category_id.as_i32())
        .bind(fields.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if matches!(&e, sqlx::Error::Database(db) if db.is_foreign_key_violation()) {
                map_fk_violation(e, "category does not exist")
            } else {
                map_unique_violation(e, "product slug already exists")
            }
        })?;

        row.try_into()
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Conflict` on a slug or category race.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ProductId,
        fields: &ProductFields<'_>,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            UPDATE products
            SET name = $1, slug = $2, price = $3, stock = $4, description = $5,
                category_id = $6, is_active = $7, updated_at = now()
            WHERE id = $8
            RETURNING id, name, slug, price, stock, description, category_id,
                      is_active, created_at, updated_at
            ",
        )
        .bind(fields.name)
        .bind(fields.slug.as_str())
        .bind(fields.price.amount())
        .bind(fields.stock)
        .bind(fields.description)
        .bind(fields.category_id.as_i32())
        .bind(fields.is_active)
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| {
            if matches!(&e, sqlx::Error::Database(db) if db.is_foreign_key_violation()) {
                map_fk_violation(e, "category does not exist")
            } else {
                map_unique_violation(e, "product slug already exists")
            }
        })?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Delete a product (images cascade).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM products WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// List a product's images, main image first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_images(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ProductImage>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductImageRow>(
            r"
            SELECT id, product_id, image, is_main
            FROM product_images
            WHERE product_id = $1
            ORDER BY is_main DESC, id ASC
            ",
        )
        .bind(product_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Attach an image to a product.
    ///
    /// When `is_main` is set, the previous main image (if any) is demoted in
    /// the same transaction, keeping at most one main image per product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product is gone.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add_image(
        &self,
        product_id: ProductId,
        image: &str,
        is_main: bool,
    ) -> Result<ProductImage, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if is_main {
            clear_main_image(&mut tx, product_id).await?;
        }

        let row = sqlx::query_as::<_, ProductImageRow>(
            r"
            INSERT INTO product_images (product_id, image, is_main)
            VALUES ($1, $2, $3)
            RETURNING id, product_id, image, is_main
            ",
        )
        .bind(product_id.as_i32())
        .bind(image)
        .bind(is_main)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_fk_violation(e, "product does not exist"))?;

        tx.commit().await?;

        Ok(row.into())
    }

    /// Make one image the product's main image, atomically clearing the flag
    /// on all of its siblings.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the image doesn't exist or
    /// doesn't belong to the product.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_main_image(
        &self,
        product_id: ProductId,
        image_id: ProductImageId,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        clear_main_image(&mut tx, product_id).await?;

        let result = sqlx::query(
            r"
            UPDATE product_images
            SET is_main = TRUE
            WHERE id = $1 AND product_id = $2
            ",
        )
        .bind(image_id.as_i32())
        .bind(product_id.as_i32())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Rolls back the clear above
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    /// Delete a product image. Ownership is verified.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the image doesn't exist or
    /// doesn't belong to the product.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete_image(
        &self,
        product_id: ProductId,
        image_id: ProductImageId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM product_images
            WHERE id = $1 AND product_id = $2
            ",
        )
        .bind(image_id.as_i32())
        .bind(product_id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Count all products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(r"SELECT COUNT(*) FROM products")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }
}

/// Demote the current main image of a product within an open transaction.
async fn clear_main_image(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    product_id: ProductId,
) -> Result<(), RepositoryError> {
    let conn: &mut PgConnection = &mut *tx;

    sqlx::query(
        r"
        UPDATE product_images
        SET is_main = FALSE
        WHERE product_id = $1 AND is_main = TRUE
        ",
    )
    .bind(product_id.as_i32())
    .execute(conn)
    .await?;

    Ok(())
}
