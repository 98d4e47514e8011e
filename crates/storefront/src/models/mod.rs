//! Read models for the public storefront.
//!
//! The storefront never mutates the catalog; these types are view-shaped and
//! carry only what the public pages need.

use serde::Serialize;

use atelier_core::{CategoryId, Price, ProductId, Slug};

/// A category as shown in public listings.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: Slug,
}

/// An active product as shown on a category page.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: Slug,
    pub price: Price,
    pub stock: i32,
    pub description: String,
    /// The product's main image, when one is set.
    pub image: Option<String>,
}

/// A category page: the category plus its active products.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryPage {
    #[serde(flatten)]
    pub category: Category,
    pub products: Vec<Product>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_category_page_flattens_category() {
        let page = CategoryPage {
            category: Category {
                id: CategoryId::new(7),
                name: "Shoes".to_owned(),
                slug: Slug::parse("shoes").unwrap(),
            },
            products: vec![],
        };

        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["id"], serde_json::json!(7));
        assert_eq!(json["slug"], serde_json::json!("shoes"));
        assert!(json["products"].as_array().unwrap().is_empty());
    }
}
