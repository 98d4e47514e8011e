//! Database seeding command.
//!
//! # Usage
//!
//! ```bash
//! # Permissions, roles, and categories
//! atelier seed
//!
//! # Additionally: demo products with images, carts, and orders
//! atelier seed --demo
//! ```
//!
//! Seeding is idempotent for base data: existing permissions, roles, and
//! categories are left alone.

use rand::Rng;
use rand::seq::IndexedRandom;
use rust_decimal::Decimal;
use sqlx::PgPool;

use atelier_admin::db::{
    CartRepository, CategoryRepository, OrderRepository, ProductRepository, RoleRepository,
    UserRepository, products::ProductFields,
};
use atelier_admin::models::ProductWithImages;
use atelier_core::{PermissionName, Price, Slug};

/// The full permission catalog.
const PERMISSIONS: &[&str] = &[
    "admin.access",
    "users.view",
    "users.create",
    "users.edit",
    "users.delete",
    "roles.view",
    "roles.create",
    "roles.edit",
    "roles.delete",
    "categories.view",
    "categories.create",
    "categories.edit",
    "categories.delete",
    "products.view",
    "products.create",
    "products.edit",
    "products.delete",
];

/// Seed categories, (name, slug).
const CATEGORIES: &[(&str, &str)] = &[
    ("T-Shirts", "t-shirts"),
    ("Shirts", "shirts"),
    ("Jeans", "jeans"),
    ("Pants", "pants"),
    ("Suits", "suits"),
    ("Jackets", "jackets"),
    ("Shoes", "shoes"),
    ("Accessories", "accessories"),
    ("Sportswear", "sportswear"),
    ("Underwear", "underwear"),
];

const PRODUCT_ADJECTIVES: &[&str] = &[
    "Linen", "Vintage", "Classic", "Slim", "Relaxed", "Urban", "Coastal", "Heritage",
];
const PRODUCT_KINDS: &[&str] = &["Jacket", "Sneakers", "Tee", "Jeans", "Hoodie", "Cap"];

const DEMO_PRODUCTS: usize = 30;
const DEMO_ORDERS: usize = 10;

/// Seed the database.
///
/// # Errors
///
/// Returns an error if the connection or any insert fails.
pub async fn run(demo: bool) -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    seed_permissions(&pool).await?;
    seed_roles(&pool).await?;
    seed_categories(&pool).await?;

    if demo {
        seed_products(&pool).await?;
        seed_carts(&pool).await?;
        seed_orders(&pool).await?;
    }

    tracing::info!("Seeding complete!");
    Ok(())
}

async fn seed_permissions(pool: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
    for name in PERMISSIONS {
        sqlx::query(
            r"
            INSERT INTO permissions (name)
            VALUES ($1)
            ON CONFLICT (name) DO NOTHING
            ",
        )
        .bind(name)
        .execute(pool)
        .await?;
    }

    tracing::info!(count = PERMISSIONS.len(), "permissions seeded");
    Ok(())
}

/// Create the system roles: "admin" holding every permission, "user" holding
/// none.
async fn seed_roles(pool: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let repo = RoleRepository::new(pool);

    if !repo.name_exists("admin", None).await? {
        let all = PERMISSIONS
            .iter()
            .map(|name| PermissionName::parse(name))
            .collect::<Result<Vec<_>, _>>()?;
        repo.create("admin", Some(&all)).await?;
        tracing::info!("role admin created with all permissions");
    }

    if !repo.name_exists("user", None).await? {
        repo.create("user", None).await?;
        tracing::info!("role user created");
    }

    Ok(())
}

async fn seed_categories(pool: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let repo = CategoryRepository::new(pool);

    for (name, slug) in CATEGORIES {
        let slug = Slug::parse(slug)?;
        if repo.slug_exists(&slug, None).await? {
            continue;
        }
        repo.create(name, &slug).await?;
    }

    tracing::info!(count = CATEGORIES.len(), "categories seeded");
    Ok(())
}

/// Demo products, each with one main image and two gallery images.
async fn seed_products(pool: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let categories = CategoryRepository::new(pool).list_all().await?;
    if categories.is_empty() {
        tracing::warn!("no categories to attach products to, skipping");
        return Ok(());
    }

    let repo = ProductRepository::new(pool);
    let mut rng = rand::rng();
    let mut created = 0_usize;

    for i in 0..DEMO_PRODUCTS {
        let adjective = PRODUCT_ADJECTIVES
            .choose(&mut rng)
            .copied()
            .unwrap_or("Classic");
        let kind = PRODUCT_KINDS.choose(&mut rng).copied().unwrap_or("Tee");

        let name = format!("{adjective} {kind}");
        let slug = Slug::parse(&format!(
            "{}-{}-{}",
            adjective.to_lowercase(),
            kind.to_lowercase(),
            i + 1
        ))?;

        if repo.slug_exists(&slug, None).await? {
            continue;
        }

        let category = categories.choose(&mut rng).ok_or("no categories")?;
        let price = Price::new(Decimal::new(rng.random_range(1000..=50_000), 2))?;
        let description = format!("{name} from the Atelier demo collection.");

        let product = repo
            .create(&ProductFields {
                name: &name,
                slug: &slug,
                price,
                stock: rng.random_range(0..=500),
                description: &description,
                category_id: category.id,
                is_active: true,
            })
            .await?;

        // 1 main image + 2 gallery images
        repo.add_image(
            product.id,
            &format!("https://img.atelier.example/products/{slug}-1.jpg"),
            true,
        )
        .await?;
        for n in 2..=3 {
            repo.add_image(
                product.id,
                &format!("https://img.atelier.example/products/{slug}-{n}.jpg"),
                false,
            )
            .await?;
        }

        created += 1;
    }

    tracing::info!(count = created, "demo products seeded");
    Ok(())
}

async fn seed_carts(pool: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let users = UserRepository::new(pool).list_all().await?;
    let products = ProductRepository::new(pool).list_all().await?;
    if users.is_empty() || products.is_empty() {
        tracing::warn!("no users or products, skipping cart seeding");
        return Ok(());
    }

    let repo = CartRepository::new(pool);
    let mut rng = rand::rng();

    for user in &users {
        let items = rng.random_range(0..=3);
        for _ in 0..items {
            let product = random_product(&products, &mut rng)?;
            repo.add(user.user.id, product.product.id, rng.random_range(1..=3))
                .await?;
        }
    }

    tracing::info!(users = users.len(), "demo carts seeded");
    Ok(())
}

/// Demo orders; totals are recomputed per item inside the repository.
async fn seed_orders(pool: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let users = UserRepository::new(pool).list_all().await?;
    let products = ProductRepository::new(pool).list_all().await?;
    if users.is_empty() || products.is_empty() {
        tracing::warn!("no users or products, skipping order seeding");
        return Ok(());
    }

    let repo = OrderRepository::new(pool);
    let mut rng = rand::rng();

    for _ in 0..DEMO_ORDERS {
        let user = users.choose(&mut rng).ok_or("no users")?;
        let order = repo.create(user.user.id).await?;

        let items = rng.random_range(1..=4);
        for _ in 0..items {
            let product = random_product(&products, &mut rng)?;
            repo.add_item(
                order.id,
                product.product.id,
                rng.random_range(1..=3),
                product.product.price,
            )
            .await?;
        }
    }

    tracing::info!(count = DEMO_ORDERS, "demo orders seeded");
    Ok(())
}

fn random_product<'a>(
    products: &'a [ProductWithImages],
    rng: &mut impl Rng,
) -> Result<&'a ProductWithImages, Box<dyn std::error::Error>> {
    products.choose(rng).ok_or_else(|| "no products".into())
}
