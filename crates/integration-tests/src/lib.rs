//! Integration tests for Atelier.
//!
//! # Running Tests
//!
//! The tests drive the real binaries over HTTP and inspect the database
//! directly, so they need:
//!
//! ```bash
//! # A running PostgreSQL with migrations + base seed applied
//! cargo run -p atelier-cli -- migrate
//! cargo run -p atelier-cli -- seed
//!
//! # The admin server, trusting the identity header so tests can act as users
//! ADMIN_TRUST_IDENTITY_HEADER=true cargo run -p atelier-admin
//!
//! # The storefront server
//! cargo run -p atelier-storefront
//!
//! # Then
//! cargo test -p atelier-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `ADMIN_BASE_URL` (default `http://localhost:3001`)
//! - `STOREFRONT_BASE_URL` (default `http://localhost:3000`)
//! - `ADMIN_DATABASE_URL` - for direct database assertions

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

use rand::Rng;
use reqwest::Client;
use secrecy::SecretString;
use sqlx::PgPool;

use atelier_admin::db::{self, UserRepository};
use atelier_admin::services::password;
use atelier_core::Email;

/// Header the admin trusts (when configured) for asserting the acting user.
pub const IDENTITY_HEADER: &str = "x-atelier-user-id";

/// Shared context for integration tests.
pub struct TestContext {
    pub client: Client,
    pub admin_url: String,
    pub storefront_url: String,
    pub pool: PgPool,
}

impl TestContext {
    /// Connect to the servers and database under test.
    pub async fn new() -> Self {
        let admin_url =
            std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string());
        let storefront_url = std::env::var("STOREFRONT_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let database_url = std::env::var("ADMIN_DATABASE_URL")
            .map(SecretString::from)
            .expect("ADMIN_DATABASE_URL must be set for integration tests");
        let pool = db::create_pool(&database_url)
            .await
            .expect("Failed to connect to test database");

        Self {
            client: Client::builder()
                .build()
                .expect("Failed to create HTTP client"),
            admin_url,
            storefront_url,
            pool,
        }
    }

    /// A unique email for test isolation.
    #[must_use]
    pub fn unique_email(prefix: &str) -> String {
        let n: u64 = rand::rng().random();
        format!("{prefix}-{n}@example.test")
    }

    /// Create a verified user holding the given role, returning their id.
    ///
    /// Goes straight through the repositories; the HTTP surface under test is
    /// exercised by the tests themselves.
    pub async fn create_verified_user(&self, prefix: &str, role: &str) -> i32 {
        let repo = UserRepository::new(&self.pool);
        let email = Email::parse(&Self::unique_email(prefix)).unwrap();
        let digest = password::hash_password(&SecretString::from("integration-test")).unwrap();

        let user = repo
            .create("Integration Test", &email, &digest, Some(role))
            .await
            .expect("Failed to create test user");
        repo.mark_verified(user.id)
            .await
            .expect("Failed to verify test user");

        user.id.as_i32()
    }

    /// GET an admin path acting as the given user.
    pub fn admin_get(&self, path: &str, user_id: i32) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}{path}", self.admin_url))
            .header(IDENTITY_HEADER, user_id.to_string())
    }

    /// POST an admin path acting as the given user.
    pub fn admin_post(&self, path: &str, user_id: i32) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}{path}", self.admin_url))
            .header(IDENTITY_HEADER, user_id.to_string())
    }

    /// PATCH an admin path acting as the given user.
    pub fn admin_patch(&self, path: &str, user_id: i32) -> reqwest::RequestBuilder {
        self.client
            .patch(format!("{}{path}", self.admin_url))
            .header(IDENTITY_HEADER, user_id.to_string())
    }

    /// DELETE an admin path acting as the given user.
    pub fn admin_delete(&self, path: &str, user_id: i32) -> reqwest::RequestBuilder {
        self.client
            .delete(format!("{}{path}", self.admin_url))
            .header(IDENTITY_HEADER, user_id.to_string())
    }

    /// Read a user's stored password digest (for no-overwrite assertions).
    pub async fn password_digest(&self, user_id: i32) -> String {
        sqlx::query_scalar::<_, String>("SELECT password_hash FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .expect("Failed to read password digest")
    }

    /// Count rows in a seeded table (for no-mutation assertions).
    pub async fn count_categories(&self) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await
            .expect("Failed to count categories")
    }
}
