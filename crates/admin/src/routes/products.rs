//! Product management route handlers.
//!
//! Includes image management: attaching, choosing the main image (the flag is
//! swapped atomically across siblings), and removal.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
};
use serde::Deserialize;
use tracing::instrument;

use atelier_core::{ProductId, ProductImageId};

use crate::{
    authz,
    db::{ProductRepository, products::ProductFields},
    error::{AppError, Result},
    middleware::OptionalPrincipal,
    models::{Product, ProductImage, ProductWithImages},
    routes::response::ActionResponse,
    state::AppState,
    validate::{self, ProductInput, ValidatedProduct},
};

const GATE: &str = "products.view";

/// Build the product router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index).post(store))
        .route("/{id}", patch(update).delete(destroy))
        .route("/{id}/images", post(store_image))
        .route("/{id}/images/{image_id}", delete(destroy_image))
        .route("/{id}/images/{image_id}/main", patch(set_main_image))
}

fn fields(valid: &ValidatedProduct) -> ProductFields<'_> {
    ProductFields {
        name: valid.name.as_str(),
        slug: &valid.slug,
        price: valid.price,
        stock: valid.stock,
        description: valid.description.as_str(),
        category_id: valid.category_id,
        is_active: valid.is_active,
    }
}

/// List all products with their images.
#[instrument(skip(principal, state))]
pub async fn index(
    OptionalPrincipal(principal): OptionalPrincipal,
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductWithImages>>> {
    authz::authorize_admin(principal.as_ref(), GATE)?;

    let repo = ProductRepository::new(state.pool());
    Ok(Json(repo.list_all().await?))
}

/// Create a product.
#[instrument(skip(principal, state, input))]
pub async fn store(
    OptionalPrincipal(principal): OptionalPrincipal,
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<ActionResponse<Product>>)> {
    authz::authorize_admin(principal.as_ref(), GATE)?;

    let repo = ProductRepository::new(state.pool());
    let valid = validate::product::validate(&repo, &input, None).await?;
    let product = repo.create(&fields(&valid)).await?;

    tracing::info!(product_id = %product.id, "product created");

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::created("Product", product)),
    ))
}

/// Update a product.
#[instrument(skip(principal, state, input))]
pub async fn update(
    OptionalPrincipal(principal): OptionalPrincipal,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(input): Json<ProductInput>,
) -> Result<Json<ActionResponse<Product>>> {
    authz::authorize_admin(principal.as_ref(), GATE)?;

    let repo = ProductRepository::new(state.pool());
    let valid = validate::product::validate(&repo, &input, Some(id)).await?;
    let product = repo.update(id, &fields(&valid)).await?;

    Ok(Json(ActionResponse::updated("Product", product)))
}

/// Delete a product (its images cascade).
#[instrument(skip(principal, state))]
pub async fn destroy(
    OptionalPrincipal(principal): OptionalPrincipal,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ActionResponse<()>>> {
    authz::authorize_admin(principal.as_ref(), GATE)?;

    let repo = ProductRepository::new(state.pool());
    repo.delete(id).await?;

    Ok(Json(ActionResponse::deleted("Product")))
}

/// Incoming product image payload.
#[derive(Debug, Deserialize)]
pub struct ProductImageInput {
    pub image: Option<String>,
    #[serde(default)]
    pub is_main: bool,
}

/// Attach an image to a product.
#[instrument(skip(principal, state, input))]
pub async fn store_image(
    OptionalPrincipal(principal): OptionalPrincipal,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(input): Json<ProductImageInput>,
) -> Result<(StatusCode, Json<ActionResponse<ProductImage>>)> {
    authz::authorize_admin(principal.as_ref(), GATE)?;

    let Some(image) = input.image.as_deref().filter(|i| !i.trim().is_empty()) else {
        let mut errors = crate::validate::ValidationErrors::new();
        errors.add("image", "The image field is required.");
        return Err(AppError::Validation(errors));
    };

    let repo = ProductRepository::new(state.pool());
    let image = repo.add_image(id, image, input.is_main).await?;

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::created("Product image", image)),
    ))
}

/// Make an image the product's main image, clearing the flag on siblings.
#[instrument(skip(principal, state))]
pub async fn set_main_image(
    OptionalPrincipal(principal): OptionalPrincipal,
    State(state): State<AppState>,
    Path((id, image_id)): Path<(ProductId, ProductImageId)>,
) -> Result<Json<ActionResponse<()>>> {
    authz::authorize_admin(principal.as_ref(), GATE)?;

    let repo = ProductRepository::new(state.pool());
    repo.set_main_image(id, image_id).await?;

    Ok(Json(ActionResponse {
        success: true,
        message: "Product image updated successfully.".to_owned(),
        data: None,
    }))
}

/// Delete a product image.
#[instrument(skip(principal, state))]
pub async fn destroy_image(
    OptionalPrincipal(principal): OptionalPrincipal,
    State(state): State<AppState>,
    Path((id, image_id)): Path<(ProductId, ProductImageId)>,
) -> Result<Json<ActionResponse<()>>> {
    authz::authorize_admin(principal.as_ref(), GATE)?;

    let repo = ProductRepository::new(state.pool());
    repo.delete_image(id, image_id).await?;

    Ok(Json(ActionResponse::deleted("Product image")))
}
