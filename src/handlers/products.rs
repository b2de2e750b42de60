use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::{
    AppState,
    auth::ApiClient,
    error::{AppError, AppResult},
    handlers::remove_stored_objects,
    models::{
        CreateProductRequest, ProductPage, ProductWithImages, UpdateProductRequest, UploadFolder,
    },
    pagination::Pagination,
};

/// Loads a product the calling token is allowed to modify.
///
/// Missing → 404. Owned by another profile → 403.
async fn owned_product(
    state: &AppState,
    client: &ApiClient,
    id: i64,
) -> AppResult<ProductWithImages> {
    let product = state
        .repo
        .get_product(id)
        .await?
        .ok_or(AppError::NotFound("Product"))?;
    if product.product.profile_id != client.profile_id {
        tracing::warn!(product_id = id, token_id = client.token_id, "product owner mismatch");
        return Err(AppError::Forbidden(
            "This token does not own the product".to_string(),
        ));
    }
    Ok(product)
}

/// list_products
///
/// Paginated products of the profile the bearer token belongs to.
#[utoipa::path(
    get,
    path = "/api/products",
    params(Pagination),
    responses(
        (status = 200, description = "Products of the token's profile", body = ProductPage),
        (status = 401, description = "Missing or unknown token")
    )
)]
pub async fn list_products(
    client: ApiClient,
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> AppResult<Json<ProductPage>> {
    let (items, total) = state.repo.list_products(client.profile_id, &page).await?;
    Ok(Json(ProductPage {
        items,
        meta: page.meta(total),
    }))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Created", body = ProductWithImages),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Missing or unknown token")
    )
)]
pub async fn create_product(
    client: ApiClient,
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ProductWithImages>)> {
    payload.validate()?;
    let product = state
        .repo
        .create_product(client.profile_id, payload.normalized())
        .await?;
    tracing::info!(product_id = product.product.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = i64, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Found", body = ProductWithImages),
        (status = 404, description = "Not found for this token")
    )
)]
pub async fn get_product(
    client: ApiClient,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ProductWithImages>> {
    // Other profiles' products are reported as missing rather than forbidden.
    state
        .repo
        .get_product(id)
        .await?
        .filter(|p| p.product.profile_id == client.profile_id)
        .map(Json)
        .ok_or(AppError::NotFound("Product"))
}

/// update_product
///
/// Partial update. The token must belong to the product's owning profile.
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = i64, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Updated", body = ProductWithImages),
        (status = 403, description = "Token does not own the product"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_product(
    client: ApiClient,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ProductWithImages>> {
    payload.validate()?;
    owned_product(&state, &client, id).await?;

    state
        .repo
        .update_product(id, payload.normalized())
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Product"))
}

/// delete_product
///
/// Removes the image files, then the image rows, then the product. The steps are not
/// transactional: a failure part-way leaves what was not yet deleted.
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = i64, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Token does not own the product"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_product(
    client: ApiClient,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    let product = owned_product(&state, &client, id).await?;

    // Only this product's folder; image URLs are caller-supplied.
    remove_stored_objects(
        &state.storage,
        &UploadFolder::Products.prefix(Some(id)),
        product.images.iter().map(|image| image.img_url.as_str()),
    )
    .await?;
    state.repo.delete_product_images(id).await?;

    if !state.repo.delete_product(id).await? {
        return Err(AppError::NotFound("Product"));
    }
    tracing::info!(product_id = id, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}
