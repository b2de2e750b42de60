use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, AppResult},
    handlers::{SearchQuery, remove_stored_objects},
    models::{
        Category, CategoryItem, CategorySearchHit, CategoryTree, CreateCategoryItemRequest,
        CreateCategoryRequest, UpdateCategoryItemRequest, UpdateCategoryRequest, UploadFolder,
    },
};

const PAGE: &str = "/categories";

#[utoipa::path(
    get,
    path = "/api/categories",
    responses((status = 200, description = "Categories with their items", body = CategoryTree))
)]
pub async fn list_categories(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<CategoryTree>> {
    Ok(Json(state.repo.list_categories().await?))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Created", body = Category),
        (status = 403, description = "Role cannot manage categories")
    )
)]
pub async fn create_category(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<Category>)> {
    user.require_page(PAGE)?;
    payload.validate()?;
    let category = state.repo.create_category(payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(("id" = i64, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Updated", body = Category),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_category(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> AppResult<Json<Category>> {
    user.require_page(PAGE)?;
    payload.validate()?;
    state
        .repo
        .update_category(id, payload)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Category"))
}

/// delete_category
///
/// Deletes the category. Its items stay, moved to "uncategorized".
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = i64, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_category(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    user.require_page(PAGE)?;
    if state.repo.delete_category(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Category"))
    }
}

#[utoipa::path(
    post,
    path = "/api/categories/items",
    request_body = CreateCategoryItemRequest,
    responses((status = 201, description = "Created", body = CategoryItem))
)]
pub async fn create_item(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryItemRequest>,
) -> AppResult<(StatusCode, Json<CategoryItem>)> {
    user.require_page(PAGE)?;
    payload.validate()?;
    let item = state.repo.create_category_item(payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    put,
    path = "/api/categories/items/{id}",
    params(("id" = i64, Path, description = "Item ID")),
    request_body = UpdateCategoryItemRequest,
    responses(
        (status = 200, description = "Updated", body = CategoryItem),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_item(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCategoryItemRequest>,
) -> AppResult<Json<CategoryItem>> {
    user.require_page(PAGE)?;
    payload.validate()?;
    state
        .repo
        .update_category_item(id, payload)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Item"))
}

/// delete_item
///
/// Removes the item's image from storage, then the item.
#[utoipa::path(
    delete,
    path = "/api/categories/items/{id}",
    params(("id" = i64, Path, description = "Item ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_item(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    user.require_page(PAGE)?;

    let item = state
        .repo
        .get_category_item(id)
        .await?
        .ok_or(AppError::NotFound("Item"))?;

    remove_stored_objects(
        &state.storage,
        &UploadFolder::Categories.prefix(None),
        item.image_url.as_deref(),
    )
    .await?;

    if state.repo.delete_category_item(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Item"))
    }
}

/// search_categories
///
/// Type-ahead over category and item names. A blank query returns no hits.
#[utoipa::path(
    get,
    path = "/api/categories-search",
    params(SearchQuery),
    responses((status = 200, description = "Matches", body = [CategorySearchHit]))
)]
pub async fn search_categories(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<CategorySearchHit>>> {
    let Some(term) = query.term() else {
        return Ok(Json(Vec::new()));
    };
    let hits = state.repo.search_categories(term, query.limit()).await?;
    Ok(Json(hits))
}
