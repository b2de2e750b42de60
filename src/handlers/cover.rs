use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::collections::HashSet;
use validator::Validate;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, AppResult},
    handlers::remove_stored_objects,
    models::{
        CoverItem, CreateCoverRequest, ReorderCoverRequest, UpdateCoverRequest, UploadFolder,
    },
};

const PAGE: &str = "/cover";

#[utoipa::path(
    get,
    path = "/api/cover",
    responses((status = 200, description = "Cover items in display order", body = [CoverItem]))
)]
pub async fn list_cover(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CoverItem>>> {
    Ok(Json(state.repo.list_cover().await?))
}

#[utoipa::path(
    post,
    path = "/api/cover",
    request_body = CreateCoverRequest,
    responses(
        (status = 201, description = "Created at the end of the order", body = CoverItem),
        (status = 403, description = "Role cannot manage the cover")
    )
)]
pub async fn create_cover(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateCoverRequest>,
) -> AppResult<(StatusCode, Json<CoverItem>)> {
    user.require_page(PAGE)?;
    payload.validate()?;
    let cover = state.repo.create_cover(payload).await?;
    Ok((StatusCode::CREATED, Json(cover)))
}

#[utoipa::path(
    put,
    path = "/api/cover/{id}",
    params(("id" = i64, Path, description = "Cover ID")),
    request_body = UpdateCoverRequest,
    responses(
        (status = 200, description = "Updated", body = CoverItem),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_cover(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCoverRequest>,
) -> AppResult<Json<CoverItem>> {
    user.require_page(PAGE)?;
    payload.validate()?;
    state
        .repo
        .update_cover(id, payload)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Cover item"))
}

/// reorder_cover
///
/// Rewrites the manual order: each id gets its index in `ids`. Returns the new listing.
#[utoipa::path(
    put,
    path = "/api/cover/reorder",
    request_body = ReorderCoverRequest,
    responses(
        (status = 200, description = "Reordered", body = [CoverItem]),
        (status = 400, description = "Unknown or duplicate ids")
    )
)]
pub async fn reorder_cover(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ReorderCoverRequest>,
) -> AppResult<Json<Vec<CoverItem>>> {
    user.require_page(PAGE)?;

    let unique: HashSet<i64> = payload.ids.iter().copied().collect();
    if unique.len() != payload.ids.len() {
        return Err(AppError::Validation(
            "Reorder list contains duplicate ids".to_string(),
        ));
    }

    state.repo.reorder_cover(&payload.ids).await?;
    Ok(Json(state.repo.list_cover().await?))
}

#[utoipa::path(
    delete,
    path = "/api/cover/{id}",
    params(("id" = i64, Path, description = "Cover ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_cover(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    user.require_page(PAGE)?;

    let cover = state
        .repo
        .get_cover(id)
        .await?
        .ok_or(AppError::NotFound("Cover item"))?;

    remove_stored_objects(
        &state.storage,
        &UploadFolder::Cover.prefix(None),
        [cover.image_url.as_str()],
    ).await?;

    if state.repo.delete_cover(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Cover item"))
    }
}
