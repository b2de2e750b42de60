use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, AppResult},
    handlers::remove_stored_objects,
    models::{
        CreateSellingLinkRequest, SellingLinkWithTargets, UpdateSellingLinkRequest, UploadFolder,
    },
};

const PAGE: &str = "/selling-links";

#[utoipa::path(
    get,
    path = "/api/selling-links",
    responses(
        (status = 200, description = "Selling links with their targets", body = [SellingLinkWithTargets])
    )
)]
pub async fn list_selling_links(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<SellingLinkWithTargets>>> {
    user.require_page(PAGE)?;
    Ok(Json(state.repo.list_selling_links().await?))
}

#[utoipa::path(
    post,
    path = "/api/selling-links",
    request_body = CreateSellingLinkRequest,
    responses(
        (status = 201, description = "Created", body = SellingLinkWithTargets),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_selling_link(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateSellingLinkRequest>,
) -> AppResult<(StatusCode, Json<SellingLinkWithTargets>)> {
    user.require_page(PAGE)?;
    payload.validate()?;
    let link = state.repo.create_selling_link(payload).await?;
    Ok((StatusCode::CREATED, Json(link)))
}

/// update_selling_link
///
/// Partial update. `category_ids` / `item_ids`, when sent, replace the attachments.
#[utoipa::path(
    put,
    path = "/api/selling-links/{id}",
    params(("id" = i64, Path, description = "Selling link ID")),
    request_body = UpdateSellingLinkRequest,
    responses(
        (status = 200, description = "Updated", body = SellingLinkWithTargets),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_selling_link(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateSellingLinkRequest>,
) -> AppResult<Json<SellingLinkWithTargets>> {
    user.require_page(PAGE)?;
    payload.validate()?;
    state
        .repo
        .update_selling_link(id, payload)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Selling link"))
}

#[utoipa::path(
    delete,
    path = "/api/selling-links/{id}",
    params(("id" = i64, Path, description = "Selling link ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_selling_link(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    user.require_page(PAGE)?;

    let existing = state
        .repo
        .get_selling_link(id)
        .await?
        .ok_or(AppError::NotFound("Selling link"))?;

    remove_stored_objects(
        &state.storage,
        &UploadFolder::SellingLinks.prefix(None),
        existing.link.img_url.as_deref(),
    ).await?;

    if state.repo.delete_selling_link(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Selling link"))
    }
}
