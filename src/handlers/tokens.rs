use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, AppResult},
    models::{CreateTokenRequest, ProfileToken, ProfileTokenSummary},
};

const PAGE: &str = "/profile/tokens";
pub const TOKEN_PREFIX: &str = "pdg_";

/// A fresh opaque token: prefix plus 64 hex characters of randomness.
pub fn generate_token() -> String {
    format!(
        "{TOKEN_PREFIX}{}{}",
        Uuid::new_v4().simple(),
        Uuid::new_v4().simple()
    )
}

#[utoipa::path(
    get,
    path = "/api/profile/tokens",
    responses((status = 200, description = "Your tokens, without secrets", body = [ProfileTokenSummary]))
)]
pub async fn list_tokens(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ProfileTokenSummary>>> {
    user.require_page(PAGE)?;
    Ok(Json(state.repo.list_tokens(user.profile_id()).await?))
}

/// create_token
///
/// The response is the only time the token value is disclosed.
#[utoipa::path(
    post,
    path = "/api/profile/tokens",
    request_body = CreateTokenRequest,
    responses((status = 201, description = "Created; token shown once", body = ProfileToken))
)]
pub async fn create_token(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateTokenRequest>,
) -> AppResult<(StatusCode, Json<ProfileToken>)> {
    user.require_page(PAGE)?;
    payload.validate()?;

    let token = state
        .repo
        .create_token(user.profile_id(), payload.nome.trim(), &generate_token())
        .await?;
    tracing::info!(token_id = token.id, profile_id = %token.profile_id, "api token issued");
    Ok((StatusCode::CREATED, Json(token)))
}

#[utoipa::path(
    delete,
    path = "/api/profile/tokens/{id}",
    params(("id" = i64, Path, description = "Token ID")),
    responses(
        (status = 204, description = "Revoked"),
        (status = 404, description = "Not found among your tokens")
    )
)]
pub async fn delete_token(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    user.require_page(PAGE)?;
    if state.repo.delete_token(id, user.profile_id()).await? {
        tracing::info!(token_id = id, "api token revoked");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Token"))
    }
}
