use axum::{Json, extract::State};
use validator::Validate;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, AppResult},
    models::{Profile, UpdateMeRequest},
};

#[utoipa::path(
    get,
    path = "/api/me",
    responses((status = 200, description = "Your profile", body = Profile))
)]
pub async fn get_me(user: AuthUser) -> Json<Profile> {
    Json(user.profile)
}

/// update_me
///
/// Self-service edit of name, bio and avatar.
#[utoipa::path(
    put,
    path = "/api/me",
    request_body = UpdateMeRequest,
    responses((status = 200, description = "Updated", body = Profile))
)]
pub async fn update_me(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateMeRequest>,
) -> AppResult<Json<Profile>> {
    payload.validate()?;
    state
        .repo
        .update_profile(user.user_id, payload.into())
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Profile"))
}
