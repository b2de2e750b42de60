use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    acl::Role,
    auth::AuthUser,
    error::{AppError, AppResult},
    handlers::SearchQuery,
    models::{
        CreateUserRequest, NewProfile, Profile, ProfilePage, ResetPasswordRequest,
        ToggleStatusRequest, UpdateProfileRequest,
    },
    pagination::Pagination,
    repository::UserFilter,
};

const PAGE: &str = "/users";

/// UsersQuery
///
/// Query string of the users listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UsersQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Case-insensitive substring of the name.
    pub search: Option<String>,
    /// Exact role, e.g. `brand`.
    pub role: Option<String>,
}

impl UsersQuery {
    fn split(self) -> AppResult<(UserFilter, Pagination)> {
        let role = match self.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            Some(raw) => Some(raw.parse::<Role>().map_err(AppError::Validation)?),
            None => None,
        };
        Ok((
            UserFilter {
                search: self.search,
                role,
            },
            Pagination {
                page: self.page,
                per_page: self.per_page,
            },
        ))
    }
}

fn identity_error(e: String) -> AppError {
    AppError::Backend(e)
}

#[utoipa::path(
    get,
    path = "/api/users",
    params(UsersQuery),
    responses(
        (status = 200, description = "Profiles", body = ProfilePage),
        (status = 403, description = "Role cannot manage users")
    )
)]
pub async fn list_users(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<UsersQuery>,
) -> AppResult<Json<ProfilePage>> {
    user.require_page(PAGE)?;
    let (filter, page) = query.split()?;
    let (items, total) = state.repo.list_profiles(&filter, &page).await?;
    Ok(Json(ProfilePage {
        items,
        meta: page.meta(total),
    }))
}

/// create_user
///
/// Creates the auth identity, then the profile. If the profile insert fails the freshly
/// created identity is removed again so the email can be reused.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Created", body = Profile),
        (status = 400, description = "Validation or auth service error")
    )
)]
pub async fn create_user(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<Profile>)> {
    user.require_page(PAGE)?;
    payload.validate()?;
    guard_role_grant(&user, payload.role)?;

    let user_id = state
        .identity
        .create_user(payload.email.trim(), &payload.password)
        .await
        .map_err(identity_error)?;

    let new_profile = NewProfile {
        user_id,
        nome: payload.nome.trim().to_string(),
        bio: payload.bio,
        role: payload.role,
    };

    match state.repo.create_profile(new_profile).await {
        Ok(profile) => {
            tracing::info!(%user_id, role = %payload.role, "user created");
            Ok((StatusCode::CREATED, Json(profile)))
        }
        Err(e) => {
            if let Err(cleanup) = state.identity.delete_user(user_id).await {
                tracing::error!(%user_id, error = %cleanup, "orphaned auth user");
            }
            Err(e)
        }
    }
}

/// Only a super admin may hand out the super admin role.
fn guard_role_grant(user: &AuthUser, role: Role) -> AppResult<()> {
    if role == Role::SuperAdmin && user.role() != Some(Role::SuperAdmin) {
        return Err(AppError::Forbidden(
            "Only a super admin can grant the super_admin role".to_string(),
        ));
    }
    Ok(())
}

#[utoipa::path(
    put,
    path = "/api/users/{user_id}",
    params(("user_id" = Uuid, Path, description = "Auth user ID")),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated", body = Profile),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_user(
    user: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<Profile>> {
    user.require_page(PAGE)?;
    payload.validate()?;
    if let Some(role) = payload.role {
        guard_role_grant(&user, role)?;
    }

    state
        .repo
        .update_profile(user_id, payload)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("User"))
}

/// delete_user
///
/// Deletes the profile row, then the auth identity.
#[utoipa::path(
    delete,
    path = "/api/users/{user_id}",
    params(("user_id" = Uuid, Path, description = "Auth user ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Attempt to delete yourself"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_user(
    user: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require_page(PAGE)?;
    if user_id == user.user_id {
        return Err(AppError::Validation("You cannot delete yourself".to_string()));
    }

    if !state.repo.delete_profile(user_id).await? {
        return Err(AppError::NotFound("User"));
    }
    state
        .identity
        .delete_user(user_id)
        .await
        .map_err(identity_error)?;

    tracing::info!(%user_id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// toggle_status
///
/// Disables (`active = false`) or re-enables a user's login.
#[utoipa::path(
    post,
    path = "/api/users/toggle-status",
    request_body = ToggleStatusRequest,
    responses(
        (status = 200, description = "Status applied", body = ToggleStatusRequest),
        (status = 404, description = "Not found")
    )
)]
pub async fn toggle_status(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ToggleStatusRequest>,
) -> AppResult<Json<ToggleStatusRequest>> {
    user.require_page(PAGE)?;
    if payload.user_id == user.user_id && !payload.active {
        return Err(AppError::Validation("You cannot disable yourself".to_string()));
    }
    state
        .repo
        .get_profile_by_user(payload.user_id)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    state
        .identity
        .set_banned(payload.user_id, !payload.active)
        .await
        .map_err(identity_error)?;

    tracing::info!(user_id = %payload.user_id, active = payload.active, "user status changed");
    Ok(Json(payload))
}

#[utoipa::path(
    post,
    path = "/api/users/reset-password",
    request_body = ResetPasswordRequest,
    responses((status = 200, description = "Recovery email sent"))
)]
pub async fn reset_password(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    user.require_page(PAGE)?;
    payload.validate()?;

    let redirect_to = format!("{}/reset-password", state.config.site_url.trim_end_matches('/'));
    state
        .identity
        .send_password_reset(payload.email.trim(), &redirect_to)
        .await
        .map_err(identity_error)?;
    Ok(StatusCode::OK)
}

/// search_experts
///
/// Type-ahead over profiles with the `expert` role.
#[utoipa::path(
    get,
    path = "/api/experts-search",
    params(SearchQuery),
    responses((status = 200, description = "Matching experts", body = [Profile]))
)]
pub async fn search_experts(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Profile>>> {
    let Some(term) = query.term() else {
        return Ok(Json(Vec::new()));
    };
    Ok(Json(state.repo.search_experts(term, query.limit()).await?))
}
