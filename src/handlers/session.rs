use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{AppendHeaders, IntoResponse},
};

use crate::{
    AppState,
    auth::{ACCESS_COOKIE, REFRESH_COOKIE, verify_access_token},
    error::{AppError, AppResult},
    models::{SessionResponse, SetSessionRequest},
};

/// Lifetime of the session cookies. The JWT's own `exp` still bounds the access token.
pub const SESSION_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 7;

/// Builds a `Set-Cookie` value. `max_age = 0` clears the cookie.
pub fn session_cookie(name: &str, value: &str, max_age: i64, secure: bool) -> String {
    let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// set_session
///
/// Called by the login screen after the hosted auth service signs the user in. Verifies the
/// access token and stores both tokens as HttpOnly cookies for the page middleware.
#[utoipa::path(
    post,
    path = "/api/auth/set-session",
    request_body = SetSessionRequest,
    responses(
        (status = 200, description = "Session cookies set", body = SessionResponse),
        (status = 401, description = "Invalid token or no backoffice profile")
    )
)]
pub async fn set_session(
    State(state): State<AppState>,
    Json(payload): Json<SetSessionRequest>,
) -> AppResult<impl IntoResponse> {
    let user_id = verify_access_token(&payload.access_token, &state.config.jwt_secret)
        .map_err(|_| AppError::Unauthorized)?;

    let profile = state
        .repo
        .get_profile_by_user(user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let secure = state.config.is_production();
    // Both cookies share the header name; they must be appended, not inserted.
    let cookies = AppendHeaders([
        (
            header::SET_COOKIE,
            session_cookie(ACCESS_COOKIE, &payload.access_token, SESSION_MAX_AGE_SECS, secure),
        ),
        (
            header::SET_COOKIE,
            session_cookie(REFRESH_COOKIE, &payload.refresh_token, SESSION_MAX_AGE_SECS, secure),
        ),
    ]);

    tracing::info!(%user_id, "session established");
    Ok((
        cookies,
        Json(SessionResponse {
            user_id,
            role: profile.role(),
        }),
    ))
}

/// clear_session
///
/// Sign-out: expires both session cookies.
#[utoipa::path(
    delete,
    path = "/api/auth/set-session",
    responses((status = 204, description = "Session cookies cleared"))
)]
pub async fn clear_session(State(state): State<AppState>) -> impl IntoResponse {
    let secure = state.config.is_production();
    (
        StatusCode::NO_CONTENT,
        AppendHeaders([
            (header::SET_COOKIE, session_cookie(ACCESS_COOKIE, "", 0, secure)),
            (header::SET_COOKIE, session_cookie(REFRESH_COOKIE, "", 0, secure)),
        ]),
    )
}
