use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{AppState, acl, auth::resolve_session};

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// Paths the page gate never touches.
fn bypasses_gate(path: &str) -> bool {
    path == "/health"
        || path.starts_with("/api/")
        || path == "/api"
        || path.starts_with("/swagger-ui")
        || path.starts_with("/api-docs")
        || path.starts_with("/assets/")
        || is_static_file(path)
}

/// Files at the bundle root (`/robots.txt`, `/logo.svg`) carry an extension; pages don't.
fn is_static_file(path: &str) -> bool {
    path.rsplit('/')
        .next()
        .is_some_and(|name| name.contains('.') && !name.starts_with('.'))
}

/// require_session
///
/// Front of every session API route: resolves the caller once and stores the `AuthUser`
/// in the request extensions for the handler's extractor. No session → 401.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let headers = request.headers().clone();
    match resolve_session(&headers, &state.repo, &state.config).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(status) => status.into_response(),
    }
}

/// page_gate
///
/// Session check for UI page requests:
/// - public pages pass, except `/login` with a live session, which goes home;
/// - no session redirects to `/login`;
/// - a role the ACL refuses for the page redirects home.
pub async fn page_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    if bypasses_gate(&path) {
        return next.run(request).await;
    }

    let headers = request.headers().clone();
    let session = resolve_session(&headers, &state.repo, &state.config).await;

    if acl::is_public_path(&path) {
        if session.is_ok() && path.trim_end_matches('/') == LOGIN_PATH {
            return Redirect::to(HOME_PATH).into_response();
        }
        return next.run(request).await;
    }

    match session {
        Ok(user) if acl::can_access(user.role(), &path) => next.run(request).await,
        Ok(user) => {
            tracing::debug!(user_id = %user.user_id, path = %path, "page refused by acl");
            if path == HOME_PATH {
                // Nowhere to bounce to; an unknown role cannot see the dashboard.
                StatusCode::FORBIDDEN.into_response()
            } else {
                Redirect::to(HOME_PATH).into_response()
            }
        }
        Err(StatusCode::UNAUTHORIZED) => Redirect::to(LOGIN_PATH).into_response(),
        Err(status) => status.into_response(),
    }
}
