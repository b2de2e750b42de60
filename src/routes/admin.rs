use crate::{AppState, handlers::users};
use axum::{
    Router,
    routing::{get, post, put},
};

/// User management.
///
/// Mounted behind the session layer; every handler refuses roles the ACL does not allow on
/// `/users`.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route("/api/users/toggle-status", post(users::toggle_status))
        .route("/api/users/reset-password", post(users::reset_password))
        .route(
            "/api/users/{user_id}",
            put(users::update_user).delete(users::delete_user),
        )
}
