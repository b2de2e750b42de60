use crate::{
    AppState,
    handlers::{self, session},
};
use axum::{
    Router,
    routing::{any, get, post},
};

/// Endpoints that need no session.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for the load balancer.
        .route("/health", get(|| async { "ok" }))
        // POST /api/auth/set-session  (login)
        // DELETE /api/auth/set-session (logout)
        .route(
            "/api/auth/set-session",
            post(session::set_session).delete(session::clear_session),
        )
        // Anything else under /api is a JSON 404, never the UI's index.html.
        .route("/api", any(handlers::unknown_api_route))
        .route("/api/{*rest}", any(handlers::unknown_api_route))
}
