use crate::{
    AppState,
    handlers::{categories, cover, me, navigation, selling_links, tokens, uploads, users},
};
use axum::{
    Router,
    routing::{delete, get, post, put},
};

/// Backoffice API behind the session layer.
///
/// Reads need any session. Writes check the caller's role against the ACL entry of the
/// page that owns the data (`/categories`, `/cover`, ...), inside the handler.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // --- Sidebar & self ---
        .route("/api/navigation", get(navigation::get_navigation))
        .route("/api/me", get(me::get_me).put(me::update_me))
        // --- Categories & items ---
        .route(
            "/api/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/api/categories/{id}",
            put(categories::update_category).delete(categories::delete_category),
        )
        .route("/api/categories/items", post(categories::create_item))
        .route(
            "/api/categories/items/{id}",
            put(categories::update_item).delete(categories::delete_item),
        )
        .route("/api/categories-search", get(categories::search_categories))
        // --- Cover ---
        .route("/api/cover", get(cover::list_cover).post(cover::create_cover))
        // Static segment wins over `{id}`.
        .route("/api/cover/reorder", put(cover::reorder_cover))
        .route(
            "/api/cover/{id}",
            put(cover::update_cover).delete(cover::delete_cover),
        )
        // --- Selling links ---
        .route(
            "/api/selling-links",
            get(selling_links::list_selling_links).post(selling_links::create_selling_link),
        )
        .route(
            "/api/selling-links/{id}",
            put(selling_links::update_selling_link).delete(selling_links::delete_selling_link),
        )
        // --- Experts type-ahead (used by product and link forms) ---
        .route("/api/experts-search", get(users::search_experts))
        // --- Profile API tokens ---
        .route(
            "/api/profile/tokens",
            get(tokens::list_tokens).post(tokens::create_token),
        )
        .route("/api/profile/tokens/{id}", delete(tokens::delete_token))
        // --- Direct-to-bucket uploads ---
        .route("/api/uploads/presigned", post(uploads::get_presigned_url))
}
