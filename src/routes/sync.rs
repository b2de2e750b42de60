use crate::{AppState, handlers::products};
use axum::{Router, routing::get};

/// Products sync API.
///
/// Authenticated per request by the `ApiClient` extractor (profile bearer token), not by the
/// browser session.
pub fn sync_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/api/products/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
}
