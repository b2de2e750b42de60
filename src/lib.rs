use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware::from_fn_with_state,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Access control and the services behind the API.
pub mod acl;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod storage;

// Route tables, split by how callers authenticate.
pub mod routes;
use routes::{admin, authenticated, public, sync};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use identity::{IdentityState, MockIdentityService, SupabaseAuthClient};
pub use repository::{PostgresRepository, RepositoryState};
pub use storage::{MockStorageService, S3StorageClient, StorageState};

/// ApiDoc
///
/// OpenAPI document for every `/api` handler, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::session::set_session, handlers::session::clear_session,
        handlers::navigation::get_navigation, handlers::me::get_me, handlers::me::update_me,
        handlers::categories::list_categories, handlers::categories::create_category,
        handlers::categories::update_category, handlers::categories::delete_category,
        handlers::categories::create_item, handlers::categories::update_item,
        handlers::categories::delete_item, handlers::categories::search_categories,
        handlers::cover::list_cover, handlers::cover::create_cover, handlers::cover::update_cover,
        handlers::cover::reorder_cover, handlers::cover::delete_cover,
        handlers::selling_links::list_selling_links, handlers::selling_links::create_selling_link,
        handlers::selling_links::update_selling_link, handlers::selling_links::delete_selling_link,
        handlers::products::list_products, handlers::products::create_product,
        handlers::products::get_product, handlers::products::update_product,
        handlers::products::delete_product,
        handlers::users::list_users, handlers::users::create_user, handlers::users::update_user,
        handlers::users::delete_user, handlers::users::toggle_status,
        handlers::users::reset_password, handlers::users::search_experts,
        handlers::tokens::list_tokens, handlers::tokens::create_token,
        handlers::tokens::delete_token,
        handlers::uploads::get_presigned_url
    ),
    components(
        schemas(
            acl::Role, acl::NavPosition, acl::NavEntry, pagination::PageMeta,
            models::Profile, models::CreateUserRequest, models::UpdateProfileRequest,
            models::UpdateMeRequest, models::ProfilePage, models::ToggleStatusRequest,
            models::ResetPasswordRequest, models::ProfileTokenSummary, models::ProfileToken,
            models::CreateTokenRequest, models::Product, models::ProductImage,
            models::ProductWithImages, models::ProductPage, models::CreateProductRequest,
            models::UpdateProductRequest, models::Category, models::CategoryItem,
            models::CategoryWithItems, models::CategoryTree, models::CreateCategoryRequest,
            models::UpdateCategoryRequest, models::CreateCategoryItemRequest,
            models::UpdateCategoryItemRequest, models::SearchKind, models::CategorySearchHit,
            models::CoverItem, models::CreateCoverRequest, models::UpdateCoverRequest,
            models::ReorderCoverRequest, models::SellingLink, models::SellingLinkWithTargets,
            models::CreateSellingLinkRequest, models::UpdateSellingLinkRequest,
            models::SetSessionRequest, models::SessionResponse, models::NavigationResponse,
            models::UploadFolder, models::PresignedUrlRequest, models::PresignedUrlResponse,
        )
    ),
    tags(
        (name = "ilpdg-backoffice", description = "ilPDG backoffice API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Services and configuration shared by every request.
#[derive(Clone)]
pub struct AppState {
    /// Postgres (or in-memory, in tests) data access.
    pub repo: RepositoryState,
    /// Bucket access and presigned uploads.
    pub storage: StorageState,
    /// Auth admin API: account creation, bans, password recovery.
    pub identity: IdentityState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for IdentityState {
    fn from_ref(app_state: &AppState) -> IdentityState {
        app_state.identity.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the API routes, the session layers and the page-gated UI fallback.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    // Built UI. Unknown paths get index.html so client-side routing works; every page
    // request passes the session gate first.
    let index = std::path::Path::new(&state.config.ui_dir).join("index.html");
    let ui = Router::new()
        .fallback_service(ServeDir::new(&state.config.ui_dir).fallback(ServeFile::new(index)))
        .layer(from_fn_with_state(state.clone(), middleware::page_gate));

    let session_layer = from_fn_with_state(state.clone(), middleware::require_session);

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        // Session routes: the layer resolves the caller once; handlers re-check roles.
        .merge(authenticated::authenticated_routes().route_layer(session_layer.clone()))
        .merge(admin::admin_routes().route_layer(session_layer))
        // Token-authenticated; the extractor does the work.
        .merge(sync::sync_routes())
        .fallback_service(ui)
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// Span for one request, tagged with its `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
