use axum::Json;

use crate::{acl, auth::AuthUser, models::NavigationResponse};

/// get_navigation
///
/// The sidebar for the signed-in user. An unknown role gets empty groups.
#[utoipa::path(
    get,
    path = "/api/navigation",
    responses(
        (status = 200, description = "Sidebar entries", body = NavigationResponse),
        (status = 401, description = "No session")
    )
)]
pub async fn get_navigation(user: AuthUser) -> Json<NavigationResponse> {
    let role = user.role();
    let nav = acl::navigation(role);
    Json(NavigationResponse {
        nome: user.profile.nome,
        img_url: user.profile.img_url,
        role,
        top: nav.top,
        bottom: nav.bottom,
    })
}
