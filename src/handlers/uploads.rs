use axum::{Json, extract::State};
use uuid::Uuid;

use crate::{
    AppState,
    acl::Role,
    auth::AuthUser,
    error::{AppError, AppResult},
    models::{PresignedUrlRequest, PresignedUrlResponse, UploadFolder},
    storage::sanitize_key,
};

/// Page whose role list governs uploads into `folder`.
fn folder_page(folder: UploadFolder) -> &'static str {
    match folder {
        UploadFolder::Products => "/products",
        UploadFolder::Cover => "/cover",
        UploadFolder::Profiles => "/profile",
        UploadFolder::SellingLinks => "/selling-links",
        UploadFolder::Categories => "/categories",
    }
}

/// object_key
///
/// Storage key for a new upload:
/// `products/{product_id}/…`, `profiles/{user_id}/…`, or directly under `cover/`,
/// `selling-links/` or `categories/`; always ending in a fresh UUID plus the original
/// extension.
pub fn object_key(
    folder: UploadFolder,
    product_id: Option<i64>,
    user_id: Uuid,
    filename: &str,
) -> AppResult<String> {
    let extension = std::path::Path::new(filename)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| "bin".to_string());
    let name = format!("{}.{}", Uuid::new_v4(), extension);

    let key = match folder {
        UploadFolder::Products => {
            let product_id = product_id.ok_or_else(|| {
                AppError::Validation("product_id is required for product uploads".to_string())
            })?;
            format!("{}{name}", folder.prefix(Some(product_id)))
        }
        UploadFolder::Profiles => format!("profiles/{user_id}/{name}"),
        UploadFolder::Cover | UploadFolder::SellingLinks | UploadFolder::Categories => {
            format!("{}{name}", folder.prefix(None))
        }
    };
    Ok(sanitize_key(&key))
}

/// Product uploads land in the product's own folder, so only its owner may sign them.
/// Super admins manage every brand's catalogue.
async fn require_product_owner(
    state: &AppState,
    user: &AuthUser,
    product_id: i64,
) -> AppResult<()> {
    let product = state
        .repo
        .get_product(product_id)
        .await?
        .ok_or(AppError::NotFound("Product"))?;
    if product.product.profile_id != user.profile_id() && user.role() != Some(Role::SuperAdmin) {
        tracing::warn!(user_id = %user.user_id, product_id, "upload into foreign product refused");
        return Err(AppError::Forbidden(
            "You can only upload images for your own products".to_string(),
        ));
    }
    Ok(())
}

/// get_presigned_url
///
/// Signs a direct browser-to-bucket upload and returns the public URL the row should store.
#[utoipa::path(
    post,
    path = "/api/uploads/presigned",
    request_body = PresignedUrlRequest,
    responses(
        (status = 200, description = "Upload URL", body = PresignedUrlResponse),
        (status = 400, description = "Missing product_id"),
        (status = 403, description = "Role cannot upload into this folder, or product not yours"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn get_presigned_url(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<PresignedUrlRequest>,
) -> AppResult<Json<PresignedUrlResponse>> {
    user.require_page(folder_page(payload.folder))?;
    if let (UploadFolder::Products, Some(product_id)) = (payload.folder, payload.product_id) {
        require_product_owner(&state, &user, product_id).await?;
    }

    let key = object_key(payload.folder, payload.product_id, user.user_id, &payload.filename)?;

    let upload_url = state
        .storage
        .get_presigned_upload_url(&key, &payload.file_type)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, key = %key, "presign failed");
            AppError::Internal("Failed to sign upload".to_string())
        })?;

    Ok(Json(PresignedUrlResponse {
        upload_url,
        public_url: state.storage.public_url(&key),
        resource_key: key,
    }))
}
