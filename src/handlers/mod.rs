//! HTTP handlers, one module per backoffice resource.
//!
//! Every handler returns `AppResult`, so failures leave as `{"error": "..."}` with the
//! status chosen by `AppError`.

pub mod categories;
pub mod cover;
pub mod me;
pub mod navigation;
pub mod products;
pub mod selling_links;
pub mod session;
pub mod tokens;
pub mod uploads;
pub mod users;

use serde::Deserialize;
use utoipa::IntoParams;

use crate::{error::AppError, storage::StorageState};

pub const DEFAULT_SEARCH_LIMIT: u32 = 10;
pub const MAX_SEARCH_LIMIT: u32 = 50;

/// SearchQuery
///
/// Query string of the type-ahead endpoints.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive substring to look for.
    pub q: Option<String>,
    /// Maximum hits, 1 to 50.
    pub limit: Option<u32>,
}

impl SearchQuery {
    /// Trimmed query, `None` when blank.
    pub fn term(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_SEARCH_LIMIT)
            .clamp(1, MAX_SEARCH_LIMIT) as i64
    }
}

/// Unmatched `/api` paths.
pub async fn unknown_api_route() -> AppError {
    AppError::NotFound("Route")
}

/// Deletes the bucket objects behind `urls` that live under `prefix`. URLs outside our
/// bucket, or pointing into another record's folder, are skipped. Runs before the owning
/// rows are deleted; a failure stops the caller.
pub(crate) async fn remove_stored_objects<'a, I>(
    storage: &StorageState,
    prefix: &str,
    urls: I,
) -> Result<(), AppError>
where
    I: IntoIterator<Item = &'a str>,
{
    let keys: Vec<String> = urls
        .into_iter()
        .filter_map(|url| storage.object_key(url))
        .filter(|key| {
            let owned = key.starts_with(prefix) && !key.split('/').any(|segment| segment == "..");
            if !owned {
                tracing::warn!(key = %key, prefix, "skipping object outside the record's folder");
            }
            owned
        })
        .collect();
    if keys.is_empty() {
        return Ok(());
    }
    storage.delete_objects(&keys).await.map_err(|e| {
        tracing::error!(error = %e, "storage delete failed");
        AppError::Internal("Failed to delete stored files".to_string())
    })
}
