use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, StatusCode, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    acl::{self, Role},
    config::{AppConfig, Env},
    error::AppError,
    models::Profile,
    repository::RepositoryState,
};

pub const ACCESS_COOKIE: &str = "sb-access-token";
pub const REFRESH_COOKIE: &str = "sb-refresh-token";

/// Claims
///
/// The subset of the hosted auth service's access-token payload we rely on.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Auth user id; `profiles.user_id` points at it.
    pub sub: Uuid,
    pub exp: usize,
    pub iat: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Verifies a session JWT and returns the auth user id it names.
pub fn verify_access_token(token: &str, secret: &str) -> Result<Uuid, StatusCode> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    // Tokens carry `aud: authenticated`; the signature is what we trust.
    validation.validate_aud = false;

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims.sub)
        .map_err(|e| {
            tracing::debug!(error = %e, "rejected session token");
            StatusCode::UNAUTHORIZED
        })
}

/// Value of cookie `name` in the request's `Cookie` headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// AuthUser
///
/// The signed-in backoffice user: the session identity resolved to its profile.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub profile: Profile,
}

impl AuthUser {
    pub fn role(&self) -> Option<Role> {
        self.profile.role()
    }

    pub fn profile_id(&self) -> Uuid {
        self.profile.id
    }

    /// Refuses with 403 unless the user's role may open `page`. API handlers guard their
    /// writes with the page the data belongs to, so the sidebar and the API agree.
    pub fn require_page(&self, page: &str) -> Result<(), AppError> {
        if acl::can_access(self.role(), page) {
            Ok(())
        } else {
            tracing::warn!(user_id = %self.user_id, page, "role refused");
            Err(AppError::Forbidden(format!("Your role cannot manage {page}")))
        }
    }
}

/// Resolves the session carried by a request, if any.
///
/// Order: local `x-user-id` bypass (local env only), then the `sb-access-token` cookie,
/// then an `Authorization: Bearer <jwt>` header.
pub async fn resolve_session(
    headers: &HeaderMap,
    repo: &RepositoryState,
    config: &AppConfig,
) -> Result<AuthUser, StatusCode> {
    if config.env == Env::Local {
        if let Some(user_id) = headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok())
        {
            if let Ok(Some(profile)) = repo.get_profile_by_user(user_id).await {
                return Ok(AuthUser { user_id, profile });
            }
        }
    }

    let token = cookie_value(headers, ACCESS_COOKIE)
        .or_else(|| bearer_token(headers).map(str::to_string))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let user_id = verify_access_token(&token, &config.jwt_secret)?;

    // A valid token whose profile was deleted is not a session.
    let profile = repo
        .get_profile_by_user(user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    Ok(AuthUser { user_id, profile })
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Already resolved by the session layer in front of the route.
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);
        resolve_session(&parts.headers, &repo, &config).await
    }
}

/// ApiClient
///
/// Caller of the products sync API, identified by a profile token sent as
/// `Authorization: Bearer <token>`. Independent of the browser session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    pub profile_id: Uuid,
    pub token_id: i64,
}

impl<S> FromRequestParts<S> for ApiClient
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);

        let token = bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let found = repo
            .find_token(token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(ApiClient {
            profile_id: found.profile_id,
            token_id: found.id,
        })
    }
}
