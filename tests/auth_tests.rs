mod common;

use axum::{
    extract::FromRequestParts,
    http::{Request, StatusCode, header, request::Parts},
};
use common::{InMemoryRepository, mint_jwt, session_jwt};
use ilpdg_backoffice::{
    AppConfig, AppError, AppState, MockIdentityService, MockStorageService,
    acl::Role,
    auth::{ACCESS_COOKIE, ApiClient, AuthUser, bearer_token, cookie_value, verify_access_token},
    config::{Env, LOCAL_JWT_SECRET},
};
use std::sync::Arc;
use uuid::Uuid;

fn state(env: Env, repo: &InMemoryRepository) -> AppState {
    AppState {
        repo: Arc::new(repo.clone()),
        storage: Arc::new(MockStorageService::new()),
        identity: Arc::new(MockIdentityService::new()),
        config: AppConfig {
            env,
            ..AppConfig::default()
        },
    }
}

fn parts_with(headers: &[(&str, String)]) -> Parts {
    let mut builder = Request::builder().uri("/");
    for (name, value) in headers {
        builder = builder.header(*name, value);
    }
    builder.body(()).unwrap().into_parts().0
}

#[test]
fn test_cookie_value_finds_named_cookie() {
    let parts = parts_with(&[(
        "cookie",
        format!("theme=dark; {ACCESS_COOKIE}=abc.def; other=1"),
    )]);
    assert_eq!(cookie_value(&parts.headers, ACCESS_COOKIE).as_deref(), Some("abc.def"));
    assert_eq!(cookie_value(&parts.headers, "missing"), None);
}

#[test]
fn test_bearer_token_requires_scheme() {
    let parts = parts_with(&[("authorization", "Bearer pdg_123".to_string())]);
    assert_eq!(bearer_token(&parts.headers), Some("pdg_123"));
    let parts = parts_with(&[("authorization", "Basic Zm9v".to_string())]);
    assert_eq!(bearer_token(&parts.headers), None);
}

#[test]
fn test_verify_rejects_wrong_secret_and_expired_tokens() {
    let user_id = Uuid::new_v4();
    assert_eq!(
        verify_access_token(&session_jwt(user_id), LOCAL_JWT_SECRET),
        Ok(user_id)
    );
    assert_eq!(
        verify_access_token(&mint_jwt(user_id, "another-secret", 3600), LOCAL_JWT_SECRET),
        Err(StatusCode::UNAUTHORIZED)
    );
    // Past the default 60s leeway.
    assert_eq!(
        verify_access_token(&mint_jwt(user_id, LOCAL_JWT_SECRET, -600), LOCAL_JWT_SECRET),
        Err(StatusCode::UNAUTHORIZED)
    );
}

#[tokio::test]
async fn test_session_from_cookie() {
    let repo = InMemoryRepository::new();
    let profile = repo.add_profile("Giulia", Some(Role::Admin));
    let app_state = state(Env::Production, &repo);

    let mut parts = parts_with(&[(
        "cookie",
        format!("{ACCESS_COOKIE}={}", session_jwt(profile.user_id)),
    )]);
    let user = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();

    assert_eq!(user.user_id, profile.user_id);
    assert_eq!(user.profile_id(), profile.id);
    assert_eq!(user.role(), Some(Role::Admin));
}

#[tokio::test]
async fn test_session_from_bearer_jwt() {
    let repo = InMemoryRepository::new();
    let profile = repo.add_profile("Marco", Some(Role::Brand));
    let app_state = state(Env::Production, &repo);

    let mut parts = parts_with(&[(
        "authorization",
        format!("Bearer {}", session_jwt(profile.user_id)),
    )]);
    let user = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();
    assert_eq!(user.role(), Some(Role::Brand));
}

#[tokio::test]
async fn test_valid_token_without_profile_is_rejected() {
    let repo = InMemoryRepository::new();
    let app_state = state(Env::Production, &repo);

    let mut parts = parts_with(&[(
        "authorization",
        format!("Bearer {}", session_jwt(Uuid::new_v4())),
    )]);
    let result = AuthUser::from_request_parts(&mut parts, &app_state).await;
    assert_eq!(result.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_credentials_are_rejected() {
    let repo = InMemoryRepository::new();
    let app_state = state(Env::Production, &repo);
    let mut parts = parts_with(&[]);
    let result = AuthUser::from_request_parts(&mut parts, &app_state).await;
    assert_eq!(result.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_local_bypass_header() {
    let repo = InMemoryRepository::new();
    let profile = repo.add_profile("Dev", Some(Role::SuperAdmin));
    let app_state = state(Env::Local, &repo);

    let mut parts = parts_with(&[("x-user-id", profile.user_id.to_string())]);
    let user = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();
    assert_eq!(user.user_id, profile.user_id);
}

#[tokio::test]
async fn test_local_bypass_disabled_in_production() {
    let repo = InMemoryRepository::new();
    let profile = repo.add_profile("Dev", Some(Role::SuperAdmin));
    let app_state = state(Env::Production, &repo);

    let mut parts = parts_with(&[("x-user-id", profile.user_id.to_string())]);
    let result = AuthUser::from_request_parts(&mut parts, &app_state).await;
    assert_eq!(result.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_require_page_uses_the_acl() {
    let repo = InMemoryRepository::new();
    let profile = repo.add_profile("Chiara", Some(Role::Cep));
    let app_state = state(Env::Local, &repo);

    let mut parts = parts_with(&[("x-user-id", profile.user_id.to_string())]);
    let user = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();

    assert!(user.require_page("/selling-links").is_ok());
    assert!(matches!(
        user.require_page("/cover"),
        Err(AppError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_api_client_resolves_profile_token() {
    let repo = InMemoryRepository::new();
    let profile = repo.add_profile("Brand", Some(Role::Brand));
    let token = repo.add_token(profile.id, "pdg_known");
    let app_state = state(Env::Production, &repo);

    let mut parts = parts_with(&[(header::AUTHORIZATION.as_str(), "Bearer pdg_known".to_string())]);
    let client = ApiClient::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();
    assert_eq!(client.profile_id, profile.id);
    assert_eq!(client.token_id, token.id);

    let mut parts = parts_with(&[(header::AUTHORIZATION.as_str(), "Bearer pdg_unknown".to_string())]);
    let result = ApiClient::from_request_parts(&mut parts, &app_state).await;
    assert!(matches!(result, Err(AppError::Unauthorized)));
}
