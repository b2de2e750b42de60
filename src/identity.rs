use async_trait::async_trait;
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Ban duration the hosted auth service accepts for "disabled until re-enabled".
pub const BAN_FOREVER: &str = "876000h";

/// IdentityService
///
/// Admin operations on the hosted auth service. Profiles live in our database; the login
/// identity (email, password, ban state) lives here.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Creates a confirmed auth user and returns its id.
    async fn create_user(&self, email: &str, password: &str) -> Result<Uuid, String>;

    async fn delete_user(&self, user_id: Uuid) -> Result<(), String>;

    /// Bans (`banned = true`) or re-enables an auth user.
    async fn set_banned(&self, user_id: Uuid, banned: bool) -> Result<(), String>;

    /// Sends the recovery email whose link lands on `redirect_to`.
    async fn send_password_reset(&self, email: &str, redirect_to: &str) -> Result<(), String>;
}

#[derive(Deserialize)]
struct SupabaseUser {
    id: Uuid,
}

/// Some admin endpoints wrap the user, some return it bare.
#[derive(Deserialize)]
#[serde(untagged)]
enum SupabaseUserResponse {
    Wrapped { user: SupabaseUser },
    Bare(SupabaseUser),
}

/// SupabaseAuthClient
///
/// Talks to `{SUPABASE_URL}/auth/v1` with the service-role key.
#[derive(Clone)]
pub struct SupabaseAuthClient {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl SupabaseAuthClient {
    pub fn new(project_url: &str, service_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("{}/auth/v1", project_url.trim_end_matches('/')),
            service_key: service_key.to_string(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, String> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(%status, body = %body, "auth service rejected request");
        Err(extract_message(&body).unwrap_or_else(|| format!("Auth service error ({status})")))
    }
}

/// Pulls the human-readable message out of an auth error body.
fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["msg", "message", "error_description", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

#[async_trait]
impl IdentityService for SupabaseAuthClient {
    async fn create_user(&self, email: &str, password: &str) -> Result<Uuid, String> {
        let response = self
            .request(reqwest::Method::POST, "/admin/users")
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "email_confirm": true,
            }))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let user = Self::check(response)
            .await?
            .json::<SupabaseUserResponse>()
            .await
            .map_err(|e| e.to_string())?;

        Ok(match user {
            SupabaseUserResponse::Wrapped { user } => user.id,
            SupabaseUserResponse::Bare(user) => user.id,
        })
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<(), String> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("/admin/users/{user_id}"))
            .send()
            .await
            .map_err(|e| e.to_string())?;
        Self::check(response).await.map(|_| ())
    }

    async fn set_banned(&self, user_id: Uuid, banned: bool) -> Result<(), String> {
        let ban_duration = if banned { BAN_FOREVER } else { "none" };
        let response = self
            .request(reqwest::Method::PUT, &format!("/admin/users/{user_id}"))
            .json(&serde_json::json!({ "ban_duration": ban_duration }))
            .send()
            .await
            .map_err(|e| e.to_string())?;
        Self::check(response).await.map(|_| ())
    }

    async fn send_password_reset(&self, email: &str, redirect_to: &str) -> Result<(), String> {
        let response = self
            .request(reqwest::Method::POST, "/recover")
            .query(&[("redirect_to", redirect_to)])
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await
            .map_err(|e| e.to_string())?;
        Self::check(response).await.map(|_| ())
    }
}

/// IdentityCall
///
/// What the mock saw, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityCall {
    Create { email: String },
    Delete(Uuid),
    SetBanned(Uuid, bool),
    PasswordReset { email: String, redirect_to: String },
}

/// MockIdentityService
///
/// Test double that records calls and hands out fresh ids.
#[derive(Clone, Default)]
pub struct MockIdentityService {
    pub should_fail: bool,
    calls: Arc<Mutex<Vec<IdentityCall>>>,
}

impl MockIdentityService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<IdentityCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: IdentityCall) -> Result<(), String> {
        if self.should_fail {
            return Err("Mock Identity Error: Simulation requested".to_string());
        }
        self.calls
            .lock()
            .map_err(|e| e.to_string())?
            .push(call);
        Ok(())
    }
}

#[async_trait]
impl IdentityService for MockIdentityService {
    async fn create_user(&self, email: &str, _password: &str) -> Result<Uuid, String> {
        self.record(IdentityCall::Create {
            email: email.to_string(),
        })?;
        Ok(Uuid::new_v4())
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<(), String> {
        self.record(IdentityCall::Delete(user_id))
    }

    async fn set_banned(&self, user_id: Uuid, banned: bool) -> Result<(), String> {
        self.record(IdentityCall::SetBanned(user_id, banned))
    }

    async fn send_password_reset(&self, email: &str, redirect_to: &str) -> Result<(), String> {
        self.record(IdentityCall::PasswordReset {
            email: email.to_string(),
            redirect_to: redirect_to.to_string(),
        })
    }
}

pub type IdentityState = Arc<dyn IdentityService>;
