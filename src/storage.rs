use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::presigning::PresigningConfig;
use s3::types::{Delete, ObjectIdentifier};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// StorageService
///
/// Contract for the media bucket. Uploads go straight from the browser through a presigned
/// URL; the server only signs, derives public URLs, and deletes objects when the owning row
/// goes away.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Creates the bucket if missing. Local MinIO only.
    async fn ensure_bucket_exists(&self);

    /// Signs a PUT for `key`, constrained to `content_type`.
    async fn get_presigned_upload_url(
        &self,
        key: &str,
        content_type: &str,
    ) -> Result<String, String>;

    /// Removes the given object keys. Missing keys are not an error.
    async fn delete_objects(&self, keys: &[String]) -> Result<(), String>;

    /// Base every public object URL starts with, without a trailing slash.
    fn public_base(&self) -> &str;

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base(), key.trim_start_matches('/'))
    }

    /// Reverses [`StorageService::public_url`]. URLs that do not point into our bucket
    /// yield `None` and are left alone by deletions.
    fn object_key(&self, url: &str) -> Option<String> {
        let base = self.public_base();
        url.strip_prefix(base)
            .and_then(|rest| rest.strip_prefix('/'))
            .map(|key| key.split(['?', '#']).next().unwrap_or(key))
            .filter(|key| !key.is_empty())
            .map(str::to_string)
    }
}

/// Public URL base for a Supabase storage bucket.
pub fn supabase_public_base(project_url: &str, bucket: &str) -> String {
    format!(
        "{}/storage/v1/object/public/{}",
        project_url.trim_end_matches('/'),
        bucket
    )
}

/// S3StorageClient
///
/// S3-compatible client: MinIO locally, the Supabase storage S3 gateway in production.
/// Path-style addressing is required by both.
#[derive(Clone)]
pub struct S3StorageClient {
    client: s3::Client,
    bucket_name: String,
    public_base: String,
}

impl S3StorageClient {
    pub async fn new(
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
        public_base: &str,
    ) -> Self {
        let credentials =
            s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let config = s3::Config::builder()
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .region(s3::config::Region::new(region.to_string()))
            .behavior_version_latest()
            .force_path_style(true)
            .build();

        Self {
            client: s3::Client::from_conf(config),
            bucket_name: bucket.to_string(),
            public_base: public_base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl StorageService for S3StorageClient {
    async fn ensure_bucket_exists(&self) {
        let _ = self
            .client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await;
    }

    async fn get_presigned_upload_url(
        &self,
        key: &str,
        content_type: &str,
    ) -> Result<String, String> {
        let presigning =
            PresigningConfig::expires_in(Duration::from_secs(600)).map_err(|e| e.to_string())?;

        let presigned_req = self
            .client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| e.to_string())?;

        Ok(presigned_req.uri().to_string())
    }

    async fn delete_objects(&self, keys: &[String]) -> Result<(), String> {
        if keys.is_empty() {
            return Ok(());
        }

        let objects = keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.to_string())?;

        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()
            .map_err(|e| e.to_string())?;

        self.client
            .delete_objects()
            .bucket(&self.bucket_name)
            .delete(delete)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        tracing::debug!(count = keys.len(), "deleted storage objects");
        Ok(())
    }

    fn public_base(&self) -> &str {
        &self.public_base
    }
}

/// sanitize_key
///
/// Drops empty, `.` and `..` segments so user-supplied names cannot escape their prefix.
pub fn sanitize_key(key: &str) -> String {
    key.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// MockStorageService
///
/// In-memory stand-in used by the tests. Records every deleted key.
#[derive(Clone, Default)]
pub struct MockStorageService {
    /// When true, all operations return a simulated failure.
    pub should_fail: bool,
    deleted: Arc<Mutex<Vec<String>>>,
}

pub const MOCK_PUBLIC_BASE: &str = "http://localhost:9000/mock-bucket";

impl MockStorageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub fn deleted_keys(&self) -> Vec<String> {
        self.deleted.lock().map(|keys| keys.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_bucket_exists(&self) {}

    async fn get_presigned_upload_url(
        &self,
        key: &str,
        _content_type: &str,
    ) -> Result<String, String> {
        if self.should_fail {
            return Err("Mock Storage Error: Simulation requested".to_string());
        }

        Ok(format!(
            "{}/{}?signature=fake",
            MOCK_PUBLIC_BASE,
            sanitize_key(key)
        ))
    }

    async fn delete_objects(&self, keys: &[String]) -> Result<(), String> {
        if self.should_fail {
            return Err("Mock Storage Error: Simulation requested".to_string());
        }
        let mut deleted = self.deleted.lock().map_err(|e| e.to_string())?;
        deleted.extend(keys.iter().cloned());
        Ok(())
    }

    fn public_base(&self) -> &str {
        MOCK_PUBLIC_BASE
    }
}

pub type StorageState = Arc<dyn StorageService>;
