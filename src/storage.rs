use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::presigning::PresigningConfig;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

// 1. Upload Contract

/// StorageService
///
/// The media side of the portal: course thumbnails and profile images go straight from
/// the browser to the bucket through a presigned PUT, and only the resulting object key is
/// ever stored in Postgres (`courses.thumbnail`, `profiles.profile_image`).
///
/// Handlers hold an `Arc<dyn StorageService>`; the test suites plug in `MockStorageService`.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Provisions the image bucket on a fresh MinIO container. Only called when
    /// `Env::Local`; production buckets are managed in Supabase.
    async fn ensure_bucket_exists(&self);

    /// Signs a single PUT of `key`.
    ///
    /// # Arguments
    /// * `key`: object key as built by `upload_key`. Traversal segments are dropped again here.
    /// * `content_type`: the image MIME type the browser must send with the upload.
    async fn get_presigned_upload_url(&self, key: &str, content_type: &str) -> Result<String, String>;
}

/// How long a browser has to start the upload once it holds the URL.
const UPLOAD_URL_TTL: Duration = Duration::from_secs(600);

/// upload_key
///
/// Object key for a new image owned by `owner`: `uploads/{owner}/{random}.{ext}`. The client's
/// filename only contributes its extension, so two uploads never overwrite each other.
pub fn upload_key(owner: Uuid, filename: &str) -> String {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| "bin".to_string());
    format!("uploads/{}/{}.{}", owner, Uuid::new_v4(), extension)
}

/// sanitize_key
///
/// Drops `..`, `.` and empty segments so a key cannot climb out of `uploads/`.
pub fn sanitize_key(key: &str) -> String {
    key.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

// 2. S3-Compatible Client (MinIO locally, Supabase Storage in production)

/// S3StorageClient
///
/// Presigns uploads with `aws-sdk-s3`. Both MinIO and the Supabase Storage gateway expect
/// path-style URLs (`{endpoint}/{bucket}/{key}`), never virtual-hosted buckets.
#[derive(Clone)]
pub struct S3StorageClient {
    client: s3::Client,
    bucket_name: String,
}

impl S3StorageClient {
    /// new
    ///
    /// Builds the client from the `s3_*` fields of `AppConfig`. No request is made here, so
    /// presigning also works offline.
    pub async fn new(endpoint: &str, region: &str, access_key: &str, secret_key: &str, bucket: &str) -> Self {
        let credentials = s3::config::Credentials::new(access_key, secret_key, None, None, "static");

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
        }
    }
}

#[async_trait]
impl StorageService for S3StorageClient {
    async fn ensure_bucket_exists(&self) {
        // MinIO answers BucketAlreadyOwnedByYou on every restart after the first.
        if let Err(e) = self.client.create_bucket().bucket(&self.bucket_name).send().await {
            tracing::debug!(bucket = %self.bucket_name, "create_bucket skipped: {:?}", e);
        }
    }

    async fn get_presigned_upload_url(&self, key: &str, content_type: &str) -> Result<String, String> {
        let presigning = PresigningConfig::expires_in(UPLOAD_URL_TTL).map_err(|e| e.to_string())?;

        let signed = self
            .client
            .put_object()
            .bucket(&self.bucket_name)
            .key(sanitize_key(key))
            // Signed header: the PUT fails unless the browser sends the same image type.
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| e.to_string())?;

        Ok(signed.uri().to_string())
    }
}

// 3. Test Double

/// MockStorageService
///
/// Hands out fake but well-formed upload URLs, or fails every call when built with
/// `new_failing` so the 500 path of `POST /upload/presigned` can be exercised.
#[derive(Clone, Default)]
pub struct MockStorageService {
    pub should_fail: bool,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self { should_fail: false }
    }

    pub fn new_failing() -> Self {
        Self { should_fail: true }
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_bucket_exists(&self) {}

    async fn get_presigned_upload_url(&self, key: &str, _content_type: &str) -> Result<String, String> {
        if self.should_fail {
            return Err("storage unavailable (mock)".to_string());
        }
        Ok(format!("http://localhost:9000/lms-test/{}?signature=fake", sanitize_key(key)))
    }
}

/// StorageState
///
/// Shared handle stored in `AppState`.
pub type StorageState = Arc<dyn StorageService>;
