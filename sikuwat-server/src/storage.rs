//! Image uploads to the platform's object storage

use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::auth::platform::base_url_with_slash;

/// Largest accepted upload
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
const UPLOAD_PREFIX: &str = "articles";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("file type '{0}' is not allowed (jpg, jpeg, png, gif, webp)")]
    UnsupportedType(String),

    #[error("file is empty")]
    Empty,

    #[error("file is larger than {} MiB", MAX_UPLOAD_BYTES / (1024 * 1024))]
    TooLarge,

    #[error("storage transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("storage rejected upload: {status} {body}")]
    Upstream { status: u16, body: String },

    #[error("invalid storage url: {0}")]
    Url(#[from] url::ParseError),
}

/// Where an uploaded object ended up
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredObject {
    pub path: String,
    pub public_url: String,
}

/// Client for `<platform>/storage/v1`
#[derive(Debug, Clone)]
pub struct PlatformStorage {
    http: Client,
    base: Url,
    service_role_key: String,
    bucket: String,
}

impl PlatformStorage {
    pub fn new(
        base_url: &str,
        service_role_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Result<Self, StorageError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("sikuwat/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base: base_url_with_slash(base_url)?,
            service_role_key: service_role_key.into(),
            bucket: bucket.into(),
        })
    }

    /// Store an article image under `articles/<millis>.<ext>`
    pub async fn upload_image(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredObject, StorageError> {
        let ext = check_upload(filename, bytes.len())?;
        let path = object_path(Utc::now().timestamp_millis(), &ext);

        let url = self
            .base
            .join(&format!("storage/v1/object/{}/{}", self.bucket, path))?;

        let res = self
            .http
            .post(url)
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .header("content-type", content_type(&ext))
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(StorageError::Upstream { status, body });
        }

        tracing::info!(path = %path, bucket = %self.bucket, "image uploaded");
        Ok(StoredObject {
            public_url: self.public_url(&path)?,
            path,
        })
    }

    /// Public URL of an object in the bucket
    pub fn public_url(&self, path: &str) -> Result<String, StorageError> {
        let url = self
            .base
            .join(&format!("storage/v1/object/public/{}/{}", self.bucket, path))?;
        Ok(url.to_string())
    }
}

/// Validate name and size, returning the lowercased extension
fn check_upload(filename: &str, len: usize) -> Result<String, StorageError> {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(StorageError::UnsupportedType(ext));
    }
    if len == 0 {
        return Err(StorageError::Empty);
    }
    if len > MAX_UPLOAD_BYTES {
        return Err(StorageError::TooLarge);
    }
    Ok(ext)
}

fn object_path(millis: i64, ext: &str) -> String {
    format!("{}/{}.{}", UPLOAD_PREFIX, millis, ext)
}

fn content_type(ext: &str) -> &'static str {
    match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
