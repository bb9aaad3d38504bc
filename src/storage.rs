use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::error::ApiError;

/// Client for the external object-storage collaborator. The provider receives
/// the embedded file payload and must answer with `{url}`; a missing or empty
/// url fails the request.
#[derive(Clone)]
pub struct StorageClient {
    http: reqwest::Client,
    upload_url: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    url: Option<String>,
}

impl StorageClient {
    pub fn new(upload_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            upload_url,
        }
    }

    pub async fn upload(&self, file: &str) -> Result<String, ApiError> {
        let response = self
            .http
            .post(&self.upload_url)
            .json(&json!({ "file": file }))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "storage upload request failed");
                ApiError::Internal("Failed to upload file to storage".into())
            })?;

        let body: UploadResponse = response.json().await.map_err(|e| {
            error!(error = %e, "storage upload returned malformed body");
            ApiError::Internal("Failed to upload file to storage".into())
        })?;

        body.url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ApiError::Internal("Failed to upload file to storage".into()))
    }
}
