// Blob store collaborator: image upload ahead of record mutations

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::donations::models::ImageFile;
use crate::session::SessionManager;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("no files provided")]
    Empty,

    #[error("no active session")]
    Unauthenticated,

    #[error("upload request failed: {0}")]
    Request(String),

    #[error("upload rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("malformed upload response")]
    MalformedResponse,
}

/// External blob store boundary. The engine only consumes `upload`; where
/// the bytes actually land is the collaborator's business.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Uploads the files and returns one URL per file, in input order.
    async fn upload(&self, files: &[ImageFile]) -> Result<Vec<String>, UploadError>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(rename = "fileUrls")]
    file_urls: Vec<String>,
}

/// Production blob store: multipart POST to the backend's upload endpoint,
/// authenticated with the current access token. Uploads are not covered by
/// the refresh-and-retry protocol; an expired token surfaces as a rejected
/// upload and the enclosing operation aborts.
pub struct ApiBlobStore {
    http: Client,
    upload_url: String,
    session: Arc<SessionManager>,
}

impl ApiBlobStore {
    pub fn new(http: Client, base_url: &str, session: Arc<SessionManager>) -> Self {
        Self {
            http,
            upload_url: format!("{}/donations/upload/", base_url),
            session,
        }
    }
}

#[async_trait]
impl BlobStore for ApiBlobStore {
    async fn upload(&self, files: &[ImageFile]) -> Result<Vec<String>, UploadError> {
        if files.is_empty() {
            return Err(UploadError::Empty);
        }
        let token = self
            .session
            .access_token()
            .await
            .ok_or(UploadError::Unauthenticated)?;

        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.bytes.to_vec())
                .file_name(file.file_name.clone())
                .mime_str(&file.content_type)
                .map_err(|e| UploadError::Request(e.to_string()))?;
            form = form.part("file", part);
        }

        let response = self
            .http
            .post(&self.upload_url)
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "image upload failed");
                UploadError::Request(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!(status = %status, "image upload rejected");
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let payload: UploadResponse = response
            .json()
            .await
            .map_err(|_| UploadError::MalformedResponse)?;
        info!(count = payload.file_urls.len(), "images uploaded");
        Ok(payload.file_urls)
    }
}
