// Icon upload client.
//
// Uploads go to the same endpoint as state saves, distinguished by an
// `action: "upload"` field. The image bytes arrive from the browser already
// base64-encoded and pass through untouched; the reply carries a public URL
// for the stored file, which the caller writes into the player record.

use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upload endpoint returned HTTP {status}")]
    Status { status: u16 },

    #[error("upload failed: {message}")]
    Rejected { message: String },

    #[error("upload endpoint returned no file URL")]
    MissingUrl,
}

/// Shape of the endpoint's upload reply.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

pub struct IconUploader {
    http: reqwest::Client,
    url: String,
}

impl IconUploader {
    pub fn new(url: String, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client for icon uploads")?;
        Ok(Self { http, url })
    }

    /// Upload one file; returns the public URL of the stored copy. The
    /// remote error message is propagated when the endpoint provides one.
    pub async fn upload(
        &self,
        file_name: &str,
        mime_type: &str,
        file_data_base64: &str,
    ) -> Result<String, UploadError> {
        let body = json!({
            "action": "upload",
            "fileName": file_name,
            "mimeType": mime_type,
            "fileData": file_data_base64,
        });

        let response = self.http.post(&self.url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Status {
                status: status.as_u16(),
            });
        }

        let reply: UploadResponse = response.json().await?;
        interpret_upload_response(reply).inspect(|url| {
            info!("Uploaded {file_name} ({mime_type}) -> {url}");
        })
    }
}

fn interpret_upload_response(reply: UploadResponse) -> Result<String, UploadError> {
    if let Some(message) = reply.error {
        return Err(UploadError::Rejected { message });
    }
    reply.url.ok_or(UploadError::MissingUrl)
}
