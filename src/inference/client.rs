use std::io::ErrorKind;
use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::insights::Insights;
use crate::error::{excerpt, InferenceError};

/// Single-shot client for the DIAL inference endpoint: one POST per image,
/// no retries and no timeout beyond the transport default.
#[derive(Debug, Clone)]
pub struct DialClient {
    http: reqwest::Client,
    endpoint: String,
}

impl DialClient {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn infer(&self, image_path: &Path) -> Result<Insights, InferenceError> {
        let bytes = tokio::fs::read(image_path).await.map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                InferenceError::NotFound {
                    path: image_path.to_path_buf(),
                }
            } else {
                InferenceError::Unreadable {
                    path: image_path.to_path_buf(),
                    source,
                }
            }
        })?;

        let file_name = image_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "snapshot.jpg".to_string());
        debug!(
            "Uploading {} ({} bytes) to {}",
            file_name,
            bytes.len(),
            self.endpoint
        );

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("image/jpeg")?;
        let form = Form::new().part("image", part);

        let response = self.http.post(&self.endpoint).multipart(form).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("DIAL API answered {}", status);
            return Err(InferenceError::HttpError {
                status: status.as_u16(),
                excerpt: excerpt(&body),
            });
        }

        let payload: Value =
            serde_json::from_str(&body).map_err(|e| InferenceError::MalformedResponse {
                reason: e.to_string(),
                excerpt: excerpt(&body),
            })?;
        info!("DIAL API answered {} with a JSON payload", status);
        Ok(Insights::from_payload(payload))
    }
}
