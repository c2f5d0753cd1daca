use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::Utc;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

use crate::config::MediaConfig;
use crate::error::{AppError, MediaError};
use crate::media::{ImageUpload, MediaHost, UploadedImage, UPLOAD_TRANSFORMATION};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct HostErrorBody {
    error: HostErrorMessage,
}

#[derive(Debug, Deserialize)]
struct HostErrorMessage {
    message: String,
}

/// Signed uploads to Cloudinary's REST API.
pub struct CloudinaryClient {
    http: reqwest::Client,
    base: Url,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    upload_preset: Option<String>,
    folder: String,
}

impl CloudinaryClient {
    pub fn new(config: &MediaConfig) -> Result<Self, AppError> {
        let mut base = config.api_base.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base)
            .map_err(|e| AppError::ConfigError(format!("invalid media.api_base: {}", e)))?;

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        Ok(Self {
            http,
            base,
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            upload_preset: config.upload_preset.clone().filter(|p| !p.is_empty()),
            folder: config.folder.clone(),
        })
    }

    fn endpoint(&self, action: &str) -> Result<Url, MediaError> {
        self.base
            .join(&format!("v1_1/{}/image/{}", self.cloud_name, action))
            .map_err(|e| MediaError::RequestFailed(e.to_string()))
    }

    /// Signature over the sorted `key=value` pairs followed by the API secret.
    fn sign(&self, params: &[(&str, String)]) -> String {
        let mut sorted: Vec<&(&str, String)> = params.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let to_sign = sorted
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(self.api_secret.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Attach credentials and signature to the parameters that get signed.
    fn signed_form(&self, mut params: Vec<(&'static str, String)>) -> Vec<(&'static str, String)> {
        params.push(("timestamp", Utc::now().timestamp().to_string()));
        let signature = self.sign(&params);
        params.push(("api_key", self.api_key.clone()));
        params.push(("signature", signature));
        params.push(("signature_algorithm", "sha256".to_string()));
        params
    }

    async fn post_form<T: for<'de> Deserialize<'de>>(
        &self,
        action: &str,
        form: &[(&'static str, String)],
    ) -> Result<T, MediaError> {
        let url = self.endpoint(action)?;
        let response = self.http.post(url).form(form).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<HostErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| format!("HTTP {}", status));
            error!("Media host returned {} for {}: {}", status, action, message);
            return Err(MediaError::Rejected(message));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| MediaError::InvalidResponse(e.to_string()))
    }
}

/// Encode bytes as a data URI, the transport form the upload API accepts.
pub fn to_data_uri(image: &ImageUpload) -> String {
    format!("data:{};base64,{}", image.content_type, BASE64.encode(&image.data))
}

#[async_trait]
impl MediaHost for CloudinaryClient {
    async fn upload(&self, image: ImageUpload) -> Result<UploadedImage, MediaError> {
        let mut params = vec![
            ("folder", self.folder.clone()),
            ("transformation", UPLOAD_TRANSFORMATION.to_string()),
        ];
        if let Some(preset) = &self.upload_preset {
            params.push(("upload_preset", preset.clone()));
        }

        let mut form = self.signed_form(params);
        form.push(("file", to_data_uri(&image)));

        debug!(
            "Uploading {} ({} bytes) to media host",
            image.filename.as_deref().unwrap_or("unnamed"),
            image.data.len()
        );
        let uploaded: UploadResponse = self.post_form("upload", &form).await?;
        info!("Uploaded image {}", uploaded.public_id);

        Ok(UploadedImage {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<(), MediaError> {
        let form = self.signed_form(vec![("public_id", public_id.to_string())]);
        let destroyed: DestroyResponse = self.post_form("destroy", &form).await?;

        if destroyed.result == "not found" {
            return Err(MediaError::NotFound(public_id.to_string()));
        }
        if destroyed.result != "ok" {
            return Err(MediaError::Rejected(format!(
                "could not delete {}: {}",
                public_id, destroyed.result
            )));
        }

        info!("Deleted image {}", public_id);
        Ok(())
    }
}
