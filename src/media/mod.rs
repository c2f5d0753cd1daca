//! Image hosting: the `MediaHost` seam, its Cloudinary client, and batch
//! uploads with per-file outcomes.

pub mod cloudinary;
pub mod handlers;

use async_trait::async_trait;
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::MediaError;

pub use cloudinary::CloudinaryClient;

/// Resize bound and delivery profile applied to every upload.
pub const UPLOAD_TRANSFORMATION: &str = "c_limit,w_1200,h_600/q_auto/f_auto";

#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub filename: Option<String>,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadedImage {
    pub url: String,
    pub public_id: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaHost: Send + Sync {
    async fn upload(&self, image: ImageUpload) -> Result<UploadedImage, MediaError>;

    async fn delete(&self, public_id: &str) -> Result<(), MediaError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadOutcome {
    Uploaded { url: String, public_id: String },
    Failed { reason: String },
}

/// Per-file results of a batch, in the order the files were given.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchUpload {
    pub results: Vec<UploadOutcome>,
}

impl BatchUpload {
    pub fn failed_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r, UploadOutcome::Failed { .. }))
            .count()
    }

    pub fn is_complete(&self) -> bool {
        self.failed_count() == 0
    }

    /// All URLs, or an error if any file failed. Never a partial list.
    pub fn into_urls(self) -> Result<Vec<String>, MediaError> {
        let failed = self.failed_count();
        if failed > 0 {
            return Err(MediaError::BatchFailed(failed, self.results.len()));
        }

        Ok(self
            .results
            .into_iter()
            .filter_map(|r| match r {
                UploadOutcome::Uploaded { url, .. } => Some(url),
                UploadOutcome::Failed { .. } => None,
            })
            .collect())
    }
}

/// Upload every image concurrently and keep each outcome.
pub async fn upload_batch(host: &dyn MediaHost, images: Vec<ImageUpload>) -> BatchUpload {
    let total = images.len();
    let results: Vec<UploadOutcome> = join_all(images.into_iter().map(|image| host.upload(image)))
        .await
        .into_iter()
        .enumerate()
        .map(|(index, result)| match result {
            Ok(uploaded) => UploadOutcome::Uploaded {
                url: uploaded.url,
                public_id: uploaded.public_id,
            },
            Err(e) => {
                warn!("Batch upload item {} failed: {}", index, e);
                UploadOutcome::Failed { reason: e.to_string() }
            }
        })
        .collect();

    let batch = BatchUpload { results };
    info!("Batch upload finished: {} of {} succeeded", total - batch.failed_count(), total);
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    fn image(name: &str) -> ImageUpload {
        ImageUpload {
            filename: Some(name.to_string()),
            content_type: "image/png".into(),
            data: name.as_bytes().to_vec(),
        }
    }

    fn host_failing_on(bad: &'static str) -> MockMediaHost {
        let mut host = MockMediaHost::new();
        host.expect_upload().returning(move |image| {
            let name = image.filename.unwrap_or_default();
            if name == bad {
                Err(MediaError::Rejected("Invalid image file".into()))
            } else {
                Ok(UploadedImage {
                    url: format!("https://cdn.example/{}", name),
                    public_id: format!("marketplace/{}", name),
                })
            }
        });
        host
    }

    #[tokio::test]
    async fn test_batch_keeps_order_and_urls() {
        let host = host_failing_on("none");
        let batch = upload_batch(&host, vec![image("a.png"), image("b.png")]).await;

        assert!(batch.is_complete());
        assert_eq!(
            batch.into_urls().unwrap(),
            vec!["https://cdn.example/a.png".to_string(), "https://cdn.example/b.png".to_string()]
        );
    }

    #[tokio::test]
    async fn test_one_failure_fails_the_batch() {
        let host = host_failing_on("b.png");
        let batch = upload_batch(&host, vec![image("a.png"), image("b.png"), image("c.png")]).await;

        assert_eq!(batch.failed_count(), 1);
        assert!(matches!(batch.results[1], UploadOutcome::Failed { .. }));
        assert!(matches!(batch.results[2], UploadOutcome::Uploaded { .. }));
        assert_eq!(batch.into_urls(), Err(MediaError::BatchFailed(1, 3)));
    }

    #[tokio::test]
    async fn test_every_file_is_attempted() {
        let mut host = MockMediaHost::new();
        host.expect_upload()
            .times(3)
            .returning(|_| Err(MediaError::RequestFailed("connection reset".into())));

        let batch = upload_batch(&host, vec![image("a"), image("b"), image("c")]).await;
        assert_eq!(batch.failed_count(), 3);
    }

    #[tokio::test]
    async fn test_delete_passes_public_id() {
        let mut host = MockMediaHost::new();
        host.expect_delete()
            .with(eq("marketplace/a"))
            .times(1)
            .returning(|_| Ok(()));

        host.delete("marketplace/a").await.unwrap();
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(UploadOutcome::Failed { reason: "too big".into() }).unwrap();
        assert_eq!(json, serde_json::json!({"status": "failed", "reason": "too big"}));
    }
}
