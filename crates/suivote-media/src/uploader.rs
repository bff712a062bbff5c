//! HTTP client for the content-addressed blob store.
//!
//! One `PUT {publisher}/v1/blobs?epochs={n}` per asset. The store answers
//! either `newlyCreated` or `alreadyCertified` (content-addressed dedup);
//! both are normalized into a [`StoredBlob`]. No retries happen here.

use std::future::Future;

use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use suivote_shared::MediaAsset;

use crate::error::UploadError;

/// Stable reference to an uploaded asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredBlob {
    /// Content-derived blob id, used as the media reference in ledger payloads.
    pub blob_reference: String,
    /// Ledger object certifying the blob.
    pub storage_object_id: Option<String>,
}

/// Seam between the upload orchestrator and the blob store.
pub trait BlobUpload: Send + Sync {
    fn upload(&self, asset: &MediaAsset) -> impl Future<Output = Result<StoredBlob, UploadError>> + Send;
}

#[derive(Debug, Clone)]
pub struct BlobUploader {
    client: reqwest::Client,
    publisher_url: String,
    epochs: u32,
}

impl BlobUploader {
    pub fn new(publisher_url: impl Into<String>, epochs: u32) -> Self {
        Self::with_client(reqwest::Client::new(), publisher_url, epochs)
    }

    pub fn with_client(client: reqwest::Client, publisher_url: impl Into<String>, epochs: u32) -> Self {
        Self {
            client,
            publisher_url: publisher_url.into(),
            epochs,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/blobs?epochs={}",
            self.publisher_url.trim_end_matches('/'),
            self.epochs
        )
    }
}

impl BlobUpload for BlobUploader {
    async fn upload(&self, asset: &MediaAsset) -> Result<StoredBlob, UploadError> {
        let url = self.endpoint();
        debug!(
            local_id = %asset.local_id,
            size = asset.size(),
            content_type = %asset.content_type,
            "Uploading blob"
        );

        let resp = self
            .client
            .put(&url)
            .header(CONTENT_TYPE, asset.content_type.as_str())
            .body(asset.raw_bytes.clone())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(local_id = %asset.local_id, status = status.as_u16(), "Blob store rejected upload");
            return Err(UploadError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: StoreResponse = resp
            .json()
            .await
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;

        let stored = parsed.into_stored()?;
        debug!(
            local_id = %asset.local_id,
            blob_id = %stored.blob_reference,
            "Blob stored"
        );
        Ok(stored)
    }
}

/// Public read URL of a stored blob, for presentation code.
pub fn blob_url(aggregator_url: &str, blob_reference: &str) -> String {
    format!(
        "{}/v1/blobs/{}",
        aggregator_url.trim_end_matches('/'),
        blob_reference
    )
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreResponse {
    newly_created: Option<NewlyCreated>,
    already_certified: Option<AlreadyCertified>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewlyCreated {
    blob_object: BlobObject,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlobObject {
    id: String,
    blob_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlreadyCertified {
    blob_id: String,
    event: Option<CertifiedEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CertifiedEvent {
    object_id: Option<String>,
}

impl StoreResponse {
    fn into_stored(self) -> Result<StoredBlob, UploadError> {
        if let Some(created) = self.newly_created {
            return Ok(StoredBlob {
                blob_reference: created.blob_object.blob_id,
                storage_object_id: Some(created.blob_object.id),
            });
        }
        if let Some(certified) = self.already_certified {
            return Ok(StoredBlob {
                blob_reference: certified.blob_id,
                storage_object_id: certified.event.and_then(|e| e.object_id),
            });
        }
        Err(UploadError::InvalidResponse(
            "neither newlyCreated nor alreadyCertified present".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Bytes;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::put;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    // Impersonates the publisher: the body decides which branch answers.
    async fn store(Query(query): Query<HashMap<String, String>>, body: Bytes) -> Response {
        if query.get("epochs").map(String::as_str) != Some("3") {
            return (StatusCode::BAD_REQUEST, "missing epochs").into_response();
        }
        match &body[..] {
            b"fresh" => Json(json!({
                "newlyCreated": {
                    "blobObject": { "id": "0xobj1", "blobId": "blob-fresh", "size": 5 },
                    "cost": 100
                }
            }))
            .into_response(),
            b"known" => Json(json!({
                "alreadyCertified": {
                    "blobId": "blob-known",
                    "event": { "txDigest": "9xyz", "objectId": "0xobj2" },
                    "endEpoch": 40
                }
            }))
            .into_response(),
            b"garbage" => Json(json!({ "unexpected": true })).into_response(),
            _ => (StatusCode::SERVICE_UNAVAILABLE, "store busy").into_response(),
        }
    }

    async fn spawn_store() -> String {
        let app = Router::new().route("/v1/blobs", put(store));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    fn asset(body: &'static [u8]) -> MediaAsset {
        MediaAsset::new("img-1", body, "image/png")
    }

    #[tokio::test]
    async fn test_newly_created() {
        let uploader = BlobUploader::new(spawn_store().await, 3);
        let stored = uploader.upload(&asset(b"fresh")).await.unwrap();
        assert_eq!(stored.blob_reference, "blob-fresh");
        assert_eq!(stored.storage_object_id.as_deref(), Some("0xobj1"));
    }

    #[tokio::test]
    async fn test_already_certified() {
        let uploader = BlobUploader::new(spawn_store().await, 3);
        let stored = uploader.upload(&asset(b"known")).await.unwrap();
        assert_eq!(stored.blob_reference, "blob-known");
        assert_eq!(stored.storage_object_id.as_deref(), Some("0xobj2"));
    }

    #[tokio::test]
    async fn test_non_2xx_carries_status() {
        let uploader = BlobUploader::new(spawn_store().await, 3);
        let err = uploader.upload(&asset(b"other")).await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_unknown_shape_is_invalid() {
        let uploader = BlobUploader::new(spawn_store().await, 3);
        let err = uploader.upload(&asset(b"garbage")).await.unwrap_err();
        assert!(matches!(err, UploadError::InvalidResponse(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_blob_url() {
        assert_eq!(
            blob_url("https://agg.example/", "abc"),
            "https://agg.example/v1/blobs/abc"
        );
    }
}
