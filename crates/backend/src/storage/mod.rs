//! Storage operations for uploaded images

mod types;

use log::info;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

use crate::error::Error;
use crate::fetch::Fetch;

pub use types::*;

/// Client for the backend's object storage
pub struct StorageClient {
    url: String,
    key: String,
    token: String,
    client: Client,
    timeout: Option<Duration>,
}

/// Client for a specific storage bucket
pub struct BucketClient<'a> {
    storage: &'a StorageClient,
    bucket_id: String,
}

impl StorageClient {
    /// Create a new StorageClient
    pub fn new(url: &str, key: &str, token: &str, client: Client, timeout: Option<Duration>) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            token: token.to_string(),
            client,
            timeout,
        }
    }

    fn get_url(&self, path: &str) -> String {
        format!("{}/storage/v1{}", self.url, path)
    }

    /// Get a client for a specific bucket
    pub fn from(&self, bucket_id: &str) -> BucketClient<'_> {
        BucketClient {
            storage: self,
            bucket_id: bucket_id.to_string(),
        }
    }
}

impl<'a> BucketClient<'a> {
    /// Upload raw bytes to `path` within the bucket
    pub async fn upload(
        &self,
        path: &str,
        data: Vec<u8>,
        options: FileOptions,
    ) -> Result<UploadResponse, Error> {
        let url = self
            .storage
            .get_url(&format!("/object/{}/{}", self.bucket_id, path));
        let content_type = options
            .content_type
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let size = data.len();

        let mut fetch = Fetch::post(&self.storage.client, &url)
            .header("apikey", &self.storage.key)
            .bearer_auth(&self.storage.token)
            .header("x-upsert", &options.upsert.to_string())
            .timeout(self.storage.timeout)
            .body(data, &content_type);
        if let Some(cache_control) = &options.cache_control {
            fetch = fetch.header("Cache-Control", &format!("max-age={}", cache_control));
        }

        let response = fetch.execute::<UploadResponse>().await.map_err(|err| match err {
            Error::Api { .. } | Error::UnparsedApi { .. } => {
                Error::storage(format!("Upload of {} failed: {}", path, err))
            }
            other => other,
        })?;

        info!("uploaded {} ({} bytes) to bucket {}", path, size, self.bucket_id);
        Ok(response)
    }

    /// Remove objects from the bucket
    pub async fn remove(&self, paths: &[&str]) -> Result<Vec<FileObject>, Error> {
        let url = self.storage.get_url(&format!("/object/{}", self.bucket_id));

        let removed = Fetch::delete(&self.storage.client, &url)
            .header("apikey", &self.storage.key)
            .bearer_auth(&self.storage.token)
            .timeout(self.storage.timeout)
            .json(&json!({ "prefixes": paths }))?
            .execute::<Vec<FileObject>>()
            .await?;

        Ok(removed)
    }

    /// List objects under a prefix
    pub async fn list(&self, prefix: Option<&str>) -> Result<Vec<FileObject>, Error> {
        let url = self
            .storage
            .get_url(&format!("/object/list/{}", self.bucket_id));

        let files = Fetch::post(&self.storage.client, &url)
            .header("apikey", &self.storage.key)
            .bearer_auth(&self.storage.token)
            .timeout(self.storage.timeout)
            .json(&json!({ "prefix": prefix.unwrap_or(""), "limit": 1000, "offset": 0 }))?
            .execute::<Vec<FileObject>>()
            .await?;

        Ok(files)
    }

    /// Get the public URL for a file
    pub fn get_public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.storage.url, self.bucket_id, path
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_upload_raw_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/storage/v1/object/gallery/robe.png"))
            .and(header("Content-Type", "image/png"))
            .and(header("x-upsert", "false"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "Key": "gallery/robe.png" })),
            )
            .mount(&mock_server)
            .await;

        let storage = StorageClient::new(&mock_server.uri(), "anon", "token", Client::new(), None);
        let response = storage
            .from("gallery")
            .upload(
                "robe.png",
                vec![1, 2, 3],
                FileOptions {
                    content_type: Some("image/png".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(response.key, "gallery/robe.png");
    }

    #[tokio::test]
    async fn test_upload_failure_is_storage_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/storage/v1/object/gallery/robe.png"))
            .respond_with(ResponseTemplate::new(413).set_body_string("Payload too large"))
            .mount(&mock_server)
            .await;

        let storage = StorageClient::new(&mock_server.uri(), "anon", "token", Client::new(), None);
        let err = storage
            .from("gallery")
            .upload("robe.png", vec![0; 8], FileOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Storage(_)));
    }

    #[tokio::test]
    async fn test_remove_sends_prefixes() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/storage/v1/object/gallery"))
            .and(body_json(serde_json::json!({ "prefixes": ["a.png", "b.jpg"] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "name": "a.png" }, { "name": "b.jpg" }
            ])))
            .mount(&mock_server)
            .await;

        let storage = StorageClient::new(&mock_server.uri(), "anon", "token", Client::new(), None);
        let removed = storage
            .from("gallery")
            .remove(&["a.png", "b.jpg"])
            .await
            .unwrap();

        assert_eq!(removed.len(), 2);
    }

    #[test]
    fn test_public_url() {
        let storage = StorageClient::new("https://xyz.supabase.co/", "anon", "anon", Client::new(), None);
        assert_eq!(
            storage.from("gallery").get_public_url("hero/voile.jpg"),
            "https://xyz.supabase.co/storage/v1/object/public/gallery/hero/voile.jpg"
        );
    }
}
