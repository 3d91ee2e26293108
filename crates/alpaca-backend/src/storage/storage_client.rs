//! File storage client (buckets of objects)

use async_trait::async_trait;
use reqwest::{RequestBuilder, Url};
use serde::Deserialize;
use tracing::instrument;

use alpaca_common::{BackendConfig, SessionToken};
use alpaca_core::traits::{FileStorage, RepoResult};

use crate::client::{check_response, map_http_error, read_json};

/// Upload response; `Key` is `<bucket>/<path>`
#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(rename = "Key", default)]
    key: Option<String>,
}

/// Client for the storage endpoint
#[derive(Debug, Clone)]
pub struct StorageClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    session: SessionToken,
}

impl StorageClient {
    /// Create a new StorageClient
    pub fn new(http: reqwest::Client, backend: &BackendConfig, session: SessionToken) -> Self {
        Self {
            http,
            base_url: backend.storage_url(),
            anon_key: backend.anon_key.clone(),
            session,
        }
    }

    /// `{base}/object/<prefix...>/<bucket>/<path>` with each segment escaped
    fn object_url(&self, prefix: &[&str], bucket: &str, path: &str) -> String {
        let segments = prefix
            .iter()
            .copied()
            .chain(std::iter::once(bucket))
            .chain(path.split('/').filter(|s| !s.is_empty()));

        match Url::parse(&format!("{}/object", self.base_url)) {
            Ok(mut url) => {
                if let Ok(mut parts) = url.path_segments_mut() {
                    parts.extend(segments);
                }
                url.to_string()
            }
            Err(_) => {
                let joined: Vec<&str> = segments.collect();
                format!("{}/object/{}", self.base_url, joined.join("/"))
            }
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self
            .session
            .access_token()
            .unwrap_or_else(|| self.anon_key.clone());
        request.header("apikey", &self.anon_key).bearer_auth(token)
    }
}

#[async_trait]
impl FileStorage for StorageClient {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> RepoResult<String> {
        let request = self
            .authorize(self.http.post(self.object_url(&[], bucket, path)))
            .header("content-type", content_type)
            .header("cache-control", "max-age=3600")
            .header("x-upsert", "false")
            .body(bytes);
        let response = request.send().await.map_err(map_http_error)?;
        let body: UploadResponse = read_json(response).await?;

        let stored = body
            .key
            .and_then(|key| key.strip_prefix(&format!("{bucket}/")).map(str::to_string))
            .unwrap_or_else(|| path.to_string());
        tracing::info!(bucket, path = %stored, "Object uploaded");
        Ok(stored)
    }

    #[instrument(skip(self))]
    async fn download(&self, bucket: &str, path: &str) -> RepoResult<Vec<u8>> {
        let request = self.authorize(self.http.get(self.object_url(&[], bucket, path)));
        let response = request.send().await.map_err(map_http_error)?;
        let response = check_response(response).await?;
        let bytes = response.bytes().await.map_err(map_http_error)?;
        Ok(bytes.to_vec())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        self.object_url(&["public"], bucket, path)
    }
}
