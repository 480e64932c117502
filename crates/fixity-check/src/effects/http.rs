use futures_util::{StreamExt, TryStreamExt};
use reqwest::{StatusCode, Url};

use crate::effects::store::{ObjectBody, ObjectStore};
use crate::error::{Error, Result, StoreError};

/// Object store reached over plain HTTP with path-style addressing:
/// `GET <endpoint>/<bucket>/<path>`.
///
/// Works against S3-compatible gateways that allow anonymous or pre-authorized
/// reads. The declared size comes from `Content-Length`.
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    client:   reqwest::Client,
    endpoint: Url,
}

impl HttpObjectStore {
    /// Create a store for `endpoint` with a default client.
    pub fn new(endpoint: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("http client: {e}")))?;
        Self::with_client(client, endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: &str) -> Result<Self> {
        let endpoint =
            Url::parse(endpoint).map_err(|e| Error::Config(format!("endpoint {endpoint:?}: {e}")))?;
        if endpoint.cannot_be_a_base() {
            return Err(Error::Config(format!("endpoint {endpoint} cannot be a base URL")));
        }
        Ok(Self { client, endpoint })
    }

    /// URL of `path` in `bucket`, with each segment percent-encoded.
    ///
    /// `.` and `..` segments would be collapsed by URL normalization and
    /// address another object, so such names resolve to `None`.
    pub fn object_url(&self, bucket: &str, path: &str) -> Option<Url> {
        let dot = |s: &str| s == "." || s == "..";
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if bucket.is_empty() || bucket.contains('/') || dot(bucket) {
            return None;
        }
        if segments.is_empty() || segments.iter().any(|s| dot(s)) {
            return None;
        }

        let mut url = self.endpoint.clone();
        url.path_segments_mut().ok()?.pop_if_empty().push(bucket).extend(segments);
        Some(url)
    }
}

impl ObjectStore for HttpObjectStore {
    async fn get_object(&self, bucket: &str, path: &str) -> std::result::Result<ObjectBody, StoreError> {
        let url = self.object_url(bucket, path).ok_or(StoreError::NotFound)?;
        tracing::debug!(%url, "requesting object");

        let response = self.client.get(url).send().await.map_err(StoreError::transport)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound);
        }
        let response = response.error_for_status().map_err(StoreError::transport)?;

        let content_length = response.content_length().ok_or_else(|| {
            StoreError::transport(std::io::Error::other("response carried no Content-Length"))
        })?;
        let chunks = response
            .bytes_stream()
            .map_err(StoreError::transport)
            .boxed();

        Ok(ObjectBody::new(content_length, chunks))
    }
}
