//! S3-compatible archive store.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use scheduleprep_core::ObjectStore;
use scheduleprep_domain::{ObjectStoreConfig, Result, ScheduleError};
use tracing::{debug, instrument};
use url::Url;

use super::signing::{self, Credentials};
use crate::http::HttpClient;

/// Writes objects with path-style addressing: `{endpoint}/{bucket}/{key}`.
#[derive(Clone)]
pub struct S3ObjectStore {
    http: HttpClient,
    endpoint: Url,
    bucket: String,
    region: String,
    credentials: Credentials,
}

impl S3ObjectStore {
    /// # Errors
    /// Returns `ScheduleError::Config` when the endpoint is not an absolute
    /// URL with a host.
    pub fn new(http: HttpClient, config: &ObjectStoreConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| ScheduleError::Config(format!("invalid object_store.endpoint: {e}")))?;
        if endpoint.host_str().is_none() {
            return Err(ScheduleError::Config("object_store.endpoint has no host".into()));
        }

        Ok(Self {
            http,
            endpoint,
            bucket: config.bucket.clone(),
            region: config.region.clone(),
            credentials: Credentials {
                access_key_id: config.access_key_id.clone(),
                secret_access_key: config.secret_access_key.clone(),
            },
        })
    }

    fn host_header(&self) -> String {
        let host = self.endpoint.host_str().unwrap_or_default();
        match self.endpoint.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }

    fn object_path(&self, key: &str) -> String {
        let base = self.endpoint.path().trim_end_matches('/');
        signing::canonical_path(&format!("{base}/{}/{}", self.bucket, key.trim_start_matches('/')))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    #[instrument(skip(self, body), fields(bucket = %self.bucket, bytes = body.len()))]
    async fn put_json(&self, key: &str, body: Vec<u8>) -> Result<()> {
        let path = self.object_path(key);
        let mut url = self.endpoint.clone();
        url.set_path(&path);

        let signed = signing::sign(
            "PUT",
            &self.host_header(),
            &path,
            &body,
            &self.region,
            &self.credentials,
            Utc::now(),
        )
        .map_err(|e| ScheduleError::ObjectStore(format!("request signing failed: {e}")))?;

        let request = self
            .http
            .request(Method::PUT, url)
            .header(CONTENT_TYPE, "application/json")
            .header("x-amz-date", signed.amz_date)
            .header("x-amz-content-sha256", signed.content_sha256)
            .header(reqwest::header::AUTHORIZATION, signed.authorization)
            .body(body);

        self.http.send_checked("object store", request).await.map_err(|err| match err {
            ScheduleError::Config(_) => err,
            other => ScheduleError::ObjectStore(other.to_string()),
        })?;

        debug!(key, "archive stored");
        Ok(())
    }
}
