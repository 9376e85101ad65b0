//! Minimal GraphQL-over-HTTP client for the persistence service.

use reqwest::Method;
use scheduleprep_domain::{PersistenceConfig, Result, ScheduleError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::http::HttpClient;

const ADMIN_SECRET_HEADER: &str = "X-Hasura-Admin-Secret";
const ROLE_HEADER: &str = "X-Hasura-Role";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlRequest<'a> {
    operation_name: &'a str,
    query: &'a str,
    variables: Value,
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Clone)]
pub struct GraphQlClient {
    http: HttpClient,
    endpoint: Url,
    admin_secret: String,
}

impl std::fmt::Debug for GraphQlClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphQlClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl GraphQlClient {
    /// # Errors
    /// Returns `ScheduleError::Config` when the endpoint is not a valid URL.
    pub fn new(http: HttpClient, config: &PersistenceConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.graphql_url)
            .map_err(|e| ScheduleError::Config(format!("invalid persistence.graphql_url: {e}")))?;
        Ok(Self { http, endpoint, admin_secret: config.admin_secret.clone() })
    }

    /// Run one operation and decode its `data` member.
    ///
    /// A response carrying GraphQL errors, or no data, is an `Upstream`
    /// failure even when the HTTP status is 200.
    #[instrument(skip(self, query, variables))]
    pub async fn execute<T: DeserializeOwned>(
        &self,
        operation_name: &str,
        query: &str,
        variables: Value,
    ) -> Result<T> {
        let request = self
            .http
            .request(Method::POST, self.endpoint.clone())
            .header(ADMIN_SECRET_HEADER, &self.admin_secret)
            .header(ROLE_HEADER, "admin")
            .json(&GraphQlRequest { operation_name, query, variables });

        let response = self.http.send_checked("persistence", request).await?;
        let body: GraphQlResponse<T> = response
            .json()
            .await
            .map_err(|e| ScheduleError::Upstream(format!("{operation_name}: undecodable response: {e}")))?;

        if !body.errors.is_empty() {
            let messages: Vec<&str> = body.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(ScheduleError::Upstream(format!("{operation_name}: {}", messages.join("; "))));
        }

        debug!(operation_name, "graphql operation succeeded");
        body.data.ok_or_else(|| ScheduleError::Upstream(format!("{operation_name}: response had no data")))
    }
}
