//! HTTP client for the constraint solver.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use scheduleprep_core::SolverClient;
use scheduleprep_domain::constants::SOLVER_SOLVE_DAY_PATH;
use scheduleprep_domain::{PlannerRequestBody, Result, ScheduleError, SolverConfig};
use tracing::{info, instrument};
use url::Url;

use crate::http::HttpClient;

/// Posts requests to the solver's solve-day endpoint with basic auth.
#[derive(Clone)]
pub struct HttpSolverClient {
    http: HttpClient,
    endpoint: Url,
    authorization: String,
}

impl HttpSolverClient {
    /// # Errors
    /// Returns `ScheduleError::Config` when `solver.base_url` is not a valid URL.
    pub fn new(http: HttpClient, config: &SolverConfig) -> Result<Self> {
        let base = config.base_url.trim_end_matches('/');
        let endpoint = Url::parse(&format!("{base}{SOLVER_SOLVE_DAY_PATH}"))
            .map_err(|e| ScheduleError::Config(format!("invalid solver.base_url: {e}")))?;
        let credentials = STANDARD.encode(format!("{}:{}", config.username, config.password));

        Ok(Self { http, endpoint, authorization: format!("Basic {credentials}") })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl SolverClient for HttpSolverClient {
    #[instrument(skip_all, fields(singleton_id = %request.singleton_id))]
    async fn submit(&self, request: &PlannerRequestBody) -> Result<()> {
        let builder = self
            .http
            .request(Method::POST, self.endpoint.clone())
            .header(AUTHORIZATION, &self.authorization)
            .json(request);

        self.http.send_checked("solver", builder).await.map_err(|err| match err {
            ScheduleError::Config(_) => err,
            other => ScheduleError::Solver(other.to_string()),
        })?;

        info!(parts = request.event_parts.len(), users = request.user_list.len(), "solver accepted request");
        Ok(())
    }
}
