//! Wires the HTTP adapters into the core services.

use std::sync::Arc;

use scheduleprep_core::{
    MeetingAssistRepository, MeetingAssistScheduler, ReplanOrchestrator, SchedulingService,
    SolverGateway, SubmissionSettings, UsageMeter,
};
use scheduleprep_domain::{Config, Result};
use tracing::info;

use crate::config;
use crate::http::HttpClient;
use crate::object_store::S3ObjectStore;
use crate::observability::init_tracing;
use crate::persistence::{GraphQlClient, GraphQlRepository};
use crate::solver::HttpSolverClient;

/// Everything a caller needs to start a scheduling run.
pub struct SchedulePrepContext {
    pub config: Config,
    pub scheduling: Arc<SchedulingService>,
    pub meeting_assist: MeetingAssistScheduler,
    pub replan: ReplanOrchestrator,
}

impl SchedulePrepContext {
    /// Build every adapter from a validated configuration.
    ///
    /// # Errors
    /// Returns `ScheduleError::Config` for an invalid configuration or a
    /// malformed endpoint URL.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let http = HttpClient::from_config(&config.http)?;
        let repository =
            Arc::new(GraphQlRepository::new(GraphQlClient::new(http.clone(), &config.persistence)?));
        let store = Arc::new(S3ObjectStore::new(http.clone(), &config.object_store)?);
        let solver = Arc::new(HttpSolverClient::new(http, &config.solver)?);

        let settings = SubmissionSettings {
            callback_url: config.solver.callback_url.clone(),
            delay_ms: config.solver.delay_ms,
        };
        let scheduling = Arc::new(
            SchedulingService::new(repository.clone(), SolverGateway::new(store, solver), settings)
                .with_usage_meter(UsageMeter::new(repository.clone())),
        );

        let meetings: Arc<dyn MeetingAssistRepository> = repository;
        let meeting_assist = MeetingAssistScheduler::new(meetings.clone(), scheduling.clone());
        let replan = ReplanOrchestrator::new(scheduling.clone()).with_meeting_assists(meetings);

        info!(
            persistence = %config.persistence.graphql_url,
            solver = %config.solver.base_url,
            bucket = %config.object_store.bucket,
            "schedule prep context ready"
        );
        Ok(Self { config, scheduling, meeting_assist, replan })
    }

    /// Load configuration from the environment or a config file, install
    /// logging, then build the context.
    ///
    /// # Errors
    /// Propagates configuration and logging setup failures.
    pub fn load() -> Result<Self> {
        let config = config::load()?;
        init_tracing(&config.logging)?;
        Self::new(config)
    }
}
