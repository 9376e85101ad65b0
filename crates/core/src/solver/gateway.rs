//! Archive-then-submit handoff to the solver.

use std::sync::Arc;

use scheduleprep_domain::constants::REPLAN_KEY_MARKER;
use scheduleprep_domain::{PlanArchive, PlannerRequestBody, Result, ScheduleError};
use tracing::{error, info, instrument};

use crate::scheduling_ports::{ObjectStore, SolverClient};

/// Identifies a submitted request and where its archive lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub singleton_id: String,
    pub file_key: String,
}

/// `{host}/{singleton}.json`, or `{host}/{singleton}_REPLAN_{event}.json`
/// for replans.
pub fn archive_key(host_id: &str, singleton_id: &str, replanned_event_id: Option<&str>) -> String {
    match replanned_event_id {
        Some(event_id) => format!("{host_id}/{singleton_id}{REPLAN_KEY_MARKER}{event_id}.json"),
        None => format!("{host_id}/{singleton_id}.json"),
    }
}

/// Writes the archive, then calls the solver. The solver is never called
/// when archiving fails, so every submitted request can be resubmitted by
/// hand.
pub struct SolverGateway {
    store: Arc<dyn ObjectStore>,
    solver: Arc<dyn SolverClient>,
}

impl SolverGateway {
    pub fn new(store: Arc<dyn ObjectStore>, solver: Arc<dyn SolverClient>) -> Self {
        Self { store, solver }
    }

    #[instrument(skip_all, fields(singleton_id = %request.singleton_id, file_key = %request.file_key))]
    pub async fn submit(
        &self,
        archive: &PlanArchive,
        request: &PlannerRequestBody,
    ) -> Result<SubmissionReceipt> {
        let body = serde_json::to_vec(archive)
            .map_err(|e| ScheduleError::Internal(format!("archive serialization failed: {e}")))?;

        if let Err(err) = self.store.put_json(&request.file_key, body).await {
            error!(error = %err, "archive write failed; solver not called");
            return Err(match err {
                ScheduleError::ObjectStore(_) | ScheduleError::Config(_) => err,
                other => ScheduleError::ObjectStore(other.to_string()),
            });
        }

        self.solver.submit(request).await.map_err(|err| match err {
            ScheduleError::Solver(_) | ScheduleError::Config(_) => err,
            other => ScheduleError::Solver(other.to_string()),
        })?;

        info!(parts = request.event_parts.len(), "request handed to solver");
        Ok(SubmissionReceipt {
            singleton_id: request.singleton_id.clone(),
            file_key: request.file_key.clone(),
        })
    }
}
