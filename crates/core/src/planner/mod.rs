//! Request assembly: pure pipelines plus the services that feed them.

pub mod assembler;
pub mod format;
pub mod pipelines;
pub mod service;

pub use assembler::{assemble, dedup_by_key, dedup_structural, AssembledPlan, RequestEnvelope};
pub use pipelines::{
    external_pipeline, host_pipeline, internal_pipeline, ExternalAttendeeData, InternalAttendeeData,
    PipelineOutput, PlanningContext,
};
pub use service::{
    MeetingAssistScheduler, PlanInput, PreparedPlan, SchedulingService, SubmissionSettings,
};
