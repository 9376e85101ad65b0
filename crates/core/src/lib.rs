//! # Schedule Prep Core
//!
//! Scheduling-input preparation - no infrastructure dependencies.
//!
//! This crate contains:
//! - Timezone arithmetic and grid quantization
//! - Work time, time slot, event part, buffer and break generation
//! - Request assembly for the constraint solver
//! - Port interfaces (traits) for persistence, archive storage and the solver
//! - Services that orchestrate a scheduling run and a replan
//!
//! ## Architecture Principles
//! - Only depends on `scheduleprep-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Generators are pure functions; only services await ports

pub mod breaks;
pub mod buffer_time;
pub mod event_parts;
pub mod meeting_event;
pub mod planner;
pub mod replan;
pub mod solver;
pub mod time_math;
pub mod time_slots;
pub mod usage;
pub mod work_time;

// Infrastructure ports
pub mod scheduling_ports;

pub use planner::{
    MeetingAssistScheduler, PlanInput, PlanningContext, PreparedPlan, SchedulingService,
    SubmissionSettings,
};
pub use replan::ReplanOrchestrator;
pub use scheduling_ports::{
    MeetingAssistRepository, ObjectStore, PreferenceRepository, SolverClient,
    UsageCounterRepository,
};
pub use solver::{SolverGateway, SubmissionReceipt};
pub use usage::UsageMeter;
