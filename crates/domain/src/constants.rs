//! Scheduling constants
//!
//! Centralized location for the fixed policies the pipeline applies.

// Break policy
pub const MIN_BREAK_LENGTH_MINUTES: u32 = 15;
pub const MAX_BREAK_HOURS_PER_DAY: f64 = 6.0;
pub const DEFAULT_BREAK_COLOR: &str = "#F7EBF7";
pub const BREAK_TITLE: &str = "Break";
pub const BREAK_PRIORITY: i32 = 1;

// Buffer events
pub const BUFFER_TIME_TITLE: &str = "Buffer time";
pub const BUFFER_PRIORITY: i32 = 1;

// Event part granules (minutes)
pub const LITE_GRANULE_MINUTES: u32 = 30;
pub const FULL_GRANULE_MINUTES: u32 = 15;

// External attendee availability windows (minutes)
pub const EXTERNAL_PREFERENCE_SLOT_MINUTES: i64 = 30;

// Planner users synthesized for external attendees
pub const EXTERNAL_MAX_WORK_LOAD_PERCENT: u32 = 100;
pub const EXTERNAL_MAX_NUMBER_OF_MEETINGS: u32 = 99;
pub const EXTERNAL_MIN_NUMBER_OF_BREAKS: u32 = 0;

// Fallback preferences for internal attendees without a stored record
pub const DEFAULT_MAX_WORK_LOAD_PERCENT: u32 = 100;
pub const DEFAULT_MAX_NUMBER_OF_MEETINGS: u32 = 99;
pub const DEFAULT_MIN_NUMBER_OF_BREAKS: u32 = 0;
pub const DEFAULT_BREAK_LENGTH_MINUTES: u32 = 30;
pub const DEFAULT_WORK_START_HOUR: u32 = 8;
pub const DEFAULT_WORK_END_HOUR: u32 = 18;

// Replan
pub const REPLAN_FALLBACK_EXTRA_DAYS: i64 = 6;

// Solver
pub const SOLVER_SOLVE_DAY_PATH: &str = "/timeTable/admin/solve-day";
pub const DEFAULT_SOLVER_DELAY_MS: u64 = 300_000;
pub const REPLAN_KEY_MARKER: &str = "_REPLAN_";
