//! Structures sent to (and archived for) the constraint solver.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::calendar::{BufferTimeObject, CalendarEvent, PreferredTimeRange};
use super::replan::NewConstraints;
use super::week::DayOfWeek;

/// Working window for one weekday, rendered in the host's timezone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkTime {
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub host_id: String,
    pub user_id: String,
}

/// Candidate slot of fixed granularity, rendered in the host's timezone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub host_id: String,
    /// `--MM-DD`
    pub month_day: String,
    pub date: NaiveDate,
}

/// Solver view of one attendee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerUser {
    pub id: String,
    pub host_id: String,
    pub max_work_load_percent: u32,
    pub back_to_back_meetings: bool,
    pub max_number_of_meetings: u32,
    pub min_number_of_breaks: u32,
    pub work_times: Vec<WorkTime>,
}

/// One slice of an event before it is formatted for the solver.
///
/// Every part carries the whole event; `part_minutes` is the slice length.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialEventPart {
    pub group_id: String,
    pub part: u32,
    pub last_part: u32,
    pub meeting_part: u32,
    pub meeting_last_part: u32,
    pub part_minutes: u32,
    pub host_id: String,
    pub event: CalendarEvent,
}

impl InitialEventPart {
    pub fn event_id(&self) -> &str {
        &self.event.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerEventSummary {
    pub id: String,
    pub user_id: String,
    pub host_id: String,
    pub preferred_time_ranges: Vec<PreferredTimeRange>,
    pub event_type: Option<String>,
}

/// One solver-schedulable event part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerEventPart {
    pub group_id: String,
    pub event_id: String,
    pub part: u32,
    pub last_part: u32,
    pub meeting_part: u32,
    pub meeting_last_part: u32,
    pub meeting_id: Option<String>,
    pub host_id: String,
    pub user_id: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub task_id: Option<String>,
    pub soft_deadline: Option<NaiveDateTime>,
    pub hard_deadline: Option<NaiveDateTime>,
    pub priority: i32,
    pub is_pre_event: bool,
    pub is_post_event: bool,
    pub for_event_id: Option<String>,
    pub positive_impact_score: Option<i32>,
    pub negative_impact_score: Option<i32>,
    pub positive_impact_day_of_week: Option<DayOfWeek>,
    pub positive_impact_time: Option<NaiveTime>,
    pub negative_impact_day_of_week: Option<DayOfWeek>,
    pub negative_impact_time: Option<NaiveTime>,
    pub modifiable: bool,
    pub preferred_day_of_week: Option<DayOfWeek>,
    pub preferred_time: Option<NaiveTime>,
    pub is_meeting: bool,
    pub is_external_meeting: bool,
    pub is_external_meeting_modifiable: bool,
    pub is_meeting_modifiable: bool,
    pub daily_task_list: bool,
    pub weekly_task_list: bool,
    pub gap: bool,
    pub preferred_start_time_range: Option<NaiveTime>,
    pub preferred_end_time_range: Option<NaiveTime>,
    pub total_working_hours: f64,
    pub recurring_event_id: Option<String>,
    pub user: PlannerUser,
    pub event: PlannerEventSummary,
    #[serde(skip)]
    pub part_minutes: u32,
}

/// Final artifact posted to the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerRequestBody {
    pub singleton_id: String,
    pub host_id: String,
    pub timeslots: Vec<TimeSlot>,
    pub user_list: Vec<PlannerUser>,
    pub event_parts: Vec<PlannerEventPart>,
    pub file_key: String,
    pub delay: u64,
    pub call_back_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplanArchiveContext {
    pub is_replan: bool,
    pub original_event_id: String,
    pub original_calendar_id: String,
    pub new_constraints: NewConstraints,
}

/// Snapshot written to the object store before the solver is called.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanArchive {
    pub singleton_id: String,
    pub host_id: String,
    pub host_timezone: String,
    pub event_parts: Vec<PlannerEventPart>,
    pub all_events: Vec<CalendarEvent>,
    pub breaks: Vec<CalendarEvent>,
    pub old_events: Vec<CalendarEvent>,
    pub new_host_buffer_times: Vec<BufferTimeObject>,
    pub timeslots: Vec<TimeSlot>,
    pub user_list: Vec<PlannerUser>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub replan: Option<ReplanArchiveContext>,
}
