//! Calendar events as stored by the persistence service, plus the buffer
//! records synthesized around them.

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Snapshot of one stored calendar event.
///
/// `start_date`/`end_date` are civil timestamps asserted to be in
/// `timezone`. Day-of-week fields use ISO numbering (1 = Monday) because
/// that is how they are stored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalendarEvent {
    pub id: String,
    pub user_id: String,
    pub calendar_id: String,
    pub event_id: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub notes: Option<String>,
    #[serde(deserialize_with = "super::civil::deserialize")]
    pub start_date: NaiveDateTime,
    #[serde(deserialize_with = "super::civil::deserialize")]
    pub end_date: NaiveDateTime,
    pub timezone: Option<String>,
    /// Minutes.
    pub duration: Option<i64>,
    pub all_day: bool,
    pub deleted: bool,
    pub is_break: bool,
    pub is_pre_event: bool,
    pub is_post_event: bool,
    pub is_meeting: bool,
    pub is_external_meeting: bool,
    pub is_external_meeting_modifiable: bool,
    pub is_meeting_modifiable: bool,
    pub modifiable: bool,
    pub priority: i32,
    pub background_color: Option<String>,
    pub pre_event_id: Option<String>,
    pub post_event_id: Option<String>,
    pub for_event_id: Option<String>,
    pub recurring_event_id: Option<String>,
    pub meeting_id: Option<String>,
    pub time_blocking: Option<BufferTimeConfig>,
    pub task_id: Option<String>,
    #[serde(deserialize_with = "super::civil::option::deserialize")]
    pub soft_deadline: Option<NaiveDateTime>,
    #[serde(deserialize_with = "super::civil::option::deserialize")]
    pub hard_deadline: Option<NaiveDateTime>,
    pub daily_task_list: bool,
    pub weekly_task_list: bool,
    pub positive_impact_score: Option<i32>,
    pub negative_impact_score: Option<i32>,
    pub positive_impact_day_of_week: Option<u32>,
    pub positive_impact_time: Option<NaiveTime>,
    pub negative_impact_day_of_week: Option<u32>,
    pub negative_impact_time: Option<NaiveTime>,
    pub preferred_day_of_week: Option<u32>,
    pub preferred_time: Option<NaiveTime>,
    pub preferred_start_time_range: Option<NaiveTime>,
    pub preferred_end_time_range: Option<NaiveTime>,
    pub event_type: Option<String>,
    pub preferred_time_ranges: Vec<PreferredTimeRange>,
}

impl CalendarEvent {
    /// Events that occupy time but are not breaks.
    pub const fn is_busy_time(&self) -> bool {
        !self.is_break && !self.all_day && !self.deleted
    }
}

/// Stored per-event time preference.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferredTimeRange {
    pub id: String,
    pub event_id: String,
    pub day_of_week: Option<u32>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub user_id: String,
    pub host_id: Option<String>,
}

/// The user's global primary calendar; breaks are created on it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Calendar {
    pub id: String,
    pub user_id: String,
    pub title: Option<String>,
    pub global_primary: bool,
    pub background_color: Option<String>,
}

/// Minutes of transition time to reserve around an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BufferTimeConfig {
    pub before_event: u32,
    pub after_event: u32,
}

impl BufferTimeConfig {
    pub const fn is_empty(&self) -> bool {
        self.before_event == 0 && self.after_event == 0
    }
}

/// Materialized buffer events for one anchor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BufferTimeObject {
    pub before_event: Option<CalendarEvent>,
    pub after_event: Option<CalendarEvent>,
}

impl BufferTimeObject {
    pub fn events(&self) -> impl Iterator<Item = &CalendarEvent> {
        self.before_event.iter().chain(self.after_event.iter())
    }
}

/// An anchor event with its buffers applied.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferedEvent {
    pub anchor: CalendarEvent,
    pub buffers: BufferTimeObject,
}
