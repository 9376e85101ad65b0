//! Constraint changes applied when an existing meeting is re-solved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::calendar::CalendarEvent;
use super::meeting::MeetingAssistAttendee;

/// Attendee added during a replan.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddedAttendee {
    pub email: String,
    pub name: Option<String>,
    pub user_id: Option<String>,
    pub timezone: Option<String>,
    pub external_attendee: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewConstraints {
    pub new_duration_minutes: Option<u32>,
    #[serde(rename = "newTimeWindowStartUTC")]
    pub new_time_window_start_utc: Option<DateTime<Utc>>,
    #[serde(rename = "newTimeWindowEndUTC")]
    pub new_time_window_end_utc: Option<DateTime<Utc>>,
    pub added_attendees: Vec<AddedAttendee>,
    pub removed_attendee_emails_or_ids: Vec<String>,
}

/// The meeting being replanned and what changes about it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplanTarget {
    /// Stored event as currently scheduled (`{googleEventId}#{calendarId}`).
    pub event: CalendarEvent,
    pub google_event_id: String,
    pub calendar_id: String,
    pub new_constraints: NewConstraints,
    pub original_attendees: Vec<MeetingAssistAttendee>,
}
