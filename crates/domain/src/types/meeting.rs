//! Meeting-assist records: the request, its attendees and their
//! availability data.

use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::calendar::BufferTimeConfig;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttendeeEmail {
    pub primary: bool,
    pub value: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub display_name: Option<String>,
}

/// Attendee of a meeting assist. Internal attendees have a stored
/// preference record; external attendees do not.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeetingAssistAttendee {
    pub id: String,
    pub name: Option<String>,
    pub host_id: String,
    pub user_id: Option<String>,
    pub emails: Vec<AttendeeEmail>,
    pub primary_email: Option<String>,
    pub timezone: Option<String>,
    pub external_attendee: bool,
    pub meeting_id: Option<String>,
}

impl MeetingAssistAttendee {
    /// Primary email entry, else the first email, else the stored field.
    pub fn resolved_primary_email(&self) -> Option<&str> {
        self.emails
            .iter()
            .find(|email| email.primary)
            .or_else(|| self.emails.first())
            .map(|email| email.value.as_str())
            .or(self.primary_email.as_deref())
    }

    /// Id that owns this attendee's events and planner user entry.
    pub fn owner_id(&self) -> &str {
        self.user_id.as_deref().unwrap_or(&self.id)
    }
}

/// A request to place a new meeting within a window.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeetingAssist {
    pub id: String,
    /// Host user.
    pub user_id: String,
    pub calendar_id: String,
    pub summary: Option<String>,
    pub notes: Option<String>,
    #[serde(deserialize_with = "super::civil::deserialize")]
    pub window_start_date: NaiveDateTime,
    #[serde(deserialize_with = "super::civil::deserialize")]
    pub window_end_date: NaiveDateTime,
    pub timezone: String,
    /// Minutes.
    pub duration: u32,
    pub priority: i32,
    pub buffer_time: Option<BufferTimeConfig>,
    pub transparency: Option<String>,
    pub visibility: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeetingAssistPreferredTimeRange {
    pub id: String,
    pub meeting_id: String,
    pub day_of_week: Option<u32>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub host_id: String,
    pub attendee_id: String,
}

/// Calendar history imported for an external attendee.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeetingAssistEvent {
    pub id: String,
    pub attendee_id: String,
    pub calendar_id: Option<String>,
    pub event_id: Option<String>,
    pub summary: Option<String>,
    #[serde(deserialize_with = "super::civil::deserialize")]
    pub start_date: NaiveDateTime,
    #[serde(deserialize_with = "super::civil::deserialize")]
    pub end_date: NaiveDateTime,
    pub timezone: Option<String>,
    pub all_day: bool,
    pub meeting_id: Option<String>,
    pub recurring_event_id: Option<String>,
}

/// Explicit availability an external attendee recorded for a meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalAttendeePreference {
    pub preferred_start_datetime: DateTime<Utc>,
    pub preferred_end_datetime: DateTime<Utc>,
}
