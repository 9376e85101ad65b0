//! Port interfaces for the scheduling pipeline.
//!
//! The engine reads calendars and preferences from a persistence service,
//! archives every solver request to an object store, and hands the request
//! to the solver. These traits are the only way core reaches those
//! collaborators.
//!
//! # Example
//!
//! ```no_run
//! use scheduleprep_core::PreferenceRepository;
//!
//! async fn has_preferences(repo: &dyn PreferenceRepository, user_id: &str) -> bool {
//!     matches!(repo.get_user_preferences(user_id).await, Ok(Some(_)))
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scheduleprep_domain::{
    Calendar, CalendarEvent, ExternalAttendeePreference, Freemium, MeetingAssist,
    MeetingAssistAttendee, MeetingAssistEvent, MeetingAssistPreferredTimeRange,
    PlannerRequestBody, PreferredTimeRange, Result, UserPreference,
};

/// Read access to a user's calendar data and preferences.
///
/// A query that fails must return an error; `Ok(None)` / an empty list
/// means the data does not exist.
#[async_trait]
pub trait PreferenceRepository: Send + Sync {
    async fn get_user_preferences(&self, user_id: &str) -> Result<Option<UserPreference>>;

    /// The user's global primary calendar.
    async fn get_global_calendar(&self, user_id: &str) -> Result<Option<Calendar>>;

    /// Non-deleted events overlapping `[start, end]`.
    async fn list_events_for_user(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>>;

    async fn list_events_with_ids(&self, ids: &[String]) -> Result<Vec<CalendarEvent>>;

    async fn list_preferred_time_ranges_for_event(
        &self,
        event_id: &str,
    ) -> Result<Vec<PreferredTimeRange>>;
}

/// Read access to meeting-assist records.
#[async_trait]
pub trait MeetingAssistRepository: Send + Sync {
    async fn get_meeting_assist(&self, meeting_id: &str) -> Result<Option<MeetingAssist>>;

    async fn list_attendees(&self, meeting_id: &str) -> Result<Vec<MeetingAssistAttendee>>;

    async fn attendee_count(&self, meeting_id: &str) -> Result<usize>;

    async fn list_preferred_time_ranges(
        &self,
        meeting_id: &str,
    ) -> Result<Vec<MeetingAssistPreferredTimeRange>>;

    /// Imported history for an external attendee overlapping `[start, end]`.
    async fn list_events_for_attendee(
        &self,
        attendee_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<MeetingAssistEvent>>;

    /// Explicit availability, ordered by start.
    async fn list_external_attendee_preferences(
        &self,
        meeting_id: &str,
        attendee_id: &str,
    ) -> Result<Vec<ExternalAttendeePreference>>;
}

/// Usage counters keyed by user.
#[async_trait]
pub trait UsageCounterRepository: Send + Sync {
    async fn get_freemium_by_user_id(&self, user_id: &str) -> Result<Option<Freemium>>;

    async fn update_freemium_usage(&self, id: &str, usage: i64) -> Result<Freemium>;
}

/// Destination for request archives.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `body` as `application/json` under `key`.
    async fn put_json(&self, key: &str, body: Vec<u8>) -> Result<()>;
}

/// The external constraint solver.
#[async_trait]
pub trait SolverClient: Send + Sync {
    /// Hand the request off. Success means "accepted", not "solved".
    async fn submit(&self, request: &PlannerRequestBody) -> Result<()>;
}
