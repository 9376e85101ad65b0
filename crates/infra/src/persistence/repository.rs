//! GraphQL-backed implementations of the persistence ports.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scheduleprep_core::{MeetingAssistRepository, PreferenceRepository, UsageCounterRepository};
use scheduleprep_domain::{
    Calendar, CalendarEvent, ExternalAttendeePreference, Freemium, MeetingAssist,
    MeetingAssistAttendee, MeetingAssistEvent, MeetingAssistPreferredTimeRange, PreferredTimeRange,
    Result, ScheduleError, UserPreference,
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::graphql::GraphQlClient;
use super::queries;

/// Persistence `timestamp` literal for an instant.
fn timestamp(instant: DateTime<Utc>) -> String {
    instant.naive_utc().format("%Y-%m-%dT%H:%M:%S").to_string()
}

#[derive(Deserialize)]
struct UserPreferenceRows {
    #[serde(rename = "User_Preference")]
    rows: Vec<UserPreference>,
}

#[derive(Deserialize)]
struct CalendarRows {
    #[serde(rename = "Calendar")]
    rows: Vec<Calendar>,
}

#[derive(Deserialize)]
struct EventRows {
    #[serde(rename = "Event")]
    rows: Vec<CalendarEvent>,
}

#[derive(Deserialize)]
struct PreferredTimeRangeRows {
    #[serde(rename = "PreferredTimeRange")]
    rows: Vec<PreferredTimeRange>,
}

#[derive(Deserialize)]
struct MeetingAssistByPk {
    #[serde(rename = "Meeting_Assist_by_pk")]
    row: Option<MeetingAssist>,
}

#[derive(Deserialize)]
struct AttendeeRows {
    #[serde(rename = "Meeting_Assist_Attendee")]
    rows: Vec<MeetingAssistAttendee>,
}

#[derive(Deserialize)]
struct AttendeeAggregate {
    #[serde(rename = "Meeting_Assist_Attendee_aggregate")]
    aggregate: AggregateWrapper,
}

#[derive(Deserialize)]
struct AggregateWrapper {
    aggregate: AggregateCount,
}

#[derive(Deserialize)]
struct AggregateCount {
    count: usize,
}

#[derive(Deserialize)]
struct MeetingPreferredRangeRows {
    #[serde(rename = "Meeting_Assist_Preferred_Time_Range")]
    rows: Vec<MeetingAssistPreferredTimeRange>,
}

#[derive(Deserialize)]
struct MeetingAssistEventRows {
    #[serde(rename = "Meeting_Assist_Event")]
    rows: Vec<MeetingAssistEvent>,
}

#[derive(Deserialize)]
struct ExternalPreferenceRows {
    #[serde(rename = "Meeting_Assist_External_Attendee_Preference")]
    rows: Vec<ExternalAttendeePreference>,
}

#[derive(Deserialize)]
struct FreemiumRows {
    #[serde(rename = "Freemium")]
    rows: Vec<Freemium>,
}

#[derive(Deserialize)]
struct FreemiumUpdate {
    #[serde(rename = "update_Freemium_by_pk")]
    row: Option<Freemium>,
}

/// One client, every persistence port.
#[derive(Clone)]
pub struct GraphQlRepository {
    client: GraphQlClient,
}

impl GraphQlRepository {
    pub fn new(client: GraphQlClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PreferenceRepository for GraphQlRepository {
    async fn get_user_preferences(&self, user_id: &str) -> Result<Option<UserPreference>> {
        let data: UserPreferenceRows = self
            .client
            .execute("getUserPreferences", queries::get_user_preferences(), json!({ "userId": user_id }))
            .await?;
        Ok(data.rows.into_iter().next())
    }

    async fn get_global_calendar(&self, user_id: &str) -> Result<Option<Calendar>> {
        let data: CalendarRows = self
            .client
            .execute("getGlobalCalendar", queries::get_global_calendar(), json!({ "userId": user_id }))
            .await?;
        Ok(data.rows.into_iter().next())
    }

    async fn list_events_for_user(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>> {
        let variables =
            json!({ "userId": user_id, "startDate": timestamp(start), "endDate": timestamp(end) });
        let data: EventRows =
            self.client.execute("listEventsForUser", &queries::list_events_for_user(), variables).await?;
        debug!(user_id, events = data.rows.len(), "events listed");
        Ok(data.rows)
    }

    async fn list_events_with_ids(&self, ids: &[String]) -> Result<Vec<CalendarEvent>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let data: EventRows = self
            .client
            .execute("listEventsWithIds", &queries::list_events_with_ids(), json!({ "ids": ids }))
            .await?;
        Ok(data.rows)
    }

    async fn list_preferred_time_ranges_for_event(&self, event_id: &str) -> Result<Vec<PreferredTimeRange>> {
        let data: PreferredTimeRangeRows = self
            .client
            .execute(
                "ListPreferredTimeRangesGivenEventId",
                queries::list_preferred_time_ranges_for_event(),
                json!({ "eventId": event_id }),
            )
            .await?;
        Ok(data.rows)
    }
}

#[async_trait]
impl MeetingAssistRepository for GraphQlRepository {
    async fn get_meeting_assist(&self, meeting_id: &str) -> Result<Option<MeetingAssist>> {
        let data: MeetingAssistByPk = self
            .client
            .execute("GetMeetingAssistById", queries::get_meeting_assist(), json!({ "id": meeting_id }))
            .await?;
        Ok(data.row)
    }

    async fn list_attendees(&self, meeting_id: &str) -> Result<Vec<MeetingAssistAttendee>> {
        let data: AttendeeRows = self
            .client
            .execute(
                "ListMeetingAssistAttendeesByMeetingId",
                queries::list_meeting_assist_attendees(),
                json!({ "meetingId": meeting_id }),
            )
            .await?;
        Ok(data.rows)
    }

    async fn attendee_count(&self, meeting_id: &str) -> Result<usize> {
        let data: AttendeeAggregate = self
            .client
            .execute(
                "AttendeeCountGiveMeetingId",
                queries::meeting_assist_attendee_count(),
                json!({ "meetingId": meeting_id }),
            )
            .await?;
        Ok(data.aggregate.aggregate.count)
    }

    async fn list_preferred_time_ranges(
        &self,
        meeting_id: &str,
    ) -> Result<Vec<MeetingAssistPreferredTimeRange>> {
        let data: MeetingPreferredRangeRows = self
            .client
            .execute(
                "ListMeetingAssistPrefereredTimeRangesByMeetingId",
                queries::list_meeting_assist_preferred_time_ranges(),
                json!({ "meetingId": meeting_id }),
            )
            .await?;
        Ok(data.rows)
    }

    async fn list_events_for_attendee(
        &self,
        attendee_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<MeetingAssistEvent>> {
        let variables = json!({
            "attendeeId": attendee_id,
            "startDate": timestamp(start),
            "endDate": timestamp(end),
        });
        let data: MeetingAssistEventRows = self
            .client
            .execute(
                "ListMeetingAssistEventsForAttendeeGivenDates",
                queries::list_meeting_assist_events_for_attendee(),
                variables,
            )
            .await?;
        Ok(data.rows)
    }

    async fn list_external_attendee_preferences(
        &self,
        meeting_id: &str,
        attendee_id: &str,
    ) -> Result<Vec<ExternalAttendeePreference>> {
        let data: ExternalPreferenceRows = self
            .client
            .execute(
                "ListExternalAttendeePreferences",
                queries::list_external_attendee_preferences(),
                json!({ "meetingAssistId": meeting_id, "meetingAssistAttendeeId": attendee_id }),
            )
            .await?;
        Ok(data.rows)
    }
}

#[async_trait]
impl UsageCounterRepository for GraphQlRepository {
    async fn get_freemium_by_user_id(&self, user_id: &str) -> Result<Option<Freemium>> {
        let data: FreemiumRows = self
            .client
            .execute("GetFreemiumByUserId", queries::get_freemium_by_user_id(), json!({ "userId": user_id }))
            .await?;
        Ok(data.rows.into_iter().next())
    }

    async fn update_freemium_usage(&self, id: &str, usage: i64) -> Result<Freemium> {
        let data: FreemiumUpdate = self
            .client
            .execute("UpdateFreemiumById", queries::update_freemium_usage(), json!({ "id": id, "usage": usage }))
            .await?;
        data.row.ok_or_else(|| ScheduleError::NotFound(format!("freemium {id}")))
    }
}
