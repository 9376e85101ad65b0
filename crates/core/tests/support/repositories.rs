//! Mock port implementations for testing
//!
//! Provides in-memory mocks for every scheduling port, enabling
//! deterministic scenario tests without a persistence service, object store
//! or solver.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scheduleprep_core::time_math::{civil_to_instant, parse_timezone};
use scheduleprep_core::{
    MeetingAssistRepository, ObjectStore, PreferenceRepository, SolverClient, UsageCounterRepository,
};
use scheduleprep_domain::{
    Calendar, CalendarEvent, ExternalAttendeePreference, Freemium, MeetingAssist,
    MeetingAssistAttendee, MeetingAssistEvent, MeetingAssistPreferredTimeRange,
    PlannerRequestBody, PreferredTimeRange, Result as DomainResult, ScheduleError, UserPreference,
};

/// Ordered record of calls across several mocks.
pub type CallLog = Arc<Mutex<Vec<String>>>;

fn overlaps(
    start: chrono::NaiveDateTime,
    end: chrono::NaiveDateTime,
    timezone: Option<&str>,
    window: (DateTime<Utc>, DateTime<Utc>),
) -> bool {
    let Some(tz) = timezone.and_then(parse_timezone) else {
        return false;
    };
    civil_to_instant(start, tz) <= window.1 && civil_to_instant(end, tz) >= window.0
}

/// In-memory mock for `PreferenceRepository`.
///
/// Records every preference lookup so tests can assert how often a user was
/// fetched.
#[derive(Default, Clone)]
pub struct MockPreferenceRepository {
    preferences: Arc<Vec<UserPreference>>,
    calendars: Arc<Vec<Calendar>>,
    events: Arc<Vec<CalendarEvent>>,
    preferred_ranges: Arc<Vec<PreferredTimeRange>>,
    lookups: CallLog,
}

impl MockPreferenceRepository {
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        Self { events: Arc::new(events), ..Self::default() }
    }

    pub fn with_preferences(mut self, prefs: UserPreference) -> Self {
        Arc::make_mut(&mut self.preferences).push(prefs);
        self
    }

    pub fn with_calendar(mut self, calendar: Calendar) -> Self {
        Arc::make_mut(&mut self.calendars).push(calendar);
        self
    }

    pub fn with_event(mut self, event: CalendarEvent) -> Self {
        Arc::make_mut(&mut self.events).push(event);
        self
    }

    pub fn with_preferred_range(mut self, range: PreferredTimeRange) -> Self {
        Arc::make_mut(&mut self.preferred_ranges).push(range);
        self
    }

    /// Number of preference lookups made for `user_id`.
    pub fn lookups_for(&self, user_id: &str) -> usize {
        self.lookups.lock().unwrap().iter().filter(|id| *id == user_id).count()
    }
}

#[async_trait]
impl PreferenceRepository for MockPreferenceRepository {
    async fn get_user_preferences(&self, user_id: &str) -> DomainResult<Option<UserPreference>> {
        self.lookups.lock().unwrap().push(user_id.to_string());
        Ok(self.preferences.iter().find(|prefs| prefs.user_id == user_id).cloned())
    }

    async fn get_global_calendar(&self, user_id: &str) -> DomainResult<Option<Calendar>> {
        Ok(self
            .calendars
            .iter()
            .find(|calendar| calendar.user_id == user_id && calendar.global_primary)
            .cloned())
    }

    async fn list_events_for_user(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<CalendarEvent>> {
        Ok(self
            .events
            .iter()
            .filter(|event| event.user_id == user_id && !event.deleted)
            .filter(|event| {
                overlaps(event.start_date, event.end_date, event.timezone.as_deref(), (start, end))
            })
            .cloned()
            .collect())
    }

    async fn list_events_with_ids(&self, ids: &[String]) -> DomainResult<Vec<CalendarEvent>> {
        Ok(self.events.iter().filter(|event| ids.contains(&event.id)).cloned().collect())
    }

    async fn list_preferred_time_ranges_for_event(
        &self,
        event_id: &str,
    ) -> DomainResult<Vec<PreferredTimeRange>> {
        Ok(self
            .preferred_ranges
            .iter()
            .filter(|range| range.event_id == event_id)
            .cloned()
            .collect())
    }
}

/// In-memory mock for `MeetingAssistRepository`.
#[derive(Default, Clone)]
pub struct MockMeetingAssistRepository {
    assists: Arc<Vec<MeetingAssist>>,
    attendees: Arc<Vec<MeetingAssistAttendee>>,
    preferred_ranges: Arc<Vec<MeetingAssistPreferredTimeRange>>,
    history: Arc<Vec<MeetingAssistEvent>>,
    external_preferences: Arc<Vec<(String, String, ExternalAttendeePreference)>>,
}

impl MockMeetingAssistRepository {
    pub fn new(assist: MeetingAssist) -> Self {
        Self { assists: Arc::new(vec![assist]), ..Self::default() }
    }

    pub fn with_attendee(mut self, attendee: MeetingAssistAttendee) -> Self {
        Arc::make_mut(&mut self.attendees).push(attendee);
        self
    }

    pub fn with_preferred_range(mut self, range: MeetingAssistPreferredTimeRange) -> Self {
        Arc::make_mut(&mut self.preferred_ranges).push(range);
        self
    }

    pub fn with_history(mut self, event: MeetingAssistEvent) -> Self {
        Arc::make_mut(&mut self.history).push(event);
        self
    }

    pub fn with_external_preference(
        mut self,
        meeting_id: &str,
        attendee_id: &str,
        preference: ExternalAttendeePreference,
    ) -> Self {
        Arc::make_mut(&mut self.external_preferences).push((
            meeting_id.to_string(),
            attendee_id.to_string(),
            preference,
        ));
        self
    }
}

#[async_trait]
impl MeetingAssistRepository for MockMeetingAssistRepository {
    async fn get_meeting_assist(&self, meeting_id: &str) -> DomainResult<Option<MeetingAssist>> {
        Ok(self.assists.iter().find(|assist| assist.id == meeting_id).cloned())
    }

    async fn list_attendees(&self, meeting_id: &str) -> DomainResult<Vec<MeetingAssistAttendee>> {
        Ok(self
            .attendees
            .iter()
            .filter(|attendee| attendee.meeting_id.as_deref() == Some(meeting_id))
            .cloned()
            .collect())
    }

    async fn attendee_count(&self, meeting_id: &str) -> DomainResult<usize> {
        Ok(self.list_attendees(meeting_id).await?.len())
    }

    async fn list_preferred_time_ranges(
        &self,
        meeting_id: &str,
    ) -> DomainResult<Vec<MeetingAssistPreferredTimeRange>> {
        Ok(self
            .preferred_ranges
            .iter()
            .filter(|range| range.meeting_id == meeting_id)
            .cloned()
            .collect())
    }

    async fn list_events_for_attendee(
        &self,
        attendee_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<MeetingAssistEvent>> {
        Ok(self
            .history
            .iter()
            .filter(|event| event.attendee_id == attendee_id)
            .filter(|event| {
                overlaps(event.start_date, event.end_date, event.timezone.as_deref(), (start, end))
            })
            .cloned()
            .collect())
    }

    async fn list_external_attendee_preferences(
        &self,
        meeting_id: &str,
        attendee_id: &str,
    ) -> DomainResult<Vec<ExternalAttendeePreference>> {
        let mut preferences: Vec<ExternalAttendeePreference> = self
            .external_preferences
            .iter()
            .filter(|(meeting, attendee, _)| meeting == meeting_id && attendee == attendee_id)
            .map(|(_, _, preference)| preference.clone())
            .collect();
        preferences.sort_by_key(|preference| preference.preferred_start_datetime);
        Ok(preferences)
    }
}

/// In-memory mock for `UsageCounterRepository`.
#[derive(Default, Clone)]
pub struct MockUsageCounterRepository {
    counters: Arc<Mutex<Vec<Freemium>>>,
}

impl MockUsageCounterRepository {
    pub fn new(counters: Vec<Freemium>) -> Self {
        Self { counters: Arc::new(Mutex::new(counters)) }
    }

    pub fn usage_for(&self, user_id: &str) -> Option<i64> {
        self.counters.lock().unwrap().iter().find(|c| c.user_id == user_id).map(|c| c.usage)
    }
}

#[async_trait]
impl UsageCounterRepository for MockUsageCounterRepository {
    async fn get_freemium_by_user_id(&self, user_id: &str) -> DomainResult<Option<Freemium>> {
        Ok(self.counters.lock().unwrap().iter().find(|c| c.user_id == user_id).cloned())
    }

    async fn update_freemium_usage(&self, id: &str, usage: i64) -> DomainResult<Freemium> {
        let mut counters = self.counters.lock().unwrap();
        let counter = counters
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ScheduleError::NotFound(format!("freemium {id}")))?;
        counter.usage = usage;
        Ok(counter.clone())
    }
}

/// Object store that keeps every archive in memory.
#[derive(Default, Clone)]
pub struct RecordingObjectStore {
    objects: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
    log: CallLog,
    fail: bool,
}

impl RecordingObjectStore {
    pub fn new(log: CallLog) -> Self {
        Self { log, ..Self::default() }
    }

    /// A store whose writes always fail.
    pub fn failing(log: CallLog) -> Self {
        Self { log, fail: true, ..Self::default() }
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().iter().map(|(key, _)| key.clone()).collect()
    }

    /// The single stored archive parsed as JSON.
    pub fn only_archive(&self) -> serde_json::Value {
        let objects = self.objects.lock().unwrap();
        assert_eq!(objects.len(), 1, "expected exactly one archive");
        serde_json::from_slice(&objects[0].1).unwrap()
    }
}

#[async_trait]
impl ObjectStore for RecordingObjectStore {
    async fn put_json(&self, key: &str, body: Vec<u8>) -> DomainResult<()> {
        self.log.lock().unwrap().push(format!("archive:{key}"));
        if self.fail {
            return Err(ScheduleError::Network("bucket unreachable".into()));
        }
        self.objects.lock().unwrap().push((key.to_string(), body));
        Ok(())
    }
}

/// Solver that records every request it accepts.
#[derive(Default, Clone)]
pub struct RecordingSolver {
    requests: Arc<Mutex<Vec<PlannerRequestBody>>>,
    log: CallLog,
}

impl RecordingSolver {
    pub fn new(log: CallLog) -> Self {
        Self { log, ..Self::default() }
    }

    pub fn requests(&self) -> Vec<PlannerRequestBody> {
        self.requests.lock().unwrap().clone()
    }

    pub fn only_request(&self) -> PlannerRequestBody {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one solver call");
        requests.into_iter().next().unwrap()
    }
}

#[async_trait]
impl SolverClient for RecordingSolver {
    async fn submit(&self, request: &PlannerRequestBody) -> DomainResult<()> {
        self.log.lock().unwrap().push(format!("solve:{}", request.singleton_id));
        self.requests.lock().unwrap().push(request.clone());
        Ok(())
    }
}
