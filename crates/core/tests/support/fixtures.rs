//! Fixture builders and a wired-up service for scenario tests.

use std::sync::{Arc, Mutex};

use chrono::NaiveDateTime;
use chrono_tz::Tz;
use scheduleprep_core::time_math::parse_timezone;
use scheduleprep_core::{SchedulingService, SolverGateway, SubmissionSettings, UsageMeter};
use scheduleprep_domain::{Calendar, CalendarEvent, MeetingAssistAttendee};

use super::repositories::{
    CallLog, MockPreferenceRepository, MockUsageCounterRepository, RecordingObjectStore,
    RecordingSolver,
};

pub const CALLBACK_URL: &str = "https://callback.example/plan";

pub fn civil(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
}

pub fn new_york() -> Tz {
    parse_timezone("America/New_York").unwrap()
}

/// A fixed, modifiable event in New York time.
pub fn event(id: &str, user_id: &str, start: &str, end: &str) -> CalendarEvent {
    CalendarEvent {
        id: id.into(),
        user_id: user_id.into(),
        calendar_id: format!("{user_id}-cal"),
        start_date: civil(start),
        end_date: civil(end),
        timezone: Some("America/New_York".into()),
        modifiable: true,
        priority: 1,
        ..CalendarEvent::default()
    }
}

pub fn primary_calendar(user_id: &str) -> Calendar {
    Calendar {
        id: format!("{user_id}-cal"),
        user_id: user_id.into(),
        global_primary: true,
        ..Calendar::default()
    }
}

pub fn internal_attendee(id: &str, user_id: &str, meeting_id: &str) -> MeetingAssistAttendee {
    MeetingAssistAttendee {
        id: id.into(),
        host_id: "host".into(),
        user_id: Some(user_id.into()),
        primary_email: Some(format!("{user_id}@example.com")),
        timezone: Some("America/New_York".into()),
        external_attendee: false,
        meeting_id: Some(meeting_id.into()),
        ..MeetingAssistAttendee::default()
    }
}

pub fn external_attendee(id: &str, timezone: &str, meeting_id: &str) -> MeetingAssistAttendee {
    MeetingAssistAttendee {
        id: id.into(),
        host_id: "host".into(),
        primary_email: Some(format!("{id}@partner.example")),
        timezone: Some(timezone.into()),
        external_attendee: true,
        meeting_id: Some(meeting_id.into()),
        ..MeetingAssistAttendee::default()
    }
}

/// A service wired to recording mocks.
pub struct Harness {
    pub service: Arc<SchedulingService>,
    pub preferences: MockPreferenceRepository,
    pub store: RecordingObjectStore,
    pub solver: RecordingSolver,
    pub log: CallLog,
}

impl Harness {
    pub fn new(preferences: MockPreferenceRepository) -> Self {
        Self::build(preferences, None, false)
    }

    pub fn with_usage(preferences: MockPreferenceRepository, usage: MockUsageCounterRepository) -> Self {
        Self::build(preferences, Some(usage), false)
    }

    /// Archive writes fail; the solver must never be reached.
    pub fn with_failing_store(
        preferences: MockPreferenceRepository,
        usage: MockUsageCounterRepository,
    ) -> Self {
        Self::build(preferences, Some(usage), true)
    }

    fn build(
        preferences: MockPreferenceRepository,
        usage: Option<MockUsageCounterRepository>,
        failing_store: bool,
    ) -> Self {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let store = if failing_store {
            RecordingObjectStore::failing(log.clone())
        } else {
            RecordingObjectStore::new(log.clone())
        };
        let solver = RecordingSolver::new(log.clone());
        let gateway = SolverGateway::new(Arc::new(store.clone()), Arc::new(solver.clone()));
        let settings = SubmissionSettings { callback_url: CALLBACK_URL.into(), delay_ms: 0 };

        let mut service = SchedulingService::new(Arc::new(preferences.clone()), gateway, settings);
        if let Some(usage) = usage {
            service = service.with_usage_meter(UsageMeter::new(Arc::new(usage)));
        }

        Self { service: Arc::new(service), preferences, store, solver, log }
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}
