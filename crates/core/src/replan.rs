//! Re-solving an already scheduled meeting under new constraints.
//!
//! Every event other than the one being replanned is fixed in place, so the
//! solver only moves the replanned meeting.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use chrono_tz::Tz;
use futures::future::try_join_all;
use scheduleprep_domain::constants::REPLAN_FALLBACK_EXTRA_DAYS;
use scheduleprep_domain::{
    AttendeeEmail, CalendarEvent, MeetingAssistAttendee, NewConstraints, PlannerEventPart,
    ReplanArchiveContext, ReplanTarget, Result, ScheduleError, UserPreference,
};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::meeting_event::calendar_event_from_assist_event;
use crate::planner::format::pin_unmodifiable_part;
use crate::planner::{
    ExternalAttendeeData, InternalAttendeeData, PlanInput, PlanningContext, SchedulingService,
};
use crate::scheduling_ports::MeetingAssistRepository;
use crate::solver::SubmissionReceipt;
use crate::time_math::{
    civil_to_instant, convert_civil, end_of_day, parse_timezone, render, start_of_day,
};

/// Originals minus removals, plus additions not already present.
///
/// A removal matches an attendee's primary email, id or user id. New
/// attendees default to the host timezone and count as external when they
/// have no user id.
pub fn apply_attendee_changes(
    original: &[MeetingAssistAttendee],
    constraints: &NewConstraints,
    host_id: &str,
    host_timezone: &str,
) -> Vec<MeetingAssistAttendee> {
    let removed = |attendee: &MeetingAssistAttendee| {
        constraints.removed_attendee_emails_or_ids.iter().any(|key| {
            attendee.resolved_primary_email() == Some(key.as_str())
                || attendee.id == *key
                || attendee.user_id.as_deref() == Some(key.as_str())
        })
    };
    let mut attendees: Vec<MeetingAssistAttendee> =
        original.iter().filter(|attendee| !removed(attendee)).cloned().collect();
    let meeting_id = original.iter().find_map(|attendee| attendee.meeting_id.clone());

    for added in &constraints.added_attendees {
        let duplicate = attendees.iter().any(|existing| {
            existing.resolved_primary_email() == Some(added.email.as_str())
                || (added.user_id.is_some() && existing.user_id == added.user_id)
        });
        if duplicate {
            debug!(email = %added.email, "added attendee already present");
            continue;
        }
        attendees.push(MeetingAssistAttendee {
            id: Uuid::new_v4().to_string(),
            name: added.name.clone(),
            host_id: host_id.to_string(),
            user_id: added.user_id.clone(),
            emails: vec![AttendeeEmail {
                primary: true,
                value: added.email.clone(),
                kind: None,
                display_name: added.name.clone(),
            }],
            primary_email: Some(added.email.clone()),
            timezone: Some(added.timezone.clone().unwrap_or_else(|| host_timezone.to_string())),
            external_attendee: added.external_attendee.unwrap_or(added.user_id.is_none()),
            meeting_id: meeting_id.clone(),
        });
    }
    attendees
}

/// Host-local planning window for a replan.
///
/// Uses the new UTC window when both ends are given; otherwise the
/// replanned event's host-local day through six days later.
pub fn replan_window(
    event: &CalendarEvent,
    constraints: &NewConstraints,
    host_tz: Tz,
) -> (NaiveDateTime, NaiveDateTime) {
    if let (Some(start), Some(end)) =
        (constraints.new_time_window_start_utc, constraints.new_time_window_end_utc)
    {
        return (render(start, host_tz), render(end, host_tz));
    }

    let event_tz = event.timezone.as_deref().and_then(parse_timezone).unwrap_or(host_tz);
    let day = convert_civil(event.start_date, event_tz, host_tz).date();
    let last = day + Duration::days(REPLAN_FALLBACK_EXTRA_DAYS);
    (start_of_day(day), last.and_time(end_of_day()))
}

/// The replanned event with its new duration, free to move.
pub fn adjust_replanned_event(event: &CalendarEvent, constraints: &NewConstraints) -> CalendarEvent {
    let mut adjusted = event.clone();
    if let Some(minutes) = constraints.new_duration_minutes {
        adjusted.end_date = event.start_date + Duration::minutes(i64::from(minutes));
        adjusted.duration = Some(i64::from(minutes));
    }
    adjusted.modifiable = true;
    adjusted
}

/// Whether `event` is a copy of the replanned meeting.
pub fn is_replanned_event(event: &CalendarEvent, target: &CalendarEvent) -> bool {
    event.id == target.id || (target.meeting_id.is_some() && event.meeting_id == target.meeting_id)
}

/// Replanned parts stay movable; everything else is fixed and pinned.
pub fn apply_replan_flags(mut part: PlannerEventPart, target: &CalendarEvent) -> PlannerEventPart {
    let same_meeting = target.meeting_id.is_some() && part.meeting_id == target.meeting_id;
    if part.event_id == target.id || same_meeting {
        part.modifiable = true;
        part
    } else {
        part.modifiable = false;
        pin_unmodifiable_part(part)
    }
}

fn fix_events(
    events: Vec<CalendarEvent>,
    target: &CalendarEvent,
    constraints: &NewConstraints,
) -> Vec<CalendarEvent> {
    events
        .into_iter()
        .map(|event| {
            if is_replanned_event(&event, target) {
                adjust_replanned_event(&event, constraints)
            } else {
                CalendarEvent { modifiable: false, ..event }
            }
        })
        .collect()
}

/// Preferences fetched at most once per user within one replan.
#[derive(Default)]
struct PreferenceCache {
    entries: Mutex<HashMap<String, UserPreference>>,
}

impl PreferenceCache {
    async fn get_or_load(&self, service: &SchedulingService, user_id: &str) -> Result<UserPreference> {
        if let Some(prefs) = self.entries.lock().await.get(user_id) {
            return Ok(prefs.clone());
        }
        let prefs = service.load_preferences(user_id).await?;
        self.entries.lock().await.insert(user_id.to_string(), prefs.clone());
        Ok(prefs)
    }
}

pub struct ReplanOrchestrator {
    service: Arc<SchedulingService>,
    meetings: Option<Arc<dyn MeetingAssistRepository>>,
}

impl ReplanOrchestrator {
    pub fn new(service: Arc<SchedulingService>) -> Self {
        Self { service, meetings: None }
    }

    /// Source of imported history for external attendees.
    pub fn with_meeting_assists(mut self, meetings: Arc<dyn MeetingAssistRepository>) -> Self {
        self.meetings = Some(meetings);
        self
    }

    #[instrument(skip_all, fields(event_id = %target.event.id))]
    pub async fn replan(&self, target: ReplanTarget) -> Result<SubmissionReceipt> {
        let host_id = target.event.user_id.clone();
        let host_timezone = target.event.timezone.clone().unwrap_or_default();
        let host_tz = parse_timezone(&host_timezone).ok_or_else(|| {
            ScheduleError::InvalidInput(format!("unusable event timezone {host_timezone:?}"))
        })?;

        let constraints = &target.new_constraints;
        let attendees =
            apply_attendee_changes(&target.original_attendees, constraints, &host_id, &host_timezone);
        let (window_start, window_end) = replan_window(&target.event, constraints, host_tz);
        let fetch_window =
            (civil_to_instant(window_start, host_tz), civil_to_instant(window_end, host_tz));
        let ctx = PlanningContext { host_id: host_id.clone(), host_tz, window_start, window_end };

        let cache = PreferenceCache::default();
        let (internal_attendees, external_attendees): (Vec<_>, Vec<_>) =
            attendees.iter().partition(|attendee| !attendee.external_attendee);

        let loaded = try_join_all(internal_attendees.iter().map(|attendee| {
            let tz = attendee.timezone.as_deref().and_then(parse_timezone).unwrap_or(host_tz);
            self.load_internal(&cache, attendee.owner_id(), tz, fetch_window)
        }))
        .await?;
        let old_events: Vec<CalendarEvent> =
            loaded.iter().flat_map(|attendee| attendee.events.iter().cloned()).collect();
        let prepare_events = |data: InternalAttendeeData| {
            let mut events = fix_events(data.events, &target.event, constraints);
            if data.user_id == host_id && !events.iter().any(|event| event.id == target.event.id) {
                events.push(adjust_replanned_event(&target.event, constraints));
            }
            InternalAttendeeData { events, ..data }
        };
        let internal: Vec<InternalAttendeeData> = loaded.into_iter().map(prepare_events).collect();

        let host = match internal.iter().find(|attendee| attendee.user_id == host_id) {
            Some(host) => host.clone(),
            None => prepare_events(self.load_internal(&cache, &host_id, host_tz, fetch_window).await?),
        };

        let external = try_join_all(
            external_attendees
                .iter()
                .map(|attendee| self.load_external(attendee, &target, fetch_window, host_tz)),
        )
        .await?;

        info!(internal = internal.len(), external = external.len(), "replan attendees resolved");

        let input = PlanInput {
            ctx,
            host,
            internal,
            external,
            old_events,
            new_host_buffer_times: Vec::new(),
            replan: Some(ReplanArchiveContext {
                is_replan: true,
                original_event_id: target.google_event_id.clone(),
                original_calendar_id: target.calendar_id.clone(),
                new_constraints: target.new_constraints.clone(),
            }),
        };
        let prepared = self
            .service
            .prepare(input)
            .await?
            .map_parts(|part| apply_replan_flags(part, &target.event));
        self.service.submit(&prepared).await
    }

    async fn load_internal(
        &self,
        cache: &PreferenceCache,
        user_id: &str,
        tz: Tz,
        window: (DateTime<Utc>, DateTime<Utc>),
    ) -> Result<InternalAttendeeData> {
        let prefs = cache.get_or_load(&self.service, user_id).await?;
        self.service.load_internal_attendee_with(user_id, tz, window, prefs).await
    }

    async fn load_external(
        &self,
        attendee: &MeetingAssistAttendee,
        target: &ReplanTarget,
        window: (DateTime<Utc>, DateTime<Utc>),
        host_tz: Tz,
    ) -> Result<ExternalAttendeeData> {
        let (mut events, explicit_preferences) = match (&self.meetings, &target.event.meeting_id) {
            (Some(meetings), meeting_id) => {
                let history = meetings.list_events_for_attendee(&attendee.id, window.0, window.1).await?;
                let explicit = match meeting_id {
                    Some(meeting_id) => {
                        meetings.list_external_attendee_preferences(meeting_id, &attendee.id).await?
                    }
                    None => Vec::new(),
                };
                let events = history
                    .iter()
                    .map(|event| calendar_event_from_assist_event(event, attendee))
                    .collect();
                (events, explicit)
            }
            (None, _) => (Vec::new(), Vec::new()),
        };

        events.push(CalendarEvent {
            user_id: attendee.owner_id().to_string(),
            is_external_meeting: true,
            is_external_meeting_modifiable: true,
            ..adjust_replanned_event(&target.event, &target.new_constraints)
        });

        Ok(ExternalAttendeeData {
            user_id: attendee.owner_id().to_string(),
            timezone: attendee.timezone.as_deref().and_then(parse_timezone).unwrap_or(host_tz),
            events,
            explicit_preferences,
        })
    }
}

#[cfg(test)]
mod tests {
    use scheduleprep_domain::AddedAttendee;

    use super::*;

    fn civil(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn attendee(id: &str, email: &str, user_id: Option<&str>) -> MeetingAssistAttendee {
        MeetingAssistAttendee {
            id: id.into(),
            user_id: user_id.map(Into::into),
            emails: vec![AttendeeEmail { primary: true, value: email.into(), ..AttendeeEmail::default() }],
            meeting_id: Some("ma-1".into()),
            ..MeetingAssistAttendee::default()
        }
    }

    #[test]
    fn removal_matches_email_id_or_user() {
        let original = vec![
            attendee("a1", "one@x.io", Some("u1")),
            attendee("a2", "two@x.io", Some("u2")),
            attendee("a3", "three@x.io", Some("u3")),
            attendee("a4", "four@x.io", None),
        ];
        let constraints = NewConstraints {
            removed_attendee_emails_or_ids: vec!["one@x.io".into(), "a2".into(), "u3".into()],
            ..NewConstraints::default()
        };
        let result = apply_attendee_changes(&original, &constraints, "host", "UTC");
        let ids: Vec<&str> = result.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["a4"]);
    }

    #[test]
    fn additions_skip_duplicates_and_default_fields() {
        let original = vec![attendee("a1", "one@x.io", Some("u1"))];
        let constraints = NewConstraints {
            added_attendees: vec![
                AddedAttendee { email: "one@x.io".into(), ..AddedAttendee::default() },
                AddedAttendee { email: "other@x.io".into(), user_id: Some("u1".into()), ..AddedAttendee::default() },
                AddedAttendee { email: "new@x.io".into(), ..AddedAttendee::default() },
            ],
            ..NewConstraints::default()
        };
        let result = apply_attendee_changes(&original, &constraints, "host", "Europe/Paris");
        assert_eq!(result.len(), 2);
        let added = &result[1];
        assert_eq!(added.resolved_primary_email(), Some("new@x.io"));
        assert!(added.external_attendee);
        assert_eq!(added.timezone.as_deref(), Some("Europe/Paris"));
        assert_eq!(added.meeting_id.as_deref(), Some("ma-1"));
        assert!(!added.id.is_empty());
    }

    fn meeting() -> CalendarEvent {
        CalendarEvent {
            id: "evt#cal".into(),
            user_id: "host".into(),
            start_date: civil("2024-06-05T15:00:00"),
            end_date: civil("2024-06-05T16:00:00"),
            timezone: Some("Europe/London".into()),
            meeting_id: Some("ma-1".into()),
            ..CalendarEvent::default()
        }
    }

    #[test]
    fn fallback_window_spans_a_week_from_event_day() {
        let ny = parse_timezone("America/New_York").unwrap();
        let (start, end) = replan_window(&meeting(), &NewConstraints::default(), ny);
        assert_eq!(start, civil("2024-06-05T00:00:00"));
        assert_eq!(end, civil("2024-06-11T23:59:59"));
    }

    #[test]
    fn explicit_window_is_rendered_in_host_time() {
        let ny = parse_timezone("America/New_York").unwrap();
        let constraints = NewConstraints {
            new_time_window_start_utc: Some(civil("2024-06-10T13:00:00").and_utc()),
            new_time_window_end_utc: Some(civil("2024-06-12T22:00:00").and_utc()),
            ..NewConstraints::default()
        };
        let (start, end) = replan_window(&meeting(), &constraints, ny);
        assert_eq!(start, civil("2024-06-10T09:00:00"));
        assert_eq!(end, civil("2024-06-12T18:00:00"));
    }

    #[test]
    fn replanned_event_gets_new_duration() {
        let constraints = NewConstraints { new_duration_minutes: Some(30), ..NewConstraints::default() };
        let adjusted = adjust_replanned_event(&meeting(), &constraints);
        assert_eq!(adjusted.end_date, civil("2024-06-05T15:30:00"));
        assert!(adjusted.modifiable);
    }

    #[test]
    fn other_events_are_fixed() {
        let other = CalendarEvent { id: "other".into(), modifiable: true, ..CalendarEvent::default() };
        let fixed = fix_events(vec![meeting(), other], &meeting(), &NewConstraints::default());
        assert!(fixed[0].modifiable);
        assert!(!fixed[1].modifiable);
    }
}
