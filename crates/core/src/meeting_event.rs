//! Candidate meeting events for a meeting assist, and conversion of
//! imported attendee history into calendar events.

use chrono::{Datelike, Duration, NaiveDateTime};
use chrono_tz::Tz;
use scheduleprep_domain::{
    CalendarEvent, MeetingAssist, MeetingAssistAttendee, MeetingAssistEvent,
    MeetingAssistPreferredTimeRange,
};
use uuid::Uuid;

use crate::time_math::shift_civil;

/// The new meeting as it would sit on one attendee's calendar.
///
/// The event starts at `window_start` (host-local), moved to the preferred
/// ISO weekday and start time when a range is given. A weekday that falls
/// outside the window is tried one week later, then one week earlier.
pub fn generate_new_meeting_event(
    attendee: &MeetingAssistAttendee,
    assist: &MeetingAssist,
    window: (NaiveDateTime, NaiveDateTime),
    host_tz: Tz,
    calendar_id: Option<&str>,
    preferred: Option<&MeetingAssistPreferredTimeRange>,
) -> CalendarEvent {
    let (window_start, window_end) = window;
    let mut start = window_start;

    if let Some(day) = preferred.and_then(|range| range.day_of_week).filter(|day| (1..=7).contains(day)) {
        let current = start.weekday().number_from_monday();
        let moved = start + Duration::days(i64::from(day) - i64::from(current));
        let inside = |candidate: NaiveDateTime| candidate > window_start && candidate < window_end;
        start = if inside(moved) {
            moved
        } else if inside(moved + Duration::weeks(1)) {
            moved + Duration::weeks(1)
        } else {
            moved - Duration::weeks(1)
        };
    }

    if let Some(range) = preferred {
        start = start.date().and_time(range.start_time);
    }

    let calendar_id = calendar_id.unwrap_or(&assist.calendar_id).to_string();
    let event_id = Uuid::new_v4().to_string();

    CalendarEvent {
        id: format!("{event_id}#{calendar_id}"),
        user_id: attendee.owner_id().to_string(),
        calendar_id,
        event_id: Some(event_id),
        title: assist.summary.clone(),
        summary: assist.summary.clone(),
        notes: assist.notes.clone(),
        start_date: start,
        end_date: shift_civil(start, host_tz, i64::from(assist.duration)),
        timezone: Some(host_tz.name().to_string()),
        duration: Some(i64::from(assist.duration)),
        priority: assist.priority,
        modifiable: true,
        is_meeting: true,
        is_meeting_modifiable: true,
        is_external_meeting: attendee.external_attendee,
        is_external_meeting_modifiable: attendee.external_attendee,
        meeting_id: Some(assist.id.clone()),
        time_blocking: assist.buffer_time,
        ..CalendarEvent::default()
    }
}

/// Imported history for an external attendee, as a fixed calendar event.
pub fn calendar_event_from_assist_event(
    event: &MeetingAssistEvent,
    attendee: &MeetingAssistAttendee,
) -> CalendarEvent {
    CalendarEvent {
        id: event.id.clone(),
        user_id: attendee.owner_id().to_string(),
        calendar_id: event.calendar_id.clone().unwrap_or_default(),
        event_id: event.event_id.clone(),
        title: event.summary.clone(),
        summary: event.summary.clone(),
        start_date: event.start_date,
        end_date: event.end_date,
        timezone: event.timezone.clone().or_else(|| attendee.timezone.clone()),
        all_day: event.all_day,
        meeting_id: event.meeting_id.clone(),
        recurring_event_id: event.recurring_event_id.clone(),
        modifiable: false,
        ..CalendarEvent::default()
    }
}
