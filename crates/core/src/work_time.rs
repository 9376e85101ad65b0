//! Per-weekday working windows, rendered in the host's timezone.
//!
//! Internal attendees read their windows from stored preferences. External
//! attendees have none, so their windows are inferred from their own event
//! history.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use chrono_tz::Tz;
use scheduleprep_domain::{CalendarEvent, DayOfWeek, UserPreference, WorkTime};
use tracing::debug;

use crate::time_math::{
    clock_end, clock_from_minutes, convert_civil, day_of_week, end_of_day, parse_timezone,
    quantize_clock, start_of_day, Edge, Grid,
};

/// Entries for every ISO weekday the preferences define.
///
/// Each window is placed on the matching weekday of the week containing
/// `reference` (attendee-local), converted to host time, and tagged with
/// the host-local weekday it falls on. A window that crosses host-local
/// midnight yields two entries, one per host weekday.
pub fn work_times_for_internal_attendee(
    host_id: &str,
    user_id: &str,
    prefs: &UserPreference,
    host_tz: Tz,
    attendee_tz: Tz,
    reference: NaiveDate,
) -> Vec<WorkTime> {
    let monday = reference - Duration::days(i64::from(reference.weekday().num_days_from_monday()));

    DayOfWeek::ALL
        .iter()
        .filter_map(|&day| {
            let Some((start, end)) = prefs.working_window(day) else {
                debug!(user_id, day = %day, "no working window stored for weekday");
                return None;
            };
            let date = monday + Duration::days(i64::from(day.iso_number() - 1));
            let start_host = convert_civil(date.and_time(start), attendee_tz, host_tz);
            let end_host = convert_civil(date.and_time(end), attendee_tz, host_tz);
            Some(host_day_pieces(start_host, end_host))
        })
        .flatten()
        .map(|(day_of_week, start_time, end_time)| WorkTime {
            day_of_week,
            start_time,
            end_time,
            host_id: host_id.to_string(),
            user_id: user_id.to_string(),
        })
        .collect()
}

/// Cut a host-local span at each midnight it crosses.
///
/// Every piece is `(weekday, start, end)` on one host day; a piece that runs
/// to midnight ends at [`end_of_day`]. Empty pieces are skipped.
pub fn host_day_pieces(
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Vec<(DayOfWeek, NaiveTime, NaiveTime)> {
    let mut pieces = Vec::new();
    let mut cursor = start;
    while cursor < end {
        let midnight = start_of_day(cursor.date() + Duration::days(1));
        let piece_end = end.min(midnight);
        pieces.push((day_of_week(cursor), cursor.time(), clock_end(cursor, piece_end)));
        cursor = piece_end;
    }
    pieces
}

/// Host-local working windows inferred from an attendee's events.
///
/// For each host-local weekday: earliest start floored to the quarter hour,
/// latest end pushed to the close of its quarter-hour band. Weekdays with
/// no events are absent.
pub fn external_working_windows(
    events: &[CalendarEvent],
    host_tz: Tz,
) -> BTreeMap<DayOfWeek, (NaiveTime, NaiveTime)> {
    let mut spans: BTreeMap<DayOfWeek, (NaiveTime, NaiveTime)> = BTreeMap::new();

    for event in events.iter().filter(|event| event.is_busy_time()) {
        let event_tz = event.timezone.as_deref().and_then(parse_timezone).unwrap_or(host_tz);
        let start_host = convert_civil(event.start_date, event_tz, host_tz);
        let end_host = convert_civil(event.end_date, event_tz, host_tz);
        if end_host <= start_host {
            continue;
        }
        let end_clock = clock_end(start_host, end_host);

        spans
            .entry(day_of_week(start_host))
            .and_modify(|(earliest, latest)| {
                *earliest = (*earliest).min(start_host.time());
                *latest = (*latest).max(end_clock);
            })
            .or_insert((start_host.time(), end_clock));
    }

    spans
        .into_iter()
        .map(|(day, (earliest, latest))| {
            let start = clock_from_minutes(quantize_clock(earliest, Grid::QuarterHour, Edge::Start));
            let end = clock_from_minutes(quantize_clock(latest, Grid::QuarterHour, Edge::End));
            (day, (start, end))
        })
        .collect()
}

/// Work times for an external attendee; weekdays without history get no
/// entry, which callers treat as "no availability".
pub fn work_times_for_external_attendee(
    host_id: &str,
    user_id: &str,
    events: &[CalendarEvent],
    host_tz: Tz,
) -> Vec<WorkTime> {
    external_working_windows(events, host_tz)
        .into_iter()
        .map(|(day, (start, end))| WorkTime {
            day_of_week: day,
            start_time: start,
            end_time: end,
            host_id: host_id.to_string(),
            user_id: user_id.to_string(),
        })
        .collect()
}

/// Hours between two clock times of the same day. An end of
/// [`end_of_day`] counts as midnight.
pub fn window_hours(start: NaiveTime, end: NaiveTime) -> f64 {
    let close = if end == end_of_day() { 86_400 } else { i64::from(end.num_seconds_from_midnight()) };
    #[allow(clippy::cast_precision_loss)]
    let seconds = (close - i64::from(start.num_seconds_from_midnight())).max(0) as f64;
    seconds / 3600.0
}

/// Sum of working hours tagged with `day`.
pub fn total_working_hours(work_times: &[WorkTime], day: DayOfWeek) -> f64 {
    work_times
        .iter()
        .filter(|work_time| work_time.day_of_week == day)
        .map(|work_time| window_hours(work_time.start_time, work_time.end_time))
        .sum()
}
