//! Candidate time slots per day.
//!
//! Two granularities exist: full ([`Grid::QuarterHour`]) and lite
//! ([`Grid::HalfHour`]); the solver consumes lite slots.
//!
//! Weekday policy: the working window is chosen by the attendee-local
//! calendar day of the day anchor, and the window itself is evaluated in the
//! attendee's timezone. Every emitted slot is then rendered and tagged
//! (weekday, `--MM-DD`, date) from the host-local calendar of its own start.
//! A window that crosses host-local midnight is emitted in two pieces, so
//! slots never cross host-local midnight and nothing past it is lost.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use scheduleprep_domain::constants::EXTERNAL_PREFERENCE_SLOT_MINUTES;
use scheduleprep_domain::{CalendarEvent, ExternalAttendeePreference, TimeSlot, UserPreference};
use tracing::debug;

use crate::time_math::{
    civil_to_instant, clock_end, day_of_week, end_of_day, month_day, quantize_to_grid, render,
    start_of_day, Edge, Grid,
};
use crate::work_time::external_working_windows;

/// Slots for an internal attendee (or the host) on the day of `anchor`.
///
/// `anchor` is host-local civil time. On the first day of a planning window
/// the anchor doubles as "now": nothing is emitted once the working day is
/// over, and generation starts at the later of the working start and the
/// anchor snapped down to the grid.
pub fn slots_for_internal_attendee(
    anchor: NaiveDateTime,
    host_id: &str,
    prefs: &UserPreference,
    host_tz: Tz,
    attendee_tz: Tz,
    first_day: bool,
    grid: Grid,
) -> Vec<TimeSlot> {
    let anchor_instant = civil_to_instant(anchor, host_tz);
    let attendee_local = render(anchor_instant, attendee_tz);
    let weekday = day_of_week(attendee_local);

    let Some((start, end)) = prefs.working_window(weekday) else {
        debug!(user_id = %prefs.user_id, day = %weekday, "no working window; no slots for day");
        return Vec::new();
    };

    let date = attendee_local.date();
    let window_start = civil_to_instant(date.and_time(start), attendee_tz);
    let window_end = window_end_instant(date, end, attendee_tz);

    emit_slots(window_start, window_end, anchor_instant, first_day, host_id, host_tz, grid)
}

/// Slots for an external attendee inferred from their event history.
///
/// External windows are already host-local, so the anchor's host-local
/// weekday selects the window.
pub fn slots_for_external_attendee(
    anchor: NaiveDateTime,
    host_id: &str,
    events: &[CalendarEvent],
    host_tz: Tz,
    first_day: bool,
    grid: Grid,
) -> Vec<TimeSlot> {
    let windows = external_working_windows(events, host_tz);
    let weekday = day_of_week(anchor);
    let Some(&(start, end)) = windows.get(&weekday) else {
        return Vec::new();
    };

    let date = anchor.date();
    let window_start = civil_to_instant(date.and_time(start), host_tz);
    let window_end = window_end_instant(date, end, host_tz);
    let anchor_instant = civil_to_instant(anchor, host_tz);

    emit_slots(window_start, window_end, anchor_instant, first_day, host_id, host_tz, grid)
}

/// Half-hour slots from an external attendee's explicit availability.
///
/// A slot that would run past its preference is not emitted; slots outside
/// `[window_start, window_end]` are skipped.
pub fn slots_from_external_preferences(
    preferences: &[ExternalAttendeePreference],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    host_id: &str,
    host_tz: Tz,
) -> Vec<TimeSlot> {
    let step = Duration::minutes(EXTERNAL_PREFERENCE_SLOT_MINUTES);
    let mut slots = Vec::new();

    for preference in preferences {
        let mut cursor = preference.preferred_start_datetime;
        while cursor < preference.preferred_end_datetime {
            let next = cursor + step;
            if next > preference.preferred_end_datetime {
                break;
            }
            if cursor >= window_start && next <= window_end {
                slots.push(build_slot(cursor, next, host_id, host_tz));
            }
            cursor = next;
        }
    }

    slots
}

fn window_end_instant(date: NaiveDate, end: NaiveTime, tz: Tz) -> DateTime<Utc> {
    if end == end_of_day() {
        civil_to_instant(start_of_day(date + Duration::days(1)), tz)
    } else {
        civil_to_instant(date.and_time(end), tz)
    }
}

fn emit_slots(
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    anchor: DateTime<Utc>,
    first_day: bool,
    host_id: &str,
    host_tz: Tz,
    grid: Grid,
) -> Vec<TimeSlot> {
    if window_end <= window_start {
        return Vec::new();
    }

    let mut piece_start = if first_day {
        if anchor >= window_end {
            return Vec::new();
        }
        if anchor < window_start {
            window_start
        } else {
            let snapped = quantize_to_grid(render(anchor, host_tz), grid, Edge::Start);
            civil_to_instant(snapped, host_tz).max(window_start)
        }
    } else {
        window_start
    };

    let step = Duration::minutes(i64::from(grid.minutes()));
    let mut slots = Vec::new();
    while piece_start < window_end {
        let host_date = render(piece_start, host_tz).date();
        let host_midnight = civil_to_instant(start_of_day(host_date + Duration::days(1)), host_tz);
        let piece_end = window_end.min(host_midnight);

        let mut cursor = piece_start;
        while cursor + step <= piece_end {
            let next = cursor + step;
            slots.push(build_slot(cursor, next, host_id, host_tz));
            cursor = next;
        }
        piece_start = piece_end;
    }
    slots
}

fn build_slot(start: DateTime<Utc>, end: DateTime<Utc>, host_id: &str, host_tz: Tz) -> TimeSlot {
    let start_host = render(start, host_tz);
    let end_host = render(end, host_tz);
    TimeSlot {
        day_of_week: day_of_week(start_host),
        start_time: start_host.time(),
        end_time: clock_end(start_host, end_host),
        host_id: host_id.to_string(),
        month_day: month_day(start_host.date()),
        date: start_host.date(),
    }
}
