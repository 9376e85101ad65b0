//! Break budgeting and placement.
//!
//! All budget arithmetic is in minutes. A day is the attendee-local
//! calendar day; its working window comes from the attendee's preferences.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use scheduleprep_domain::constants::{
    BREAK_PRIORITY, BREAK_TITLE, DEFAULT_BREAK_COLOR, MAX_BREAK_HOURS_PER_DAY,
};
use scheduleprep_domain::{Calendar, CalendarEvent, DayOfWeek, UserPreference};
use tracing::debug;

use crate::buffer_time::synthesized_id;
use crate::event_parts::event_minutes;
use crate::time_math::{civil_to_instant, parse_timezone, render};

/// Outcome of the per-day budget computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakBudget {
    pub working_minutes: f64,
    pub used_minutes: f64,
    pub break_used_minutes: f64,
    pub must_be_break_minutes: f64,
    pub available_minutes: f64,
    pub desired_minutes: f64,
    pub breaks_to_generate: u32,
}

/// Share of the working day the workload cap reserves for breaks.
pub fn must_be_break_minutes(working_minutes: f64, max_work_load_percent: u32) -> f64 {
    working_minutes * (1.0 - f64::from(max_work_load_percent) / 100.0)
}

/// False once existing breaks already satisfy both the minimum break count
/// and the workload cap.
pub fn should_generate_breaks(
    prefs: &UserPreference,
    working_minutes: f64,
    break_used_minutes: f64,
) -> bool {
    let minimum = f64::from(prefs.min_number_of_breaks) * f64::from(prefs.effective_break_length());
    let must = must_be_break_minutes(working_minutes, prefs.max_work_load_percent);
    break_used_minutes < minimum.max(must)
}

/// How many breaks of `effective_break_length` a day needs, if any.
pub fn plan_break_budget(
    prefs: &UserPreference,
    working_minutes: f64,
    used_minutes: f64,
    break_used_minutes: f64,
) -> Option<BreakBudget> {
    let length = f64::from(prefs.effective_break_length());
    let must = must_be_break_minutes(working_minutes, prefs.max_work_load_percent);

    let available = (working_minutes - used_minutes).max(must);
    if available <= 0.0 {
        return None;
    }

    let minimum = f64::from(prefs.min_number_of_breaks) * length;
    let desired = available.min(minimum.max(must));
    if desired > MAX_BREAK_HOURS_PER_DAY * 60.0 {
        debug!(desired, "break budget exceeds daily cap");
        return None;
    }

    let remaining = desired - break_used_minutes;
    let count = (remaining / length + 1e-9).floor();
    if count < 1.0 {
        return None;
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let breaks_to_generate = count as u32;

    Some(BreakBudget {
        working_minutes,
        used_minutes,
        break_used_minutes,
        must_be_break_minutes: must,
        available_minutes: available,
        desired_minutes: desired,
        breaks_to_generate,
    })
}

/// Minutes of busy time and of existing breaks among `events`.
pub fn day_usage(events: &[CalendarEvent]) -> (f64, f64) {
    events.iter().filter(|event| !event.deleted && !event.all_day).fold(
        (0.0, 0.0),
        |(used, breaks), event| {
            #[allow(clippy::cast_precision_loss)]
            let minutes = event_minutes(event).max(0) as f64;
            if event.is_break {
                (used, breaks + minutes)
            } else {
                (used + minutes, breaks)
            }
        },
    )
}

/// Breaks anchored at `anchor_start`, before placement.
pub fn generate_break_events(
    prefs: &UserPreference,
    calendar: &Calendar,
    count: u32,
    anchor_start: chrono::NaiveDateTime,
    attendee_tz: Tz,
) -> Vec<CalendarEvent> {
    let length = prefs.effective_break_length();
    let color = prefs.break_color.clone().unwrap_or_else(|| DEFAULT_BREAK_COLOR.to_string());

    (0..count)
        .map(|_| CalendarEvent {
            id: synthesized_id(&calendar.id),
            user_id: prefs.user_id.clone(),
            calendar_id: calendar.id.clone(),
            title: Some(BREAK_TITLE.to_string()),
            summary: Some(BREAK_TITLE.to_string()),
            start_date: anchor_start,
            end_date: anchor_start + Duration::minutes(i64::from(length)),
            timezone: Some(attendee_tz.name().to_string()),
            duration: Some(i64::from(length)),
            is_break: true,
            priority: BREAK_PRIORITY,
            modifiable: true,
            background_color: Some(color.clone()),
            ..CalendarEvent::default()
        })
        .collect()
}

/// One attendee-local day to plan breaks for.
#[derive(Debug, Clone, Copy)]
pub struct BreakDay<'a> {
    pub prefs: &'a UserPreference,
    pub calendar: &'a Calendar,
    pub attendee_tz: Tz,
    pub date: NaiveDate,
    /// Breaks must fall inside these instants as well as the working window.
    pub bounds: (DateTime<Utc>, DateTime<Utc>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Span {
    fn overlaps(self, other: Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Budget and place breaks for one day. Breaks that find no free gap are
/// dropped.
pub fn breaks_for_day(day: &BreakDay<'_>, events: &[CalendarEvent]) -> Vec<CalendarEvent> {
    let weekday = DayOfWeek::from(chrono::Datelike::weekday(&day.date));
    let Some((start, end)) = day.prefs.working_window(weekday) else {
        return Vec::new();
    };
    let window = Span {
        start: civil_to_instant(day.date.and_time(start), day.attendee_tz),
        end: civil_to_instant(day.date.and_time(end), day.attendee_tz),
    };

    let todays: Vec<(Span, &CalendarEvent)> = events
        .iter()
        .filter(|event| !event.deleted && !event.all_day)
        .map(|event| (span_of(event, day.attendee_tz), event))
        .filter(|(span, _)| render(span.start, day.attendee_tz).date() == day.date)
        .collect();

    let day_events: Vec<CalendarEvent> = todays.iter().map(|(_, event)| (*event).clone()).collect();
    let (used, break_used) = day_usage(&day_events);
    #[allow(clippy::cast_precision_loss)]
    let working = (window.end - window.start).num_minutes() as f64;

    if !should_generate_breaks(day.prefs, working, break_used) {
        return Vec::new();
    }
    let Some(budget) = plan_break_budget(day.prefs, working, used, break_used) else {
        return Vec::new();
    };

    let mut busy: Vec<Span> =
        todays.iter().filter(|(_, event)| !event.is_break).map(|(span, _)| *span).collect();
    busy.sort_by_key(|span| span.start);
    let Some(first) = busy.first() else {
        return Vec::new();
    };
    let occupied: Vec<Span> = todays.iter().map(|(span, _)| *span).collect();

    let breaks = generate_break_events(
        day.prefs,
        day.calendar,
        budget.breaks_to_generate,
        render(first.start, day.attendee_tz),
        day.attendee_tz,
    );
    let length = Duration::minutes(i64::from(day.prefs.effective_break_length()));
    let earliest = window.start.max(day.bounds.0);
    let latest = window.end.min(day.bounds.1);

    let mut placed: Vec<Span> = Vec::new();
    let mut accepted = Vec::new();
    for mut candidate_break in breaks {
        let found = busy.iter().map(|event| Span { start: event.start - length, end: event.start }).find(
            |candidate| {
                candidate.start >= earliest
                    && candidate.end <= latest
                    && !occupied.iter().any(|span| span.overlaps(*candidate))
                    && !placed.iter().any(|span| span.overlaps(*candidate))
            },
        );
        if let Some(slot) = found {
            candidate_break.start_date = render(slot.start, day.attendee_tz);
            candidate_break.end_date = render(slot.end, day.attendee_tz);
            placed.push(slot);
            accepted.push(candidate_break);
        }
    }

    debug!(
        user_id = %day.prefs.user_id,
        date = %day.date,
        budgeted = budget.breaks_to_generate,
        placed = accepted.len(),
        "placed breaks"
    );
    accepted
}

/// Breaks for every attendee-local day touched by `[start, end]`.
pub fn breaks_for_window(
    prefs: &UserPreference,
    calendar: &Calendar,
    events: &[CalendarEvent],
    attendee_tz: Tz,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<CalendarEvent> {
    let first = render(start, attendee_tz).date();
    let last = render(end, attendee_tz).date();

    first
        .iter_days()
        .take_while(|date| *date <= last)
        .flat_map(|date| {
            let day = BreakDay { prefs, calendar, attendee_tz, date, bounds: (start, end) };
            breaks_for_day(&day, events)
        })
        .collect()
}

fn span_of(event: &CalendarEvent, fallback: Tz) -> Span {
    let tz = event.timezone.as_deref().and_then(parse_timezone).unwrap_or(fallback);
    Span { start: civil_to_instant(event.start_date, tz), end: civil_to_instant(event.end_date, tz) }
}
