//! Per-part shaping for the solver: validation, formatting, pinning and
//! task-list tagging.

use std::collections::HashMap;

use chrono_tz::Tz;
use scheduleprep_domain::constants::{
    EXTERNAL_MAX_NUMBER_OF_MEETINGS, EXTERNAL_MAX_WORK_LOAD_PERCENT, EXTERNAL_MIN_NUMBER_OF_BREAKS,
};
use scheduleprep_domain::{
    CalendarEvent, DayOfWeek, InitialEventPart, PlannerEventPart, PlannerEventSummary, PlannerUser,
    UserPreference, WorkTime,
};
use tracing::debug;

use crate::time_math::{convert_civil, day_of_week, minutes_between, parse_timezone};
use crate::work_time::total_working_hours;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Whether `event` may be partitioned at all.
///
/// `working` carries the owner's preferences and timezone for internal
/// attendees; when present, the event must start inside that weekday's
/// working window.
pub fn validate_event_dates(event: &CalendarEvent, working: Option<(&UserPreference, Tz)>) -> bool {
    let Some(event_tz) = event.timezone.as_deref().and_then(parse_timezone) else {
        debug!(event_id = %event.id, "event has no usable timezone");
        return false;
    };
    if event.all_day {
        return false;
    }

    let minutes = minutes_between(event.start_date, event.end_date, event_tz);
    if minutes <= 0 || minutes >= MINUTES_PER_DAY {
        debug!(event_id = %event.id, minutes, "event duration out of range");
        return false;
    }

    let Some((prefs, owner_tz)) = working else {
        return true;
    };
    let local_start = convert_civil(event.start_date, event_tz, owner_tz);
    match prefs.working_window(day_of_week(local_start)) {
        Some((start, end)) => {
            let inside = local_start.time() >= start && local_start.time() < end;
            if !inside {
                debug!(event_id = %event.id, "event starts outside working window");
            }
            inside
        }
        None => false,
    }
}

/// Solver user for an attendee with stored preferences.
pub fn planner_user_for_internal(
    prefs: &UserPreference,
    host_id: &str,
    work_times: Vec<WorkTime>,
) -> PlannerUser {
    PlannerUser {
        id: prefs.user_id.clone(),
        host_id: host_id.to_string(),
        max_work_load_percent: prefs.max_work_load_percent,
        back_to_back_meetings: prefs.back_to_back_meetings,
        max_number_of_meetings: prefs.max_number_of_meetings,
        min_number_of_breaks: prefs.min_number_of_breaks,
        work_times,
    }
}

/// Solver user for an external attendee; limits are fixed permissive values.
pub fn planner_user_for_external(user_id: &str, host_id: &str, work_times: Vec<WorkTime>) -> PlannerUser {
    PlannerUser {
        id: user_id.to_string(),
        host_id: host_id.to_string(),
        max_work_load_percent: EXTERNAL_MAX_WORK_LOAD_PERCENT,
        back_to_back_meetings: false,
        max_number_of_meetings: EXTERNAL_MAX_NUMBER_OF_MEETINGS,
        min_number_of_breaks: EXTERNAL_MIN_NUMBER_OF_BREAKS,
        work_times,
    }
}

/// Render an initial part in host time with its owner attached.
///
/// All-day events and events without a usable timezone yield `None`.
pub fn format_event_part(
    part: &InitialEventPart,
    user: &PlannerUser,
    host_tz: Tz,
) -> Option<PlannerEventPart> {
    let event = &part.event;
    if event.all_day {
        return None;
    }
    let event_tz = event.timezone.as_deref().and_then(parse_timezone)?;
    let start_date = convert_civil(event.start_date, event_tz, host_tz);
    let end_date = convert_civil(event.end_date, event_tz, host_tz);
    let iso_day = |day: Option<u32>| day.and_then(DayOfWeek::from_iso_number);

    Some(PlannerEventPart {
        group_id: part.group_id.clone(),
        event_id: event.id.clone(),
        part: part.part,
        last_part: part.last_part,
        meeting_part: part.meeting_part,
        meeting_last_part: part.meeting_last_part,
        meeting_id: event.meeting_id.clone(),
        host_id: part.host_id.clone(),
        user_id: event.user_id.clone(),
        start_date,
        end_date,
        task_id: event.task_id.clone(),
        soft_deadline: event.soft_deadline,
        hard_deadline: event.hard_deadline,
        priority: event.priority,
        is_pre_event: event.is_pre_event,
        is_post_event: event.is_post_event,
        for_event_id: event.for_event_id.clone(),
        positive_impact_score: event.positive_impact_score,
        negative_impact_score: event.negative_impact_score,
        positive_impact_day_of_week: iso_day(event.positive_impact_day_of_week),
        positive_impact_time: event.positive_impact_time,
        negative_impact_day_of_week: iso_day(event.negative_impact_day_of_week),
        negative_impact_time: event.negative_impact_time,
        modifiable: event.modifiable,
        preferred_day_of_week: iso_day(event.preferred_day_of_week),
        preferred_time: event.preferred_time,
        is_meeting: event.is_meeting,
        is_external_meeting: event.is_external_meeting,
        is_external_meeting_modifiable: event.is_external_meeting_modifiable,
        is_meeting_modifiable: event.is_meeting_modifiable,
        daily_task_list: event.daily_task_list,
        weekly_task_list: event.weekly_task_list,
        gap: event.is_break,
        preferred_start_time_range: event.preferred_start_time_range,
        preferred_end_time_range: event.preferred_end_time_range,
        total_working_hours: total_working_hours(&user.work_times, day_of_week(start_date)),
        recurring_event_id: event.recurring_event_id.clone(),
        user: user.clone(),
        event: PlannerEventSummary {
            id: event.id.clone(),
            user_id: event.user_id.clone(),
            host_id: part.host_id.clone(),
            preferred_time_ranges: event.preferred_time_ranges.clone(),
            event_type: event.event_type.clone(),
        },
        part_minutes: part.part_minutes,
    })
}

/// Fix a non-modifiable part to its current host-local day and time,
/// unless it already states a preference.
pub fn pin_unmodifiable_part(mut part: PlannerEventPart) -> PlannerEventPart {
    if !part.modifiable && part.preferred_day_of_week.is_none() && part.preferred_time.is_none() {
        part.preferred_day_of_week = Some(day_of_week(part.start_date));
        part.preferred_time = Some(part.start_date.time());
    }
    part
}

/// Copy task-list flags from each part's recurring parent.
pub fn tag_daily_weekly_tasks(
    parts: Vec<PlannerEventPart>,
    parents: &[CalendarEvent],
) -> Vec<PlannerEventPart> {
    let by_id: HashMap<&str, &CalendarEvent> =
        parents.iter().map(|parent| (parent.id.as_str(), parent)).collect();

    parts
        .into_iter()
        .map(|mut part| {
            if let Some(parent) = part.recurring_event_id.as_deref().and_then(|id| by_id.get(id)) {
                part.daily_task_list = parent.daily_task_list;
                part.weekly_task_list = parent.weekly_task_list;
            }
            part
        })
        .collect()
}
