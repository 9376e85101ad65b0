//! Per-attendee-class pipelines. Each turns fetched data into the pieces of
//! a solver request without touching any port.

use chrono::NaiveDateTime;
use chrono_tz::Tz;
use scheduleprep_domain::{
    Calendar, CalendarEvent, ExternalAttendeePreference, PlannerEventPart, PlannerUser, TimeSlot,
    UserPreference,
};
use tracing::{debug, warn};

use super::format::{
    format_event_part, pin_unmodifiable_part, planner_user_for_external, planner_user_for_internal,
    validate_event_dates,
};
use crate::breaks::breaks_for_window;
use crate::event_parts::{merge_buffer_parts, partition_event_lite};
use crate::time_math::{civil_to_instant, day_anchors, Grid};
use crate::time_slots::{
    slots_for_external_attendee, slots_for_internal_attendee, slots_from_external_preferences,
};
use crate::work_time::{work_times_for_external_attendee, work_times_for_internal_attendee};

/// Host and window shared by every pipeline of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanningContext {
    pub host_id: String,
    pub host_tz: Tz,
    /// Host-local civil time; also the "now" of the first day.
    pub window_start: NaiveDateTime,
    pub window_end: NaiveDateTime,
}

/// Everything fetched for an attendee that has stored preferences.
#[derive(Debug, Clone, PartialEq)]
pub struct InternalAttendeeData {
    pub user_id: String,
    pub timezone: Tz,
    pub preferences: UserPreference,
    /// Global primary calendar; breaks are skipped without one.
    pub calendar: Option<Calendar>,
    pub events: Vec<CalendarEvent>,
}

/// Everything fetched for an attendee without preferences.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalAttendeeData {
    pub user_id: String,
    pub timezone: Tz,
    /// Imported history plus any new meeting events for this attendee.
    pub events: Vec<CalendarEvent>,
    pub explicit_preferences: Vec<ExternalAttendeePreference>,
}

/// Pieces contributed by one pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOutput {
    pub event_parts: Vec<PlannerEventPart>,
    pub all_events: Vec<CalendarEvent>,
    pub breaks: Vec<CalendarEvent>,
    pub timeslots: Vec<TimeSlot>,
    pub user_list: Vec<PlannerUser>,
}

impl PipelineOutput {
    /// Append another output's pieces.
    pub fn extend(&mut self, other: Self) {
        self.event_parts.extend(other.event_parts);
        self.all_events.extend(other.all_events);
        self.breaks.extend(other.breaks);
        self.timeslots.extend(other.timeslots);
        self.user_list.extend(other.user_list);
    }
}

/// The host runs the internal pipeline on its own data.
pub fn host_pipeline(ctx: &PlanningContext, host: &InternalAttendeeData) -> PipelineOutput {
    internal_pipeline(ctx, std::slice::from_ref(host))
}

/// Work times, slots, breaks and pinned parts for attendees with
/// preferences.
pub fn internal_pipeline(ctx: &PlanningContext, attendees: &[InternalAttendeeData]) -> PipelineOutput {
    let mut output = PipelineOutput::default();
    for attendee in attendees {
        output.extend(internal_attendee(ctx, attendee));
    }
    output
}

fn internal_attendee(ctx: &PlanningContext, attendee: &InternalAttendeeData) -> PipelineOutput {
    let prefs = &attendee.preferences;
    let work_times = work_times_for_internal_attendee(
        &ctx.host_id,
        &attendee.user_id,
        prefs,
        ctx.host_tz,
        attendee.timezone,
        ctx.window_start.date(),
    );
    let user = planner_user_for_internal(prefs, &ctx.host_id, work_times);

    let timeslots: Vec<TimeSlot> = day_anchors(ctx.window_start, ctx.window_end)
        .into_iter()
        .enumerate()
        .flat_map(|(index, anchor)| {
            slots_for_internal_attendee(
                anchor,
                &ctx.host_id,
                prefs,
                ctx.host_tz,
                attendee.timezone,
                index == 0,
                Grid::HalfHour,
            )
        })
        .collect();

    let breaks = match &attendee.calendar {
        Some(calendar) => breaks_for_window(
            prefs,
            calendar,
            &attendee.events,
            attendee.timezone,
            civil_to_instant(ctx.window_start, ctx.host_tz),
            civil_to_instant(ctx.window_end, ctx.host_tz),
        ),
        None => {
            warn!(user_id = %attendee.user_id, "no global primary calendar; skipping breaks");
            Vec::new()
        }
    };

    let schedulable = attendee
        .events
        .iter()
        .chain(&breaks)
        .filter(|event| validate_event_dates(event, Some((prefs, attendee.timezone))));
    let event_parts: Vec<PlannerEventPart> = parts_for(schedulable, ctx, &user)
        .into_iter()
        .map(pin_unmodifiable_part)
        .collect();

    debug!(
        user_id = %attendee.user_id,
        parts = event_parts.len(),
        slots = timeslots.len(),
        breaks = breaks.len(),
        "internal attendee prepared"
    );

    PipelineOutput {
        event_parts,
        all_events: attendee.events.clone(),
        breaks,
        timeslots,
        user_list: vec![user],
    }
}

/// Slots from explicit availability when given, otherwise from history.
pub fn external_pipeline(ctx: &PlanningContext, attendees: &[ExternalAttendeeData]) -> PipelineOutput {
    let mut output = PipelineOutput::default();
    for attendee in attendees {
        output.extend(external_attendee(ctx, attendee));
    }
    output
}

fn external_attendee(ctx: &PlanningContext, attendee: &ExternalAttendeeData) -> PipelineOutput {
    let work_times =
        work_times_for_external_attendee(&ctx.host_id, &attendee.user_id, &attendee.events, ctx.host_tz);
    let user = planner_user_for_external(&attendee.user_id, &ctx.host_id, work_times);

    let timeslots = if attendee.explicit_preferences.is_empty() {
        day_anchors(ctx.window_start, ctx.window_end)
            .into_iter()
            .enumerate()
            .flat_map(|(index, anchor)| {
                slots_for_external_attendee(
                    anchor,
                    &ctx.host_id,
                    &attendee.events,
                    ctx.host_tz,
                    index == 0,
                    Grid::HalfHour,
                )
            })
            .collect()
    } else {
        slots_from_external_preferences(
            &attendee.explicit_preferences,
            civil_to_instant(ctx.window_start, ctx.host_tz),
            civil_to_instant(ctx.window_end, ctx.host_tz),
            &ctx.host_id,
            ctx.host_tz,
        )
    };

    let schedulable = attendee.events.iter().filter(|event| validate_event_dates(event, None));
    let event_parts = parts_for(schedulable, ctx, &user);

    debug!(
        user_id = %attendee.user_id,
        parts = event_parts.len(),
        slots = timeslots.len(),
        explicit = !attendee.explicit_preferences.is_empty(),
        "external attendee prepared"
    );

    PipelineOutput {
        event_parts,
        all_events: attendee.events.clone(),
        breaks: Vec::new(),
        timeslots,
        user_list: vec![user],
    }
}

fn parts_for<'a>(
    events: impl Iterator<Item = &'a CalendarEvent>,
    ctx: &PlanningContext,
    user: &PlannerUser,
) -> Vec<PlannerEventPart> {
    let initial = events.flat_map(|event| partition_event_lite(event, &ctx.host_id)).collect();
    merge_buffer_parts(initial)
        .iter()
        .filter_map(|part| format_event_part(part, user, ctx.host_tz))
        .collect()
}

#[cfg(test)]
mod tests {
    use scheduleprep_domain::DayClock;

    use super::*;
    use crate::time_math::parse_timezone;

    fn civil(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn ny() -> Tz {
        parse_timezone("America/New_York").unwrap()
    }

    fn ctx() -> PlanningContext {
        PlanningContext {
            host_id: "host".into(),
            host_tz: ny(),
            window_start: civil("2024-06-03T00:00:00"),
            window_end: civil("2024-06-07T23:59:00"),
        }
    }

    fn prefs(user_id: &str) -> UserPreference {
        let clocks = |hour| (1..=7).map(|day| DayClock { day, hour, minutes: 0 }).collect();
        UserPreference {
            user_id: user_id.into(),
            start_times: clocks(9),
            end_times: clocks(17),
            max_work_load_percent: 85,
            min_number_of_breaks: 1,
            break_length: 15,
            ..UserPreference::default()
        }
    }

    fn event(id: &str, user: &str, start: &str, end: &str, modifiable: bool) -> CalendarEvent {
        CalendarEvent {
            id: id.into(),
            user_id: user.into(),
            start_date: civil(start),
            end_date: civil(end),
            timezone: Some("America/New_York".into()),
            modifiable,
            ..CalendarEvent::default()
        }
    }

    fn internal(calendar: Option<Calendar>) -> InternalAttendeeData {
        InternalAttendeeData {
            user_id: "u1".into(),
            timezone: ny(),
            preferences: prefs("u1"),
            calendar,
            events: vec![
                event("fixed", "u1", "2024-06-03T10:00:00", "2024-06-03T11:00:00", false),
                event("flex", "u1", "2024-06-04T13:00:00", "2024-06-04T13:30:00", true),
                event("early", "u1", "2024-06-04T06:00:00", "2024-06-04T07:00:00", false),
            ],
        }
    }

    #[test]
    fn internal_pipeline_pins_fixed_parts_and_skips_invalid_events() {
        let output = internal_pipeline(&ctx(), &[internal(None)]);

        assert!(output.event_parts.iter().all(|p| p.event_id != "early"));
        let fixed: Vec<&PlannerEventPart> =
            output.event_parts.iter().filter(|p| p.event_id == "fixed").collect();
        assert_eq!(fixed.len(), 2);
        assert!(fixed.iter().all(|p| p.preferred_time == chrono::NaiveTime::from_hms_opt(10, 0, 0)));
        let flex = output.event_parts.iter().find(|p| p.event_id == "flex").unwrap();
        assert!(flex.preferred_time.is_none());

        assert_eq!(output.user_list.len(), 1);
        assert_eq!(output.user_list[0].work_times.len(), 7);
        assert!(output.breaks.is_empty());
        // Five weekdays of 16 half-hour slots.
        assert_eq!(output.timeslots.len(), 80);
    }

    #[test]
    fn internal_pipeline_adds_breaks_as_gap_parts() {
        let calendar = Calendar { id: "primary".into(), global_primary: true, ..Calendar::default() };
        let output = internal_pipeline(&ctx(), &[internal(Some(calendar))]);

        assert!(!output.breaks.is_empty());
        let gaps: Vec<&PlannerEventPart> = output.event_parts.iter().filter(|p| p.gap).collect();
        assert!(!gaps.is_empty());
        assert!(gaps.iter().all(|p| p.modifiable));
    }

    #[test]
    fn external_pipeline_prefers_explicit_availability() {
        let history = vec![event("h1", "ext", "2024-05-27T09:00:00", "2024-05-27T12:00:00", false)];
        let explicit = vec![ExternalAttendeePreference {
            preferred_start_datetime: civil("2024-06-04T14:00:00").and_utc(),
            preferred_end_datetime: civil("2024-06-04T15:00:00").and_utc(),
        }];

        let with_explicit = external_pipeline(
            &ctx(),
            &[ExternalAttendeeData {
                user_id: "ext".into(),
                timezone: ny(),
                events: history.clone(),
                explicit_preferences: explicit,
            }],
        );
        assert_eq!(with_explicit.timeslots.len(), 2);
        assert_eq!(with_explicit.user_list[0].max_number_of_meetings, 99);

        let from_history = external_pipeline(
            &ctx(),
            &[ExternalAttendeeData {
                user_id: "ext".into(),
                timezone: ny(),
                events: history,
                explicit_preferences: Vec::new(),
            }],
        );
        // Only Mondays have history: 09:00-12:15 yields six whole half hours.
        assert_eq!(from_history.timeslots.len(), 6);
        assert_eq!(from_history.event_parts.len(), 6);
    }
}
