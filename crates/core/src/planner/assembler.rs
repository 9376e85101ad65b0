//! Merging pipeline outputs into one consistent solver request.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use scheduleprep_domain::{
    CalendarEvent, DayOfWeek, PlannerEventPart, PlannerRequestBody, PlannerUser, Result,
    ScheduleError, TimeSlot,
};
use tracing::{debug, warn};

use super::pipelines::PipelineOutput;
use crate::time_math::day_of_week;

/// Remove structurally equal duplicates, keeping first occurrences in
/// order. Applying it twice is the same as applying it once.
pub fn dedup_structural<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut unique: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}

/// Like [`dedup_structural`], but only items sharing a key are compared.
pub fn dedup_by_key<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    T: PartialEq,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut buckets: HashMap<K, Vec<usize>> = HashMap::with_capacity(items.len());
    let mut unique: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        let bucket = buckets.entry(key(&item)).or_default();
        if bucket.iter().any(|&index| unique[index] == item) {
            continue;
        }
        bucket.push(unique.len());
        unique.push(item);
    }
    unique
}

fn dedup_parts(parts: Vec<PlannerEventPart>) -> Vec<PlannerEventPart> {
    dedup_by_key(parts, |part| (part.event_id.clone(), part.user_id.clone(), part.part))
}

fn dedup_events(events: Vec<CalendarEvent>) -> Vec<CalendarEvent> {
    dedup_by_key(events, |event| (event.id.clone(), event.user_id.clone()))
}

/// A part is schedulable when its host-local weekday has a candidate slot
/// and the owner works that day.
fn fits_week(part: &PlannerEventPart, slot_days: &HashSet<DayOfWeek>) -> bool {
    let day = day_of_week(part.start_date);
    slot_days.contains(&day) && part.user.work_times.iter().any(|work| work.day_of_week == day)
}

/// Request envelope values that do not come from the pipelines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestEnvelope {
    pub singleton_id: String,
    pub host_id: String,
    pub file_key: String,
    pub delay: u64,
    pub call_back_url: String,
}

/// The request plus the context archived next to it.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledPlan {
    pub request: PlannerRequestBody,
    pub all_events: Vec<CalendarEvent>,
    pub breaks: Vec<CalendarEvent>,
}

/// Concatenate and deduplicate every output.
///
/// Parts whose owner is missing from the user list, or whose weekday has
/// no slot or no work time for that owner, are dropped so that the request
/// stays consistent. Fails with `EmptyPlan` when nothing is left to
/// schedule.
pub fn assemble(outputs: Vec<PipelineOutput>, envelope: RequestEnvelope) -> Result<AssembledPlan> {
    let mut merged = PipelineOutput::default();
    for output in outputs {
        merged.extend(output);
    }

    let user_list: Vec<PlannerUser> = dedup_structural(merged.user_list);
    let timeslots: Vec<TimeSlot> = dedup_by_key(merged.timeslots, TimeSlot::clone);
    let known_users: HashSet<&str> = user_list.iter().map(|user| user.id.as_str()).collect();
    let slot_days: HashSet<DayOfWeek> = timeslots.iter().map(|slot| slot.day_of_week).collect();

    let before = merged.event_parts.len();
    let owned: Vec<PlannerEventPart> = dedup_parts(merged.event_parts)
        .into_iter()
        .filter(|part| known_users.contains(part.user_id.as_str()))
        .collect();
    if owned.len() < before {
        debug!(dropped = before - owned.len(), "dropped duplicate or ownerless parts");
    }

    let (event_parts, off_week): (Vec<PlannerEventPart>, Vec<PlannerEventPart>) =
        owned.into_iter().partition(|part| fits_week(part, &slot_days));
    for part in &off_week {
        warn!(
            event_id = %part.event_id,
            user_id = %part.user_id,
            day = ?day_of_week(part.start_date),
            "dropping part on a day without slots or work time"
        );
    }

    if event_parts.is_empty() || timeslots.is_empty() || user_list.is_empty() {
        warn!(
            host_id = %envelope.host_id,
            parts = event_parts.len(),
            slots = timeslots.len(),
            users = user_list.len(),
            "nothing to schedule"
        );
        return Err(ScheduleError::EmptyPlan(format!(
            "no schedulable input for host {}",
            envelope.host_id
        )));
    }

    let request = PlannerRequestBody {
        singleton_id: envelope.singleton_id,
        host_id: envelope.host_id,
        timeslots,
        user_list,
        event_parts,
        file_key: envelope.file_key,
        delay: envelope.delay,
        call_back_url: envelope.call_back_url,
    };

    Ok(AssembledPlan {
        request,
        all_events: dedup_events(merged.all_events),
        breaks: dedup_events(merged.breaks),
    })
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};
    use scheduleprep_domain::WorkTime;

    use super::*;

    fn envelope() -> RequestEnvelope {
        RequestEnvelope {
            singleton_id: "s-1".into(),
            host_id: "host".into(),
            file_key: "host/s-1.json".into(),
            delay: 1000,
            call_back_url: "https://cb.example/plan".into(),
        }
    }

    fn user(id: &str) -> PlannerUser {
        PlannerUser {
            id: id.into(),
            host_id: "host".into(),
            max_work_load_percent: 100,
            back_to_back_meetings: false,
            max_number_of_meetings: 99,
            min_number_of_breaks: 0,
            work_times: vec![WorkTime {
                day_of_week: DayOfWeek::Monday,
                start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
                host_id: "host".into(),
                user_id: id.into(),
            }],
        }
    }

    fn slot(hour: u32) -> TimeSlot {
        TimeSlot {
            day_of_week: DayOfWeek::Monday,
            start_time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(hour, 30, 0).unwrap(),
            host_id: "host".into(),
            month_day: "--06-03".into(),
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        }
    }

    fn part(event_id: &str, user_id: &str) -> PlannerEventPart {
        let start = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap().and_hms_opt(9, 0, 0).unwrap();
        PlannerEventPart {
            group_id: event_id.into(),
            event_id: event_id.into(),
            part: 1,
            last_part: 1,
            meeting_part: 1,
            meeting_last_part: 1,
            meeting_id: None,
            host_id: "host".into(),
            user_id: user_id.into(),
            start_date: start,
            end_date: start,
            task_id: None,
            soft_deadline: None,
            hard_deadline: None,
            priority: 1,
            is_pre_event: false,
            is_post_event: false,
            for_event_id: None,
            positive_impact_score: None,
            negative_impact_score: None,
            positive_impact_day_of_week: None,
            positive_impact_time: None,
            negative_impact_day_of_week: None,
            negative_impact_time: None,
            modifiable: true,
            preferred_day_of_week: None,
            preferred_time: None,
            is_meeting: false,
            is_external_meeting: false,
            is_external_meeting_modifiable: false,
            is_meeting_modifiable: false,
            daily_task_list: false,
            weekly_task_list: false,
            gap: false,
            preferred_start_time_range: None,
            preferred_end_time_range: None,
            total_working_hours: 8.0,
            recurring_event_id: None,
            user: user(user_id),
            event: scheduleprep_domain::PlannerEventSummary {
                id: event_id.into(),
                user_id: user_id.into(),
                host_id: "host".into(),
                preferred_time_ranges: Vec::new(),
                event_type: None,
            },
            part_minutes: 30,
        }
    }

    #[test]
    fn dedup_is_idempotent_and_order_preserving() {
        let once = dedup_structural(vec![3, 1, 3, 2, 1]);
        assert_eq!(once, [3, 1, 2]);
        assert_eq!(dedup_structural(once.clone()), once);
    }

    #[test]
    fn assemble_merges_and_filters_ownerless_parts() {
        let host = PipelineOutput {
            event_parts: vec![part("a", "host-user"), part("a", "host-user")],
            timeslots: vec![slot(9), slot(10)],
            user_list: vec![user("host-user")],
            ..PipelineOutput::default()
        };
        let attendee = PipelineOutput {
            event_parts: vec![part("b", "att"), part("orphan", "nobody")],
            timeslots: vec![slot(9)],
            user_list: vec![user("att")],
            ..PipelineOutput::default()
        };

        let plan = assemble(vec![host, attendee], envelope()).unwrap();
        let ids: Vec<&str> = plan.request.event_parts.iter().map(|p| p.event_id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(plan.request.timeslots.len(), 2);
        assert_eq!(plan.request.user_list.len(), 2);
        assert_eq!(plan.request.file_key, "host/s-1.json");
    }

    fn on(day: u32, base: PlannerEventPart) -> PlannerEventPart {
        let start = NaiveDate::from_ymd_opt(2024, 6, day).unwrap().and_hms_opt(9, 0, 0).unwrap();
        PlannerEventPart { start_date: start, end_date: start, ..base }
    }

    #[test]
    fn keyed_dedup_still_compares_whole_items() {
        let items = vec![("a", 1), ("a", 2), ("b", 1), ("a", 1)];
        let unique = dedup_by_key(items, |item| item.0);
        assert_eq!(unique, [("a", 1), ("a", 2), ("b", 1)]);
        assert_eq!(dedup_by_key(unique.clone(), |item| item.0), unique);
    }

    #[test]
    fn same_part_key_with_different_content_is_kept() {
        let reprioritised = PlannerEventPart { priority: 5, ..part("a", "host-user") };
        let output = PipelineOutput {
            event_parts: vec![part("a", "host-user"), reprioritised, part("a", "host-user")],
            timeslots: vec![slot(9)],
            user_list: vec![user("host-user")],
            ..PipelineOutput::default()
        };

        let plan = assemble(vec![output], envelope()).unwrap();
        let priorities: Vec<i32> = plan.request.event_parts.iter().map(|p| p.priority).collect();
        assert_eq!(priorities, [1, 5]);
    }

    #[test]
    fn parts_on_days_without_slots_are_dropped() {
        // 2024-06-04 is a Tuesday: no slot and no work time.
        let output = PipelineOutput {
            event_parts: vec![part("mon", "host-user"), on(4, part("tue", "host-user"))],
            timeslots: vec![slot(9)],
            user_list: vec![user("host-user")],
            ..PipelineOutput::default()
        };

        let plan = assemble(vec![output], envelope()).unwrap();
        let ids: Vec<&str> = plan.request.event_parts.iter().map(|p| p.event_id.as_str()).collect();
        assert_eq!(ids, ["mon"]);
    }

    #[test]
    fn parts_outside_the_owners_work_days_are_dropped() {
        let tuesday_slot = TimeSlot {
            day_of_week: DayOfWeek::Tuesday,
            date: NaiveDate::from_ymd_opt(2024, 6, 4).unwrap(),
            month_day: "--06-04".into(),
            ..slot(9)
        };
        let output = PipelineOutput {
            event_parts: vec![on(4, part("tue", "host-user"))],
            timeslots: vec![slot(9), tuesday_slot],
            user_list: vec![user("host-user")],
            ..PipelineOutput::default()
        };

        let err = assemble(vec![output], envelope()).unwrap_err();
        assert!(matches!(err, ScheduleError::EmptyPlan(_)));
    }

    #[test]
    fn empty_input_is_a_benign_error() {
        let err = assemble(vec![PipelineOutput::default()], envelope()).unwrap_err();
        assert!(matches!(err, ScheduleError::EmptyPlan(_)));
        assert!(!err.is_retryable());
    }
}
