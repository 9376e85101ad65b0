//! Slicing events into solver parts and regrouping buffer parts with their
//! anchor event.

use std::collections::HashSet;

use scheduleprep_domain::{CalendarEvent, InitialEventPart};

use crate::time_math::{minutes_between, parse_timezone, Grid};

/// Split `event` into parts of `grid` minutes plus one remainder part.
///
/// Parts are numbered `1..=last_part`; every part carries the whole event
/// and its own length in `part_minutes`. Events without positive duration
/// produce nothing.
pub fn partition_event(event: &CalendarEvent, host_id: &str, grid: Grid) -> Vec<InitialEventPart> {
    let minutes = event_minutes(event);
    if minutes <= 0 {
        return Vec::new();
    }

    let granule = i64::from(grid.minutes());
    let full_parts = minutes / granule;
    let remainder = minutes % granule;
    let last_part = full_parts + i64::from(remainder > 0);

    let lengths = std::iter::repeat(granule)
        .take(usize::try_from(full_parts).unwrap_or_default())
        .chain((remainder > 0).then_some(remainder));

    lengths
        .enumerate()
        .map(|(index, length)| {
            let part = to_u32(index as i64 + 1);
            InitialEventPart {
                group_id: event.id.clone(),
                part,
                last_part: to_u32(last_part),
                meeting_part: part,
                meeting_last_part: to_u32(last_part),
                part_minutes: to_u32(length),
                host_id: host_id.to_string(),
                event: event.clone(),
            }
        })
        .collect()
}

/// Thirty-minute parts, the granularity the solver consumes.
pub fn partition_event_lite(event: &CalendarEvent, host_id: &str) -> Vec<InitialEventPart> {
    partition_event(event, host_id, Grid::HalfHour)
}

/// Fifteen-minute parts for callers that still need the finer grain.
pub fn partition_event_quarter_hour(event: &CalendarEvent, host_id: &str) -> Vec<InitialEventPart> {
    partition_event(event, host_id, Grid::QuarterHour)
}

/// Elapsed minutes of an event measured in its own timezone.
pub fn event_minutes(event: &CalendarEvent) -> i64 {
    match event.timezone.as_deref().and_then(parse_timezone) {
        Some(tz) => minutes_between(event.start_date, event.end_date, tz),
        None => (event.end_date - event.start_date).num_minutes(),
    }
}

/// Regroup `[pre-buffer, anchor]` parts for `anchor_id`.
///
/// Returns `None` when the anchor has no parts.
pub fn merge_pre_buffer_parts(
    parts: &[InitialEventPart],
    anchor_id: &str,
) -> Option<Vec<InitialEventPart>> {
    merge_group(parts, anchor_id, false)
}

/// Regroup `[pre-buffer, anchor, post-buffer]` parts for `anchor_id`.
pub fn merge_post_buffer_parts(
    parts: &[InitialEventPart],
    anchor_id: &str,
) -> Option<Vec<InitialEventPart>> {
    merge_group(parts, anchor_id, true)
}

/// Apply [`merge_pre_buffer_parts`] to every anchor referenced by a
/// pre-buffer part, replacing the scattered parts with the merged ones.
pub fn merge_pre_buffer_parts_batch(parts: Vec<InitialEventPart>) -> Vec<InitialEventPart> {
    let anchors = anchors_of(&parts, |event| event.is_pre_event);
    merge_batch(parts, &anchors, false)
}

/// Batch form of [`merge_post_buffer_parts`].
pub fn merge_post_buffer_parts_batch(parts: Vec<InitialEventPart>) -> Vec<InitialEventPart> {
    let anchors = anchors_of(&parts, |event| event.is_post_event);
    merge_batch(parts, &anchors, true)
}

/// Both batch merges, pre first.
pub fn merge_buffer_parts(parts: Vec<InitialEventPart>) -> Vec<InitialEventPart> {
    merge_post_buffer_parts_batch(merge_pre_buffer_parts_batch(parts))
}

fn merge_group(
    parts: &[InitialEventPart],
    anchor_id: &str,
    include_post: bool,
) -> Option<Vec<InitialEventPart>> {
    let select = |predicate: &dyn Fn(&CalendarEvent) -> bool| {
        let mut group: Vec<InitialEventPart> =
            parts.iter().filter(|part| predicate(&part.event)).cloned().collect();
        group.sort_by_key(|part| part.part);
        group
    };
    let is_buffer_for = |event: &CalendarEvent| event.for_event_id.as_deref() == Some(anchor_id);

    let actual = select(&|event| event.id == anchor_id);
    if actual.is_empty() {
        return None;
    }
    let before = select(&|event| event.is_pre_event && is_buffer_for(event));
    let after = if include_post {
        select(&|event| event.is_post_event && is_buffer_for(event))
    } else {
        Vec::new()
    };

    let mut merged: Vec<InitialEventPart> = before.into_iter().chain(actual).chain(after).collect();
    let last_part = to_u32(merged.len() as i64);
    for (index, part) in merged.iter_mut().enumerate() {
        part.group_id = anchor_id.to_string();
        part.part = to_u32(index as i64 + 1);
        part.last_part = last_part;
    }
    Some(merged)
}

fn anchors_of(parts: &[InitialEventPart], flag: impl Fn(&CalendarEvent) -> bool) -> Vec<String> {
    let mut seen = HashSet::new();
    parts
        .iter()
        .filter(|part| flag(&part.event))
        .filter_map(|part| part.event.for_event_id.clone())
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

fn merge_batch(
    parts: Vec<InitialEventPart>,
    anchors: &[String],
    include_post: bool,
) -> Vec<InitialEventPart> {
    let merged: Vec<InitialEventPart> = anchors
        .iter()
        .filter_map(|anchor| merge_group(&parts, anchor, include_post))
        .flatten()
        .collect();
    if merged.is_empty() {
        return parts;
    }

    let merged_ids: HashSet<&str> = merged.iter().map(InitialEventPart::event_id).collect();
    let mut result: Vec<InitialEventPart> =
        parts.iter().filter(|part| !merged_ids.contains(part.event_id())).cloned().collect();
    result.extend(merged);
    result
}

fn to_u32(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;

    fn civil(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn event(id: &str, start: &str, end: &str) -> CalendarEvent {
        CalendarEvent {
            id: id.into(),
            user_id: "u1".into(),
            start_date: civil(start),
            end_date: civil(end),
            timezone: Some("America/New_York".into()),
            ..CalendarEvent::default()
        }
    }

    fn buffer(id: &str, anchor: &str, start: &str, end: &str, pre: bool) -> CalendarEvent {
        CalendarEvent {
            is_pre_event: pre,
            is_post_event: !pre,
            for_event_id: Some(anchor.into()),
            ..event(id, start, end)
        }
    }

    fn assert_contiguous(parts: &[InitialEventPart]) {
        let last = parts.len() as u32;
        for (index, part) in parts.iter().enumerate() {
            assert_eq!(part.part, index as u32 + 1);
            assert_eq!(part.last_part, last);
        }
    }

    #[test]
    fn lite_parts_cover_duration_with_remainder() {
        let parts = partition_event_lite(&event("e1", "2024-06-03T09:00:00", "2024-06-03T10:10:00"), "h");
        assert_eq!(parts.len(), 3);
        assert_contiguous(&parts);
        assert_eq!(parts.iter().map(|p| p.part_minutes).sum::<u32>(), 70);
        assert_eq!(parts[2].part_minutes, 10);
        assert!(parts.iter().all(|p| p.group_id == "e1" && p.meeting_last_part == 3));
    }

    #[test]
    fn exact_multiple_has_no_remainder_part() {
        let parts = partition_event_quarter_hour(
            &event("e1", "2024-06-03T09:00:00", "2024-06-03T10:00:00"),
            "h",
        );
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[3].last_part, 4);
    }

    #[test]
    fn part_sum_matches_duration_for_many_lengths() {
        let start = civil("2024-06-03T08:00:00");
        for minutes in 1..=240 {
            let mut e = event("e", "2024-06-03T08:00:00", "2024-06-03T08:00:00");
            e.end_date = start + chrono::Duration::minutes(minutes);
            for grid in [Grid::HalfHour, Grid::QuarterHour] {
                let parts = partition_event(&e, "h", grid);
                assert_eq!(parts.iter().map(|p| i64::from(p.part_minutes)).sum::<i64>(), minutes);
                assert_contiguous(&parts);
            }
        }
    }

    #[test]
    fn zero_length_event_has_no_parts() {
        assert!(partition_event_lite(&event("e", "2024-06-03T09:00:00", "2024-06-03T09:00:00"), "h")
            .is_empty());
    }

    #[test]
    fn duration_is_measured_in_event_zone_across_dst() {
        // 01:00-04:00 on the spring-forward night is two real hours.
        let e = event("e", "2024-03-10T01:00:00", "2024-03-10T04:00:00");
        assert_eq!(event_minutes(&e), 120);
    }

    fn sample_parts() -> Vec<InitialEventPart> {
        let mut parts = Vec::new();
        parts.extend(partition_event_lite(
            &buffer("pre", "a", "2024-06-03T08:30:00", "2024-06-03T09:00:00", true),
            "h",
        ));
        parts.extend(partition_event_lite(&event("a", "2024-06-03T09:00:00", "2024-06-03T10:00:00"), "h"));
        parts.extend(partition_event_lite(
            &buffer("post", "a", "2024-06-03T10:00:00", "2024-06-03T10:15:00", false),
            "h",
        ));
        parts.extend(partition_event_lite(&event("b", "2024-06-03T13:00:00", "2024-06-03T13:30:00"), "h"));
        parts
    }

    #[test]
    fn pre_merge_renumbers_buffer_then_anchor() {
        let merged = merge_pre_buffer_parts(&sample_parts(), "a").unwrap();
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].event_id(), "pre");
        assert_eq!(merged[2].event_id(), "a");
        assert!(merged.iter().all(|p| p.group_id == "a"));
        assert_contiguous(&merged);
        // Meeting numbering is left as sliced.
        assert_eq!(merged[1].meeting_part, 1);
    }

    #[test]
    fn post_merge_places_buffers_around_anchor() {
        let merged = merge_post_buffer_parts(&sample_parts(), "a").unwrap();
        let ids: Vec<&str> = merged.iter().map(InitialEventPart::event_id).collect();
        assert_eq!(ids, ["pre", "a", "a", "post"]);
        assert_contiguous(&merged);
    }

    #[test]
    fn missing_anchor_merges_nothing() {
        assert!(merge_pre_buffer_parts(&sample_parts(), "zzz").is_none());
    }

    #[test]
    fn batch_merge_replaces_scattered_parts() {
        let merged = merge_buffer_parts(sample_parts());
        assert_eq!(merged.len(), 5);
        assert_eq!(merged[0].event_id(), "b");

        let group: Vec<&InitialEventPart> = merged.iter().filter(|p| p.group_id == "a").collect();
        assert_eq!(group.len(), 4);
        assert_eq!(group.last().unwrap().event_id(), "post");
        assert!(group.iter().all(|p| p.last_part == 4));
    }

    #[test]
    fn batch_merge_without_buffers_is_identity() {
        let parts = partition_event_lite(&event("a", "2024-06-03T09:00:00", "2024-06-03T10:00:00"), "h");
        assert_eq!(merge_buffer_parts(parts.clone()), parts);
    }
}
