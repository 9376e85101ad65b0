//! Pre/post buffer events around an anchor event.

use chrono::NaiveDateTime;
use scheduleprep_domain::constants::{BUFFER_PRIORITY, BUFFER_TIME_TITLE};
use scheduleprep_domain::{BufferTimeConfig, BufferTimeObject, BufferedEvent, CalendarEvent};
use uuid::Uuid;

use crate::time_math::{parse_timezone, shift_civil};

/// Synthesize buffer events for `event` and link them to it.
///
/// The before-buffer ends exactly at the anchor's start and the
/// after-buffer starts exactly at its end. Existing `pre_event_id` /
/// `post_event_id` values are reused so a rerun updates rather than
/// duplicates the buffers.
pub fn create_buffer_time_for_event(event: &CalendarEvent, config: BufferTimeConfig) -> BufferedEvent {
    if config.is_empty() {
        return BufferedEvent { anchor: event.clone(), buffers: BufferTimeObject::default() };
    }

    let before_event = (config.before_event > 0).then(|| {
        let start = shift(event, event.start_date, -i64::from(config.before_event));
        let id = event.pre_event_id.clone().unwrap_or_else(|| synthesized_id(&event.calendar_id));
        CalendarEvent {
            is_pre_event: true,
            ..buffer_event(event, id, start, event.start_date, config.before_event)
        }
    });

    let after_event = (config.after_event > 0).then(|| {
        let end = shift(event, event.end_date, i64::from(config.after_event));
        let id = event.post_event_id.clone().unwrap_or_else(|| synthesized_id(&event.calendar_id));
        CalendarEvent {
            is_post_event: true,
            ..buffer_event(event, id, event.end_date, end, config.after_event)
        }
    });

    let mut anchor = event.clone();
    if let Some(before) = &before_event {
        anchor.pre_event_id = Some(before.id.clone());
    }
    if let Some(after) = &after_event {
        anchor.post_event_id = Some(after.id.clone());
    }
    anchor.time_blocking = Some(config);

    BufferedEvent { anchor, buffers: BufferTimeObject { before_event, after_event } }
}

/// `{uuid}#{calendar_id}`, the id shape of every synthesized event.
pub fn synthesized_id(calendar_id: &str) -> String {
    format!("{}#{calendar_id}", Uuid::new_v4())
}

fn shift(event: &CalendarEvent, civil: NaiveDateTime, minutes: i64) -> NaiveDateTime {
    match event.timezone.as_deref().and_then(parse_timezone) {
        Some(tz) => shift_civil(civil, tz, minutes),
        None => civil + chrono::Duration::minutes(minutes),
    }
}

fn buffer_event(
    anchor: &CalendarEvent,
    id: String,
    start: NaiveDateTime,
    end: NaiveDateTime,
    minutes: u32,
) -> CalendarEvent {
    CalendarEvent {
        id,
        user_id: anchor.user_id.clone(),
        calendar_id: anchor.calendar_id.clone(),
        title: Some(BUFFER_TIME_TITLE.to_string()),
        summary: Some(BUFFER_TIME_TITLE.to_string()),
        notes: Some(BUFFER_TIME_TITLE.to_string()),
        start_date: start,
        end_date: end,
        timezone: anchor.timezone.clone(),
        duration: Some(i64::from(minutes)),
        priority: BUFFER_PRIORITY,
        modifiable: true,
        for_event_id: Some(anchor.id.clone()),
        meeting_id: anchor.meeting_id.clone(),
        background_color: anchor.background_color.clone(),
        ..CalendarEvent::default()
    }
}
