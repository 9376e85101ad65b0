//! GraphQL documents sent to the persistence service.
//!
//! Selections list exactly the columns the domain types read.

const EVENT_FIELDS: &str = "
    id userId calendarId eventId title summary notes startDate endDate timezone duration
    allDay deleted isBreak isPreEvent isPostEvent isMeeting isExternalMeeting
    isExternalMeetingModifiable isMeetingModifiable modifiable priority backgroundColor
    preEventId postEventId forEventId recurringEventId meetingId timeBlocking taskId
    softDeadline hardDeadline dailyTaskList weeklyTaskList positiveImpactScore
    negativeImpactScore positiveImpactDayOfWeek positiveImpactTime negativeImpactDayOfWeek
    negativeImpactTime preferredDayOfWeek preferredTime preferredStartTimeRange
    preferredEndTimeRange eventType
";

pub fn get_user_preferences() -> &'static str {
    "query getUserPreferences($userId: uuid!) {
        User_Preference(where: {userId: {_eq: $userId}}) {
            id userId startTimes endTimes maxWorkLoadPercent minNumberOfBreaks breakLength
            breakColor backToBackMeetings maxNumberOfMeetings
        }
    }"
}

pub fn get_global_calendar() -> &'static str {
    "query getGlobalCalendar($userId: uuid!) {
        Calendar(where: {globalPrimary: {_eq: true}, userId: {_eq: $userId}}) {
            id userId title globalPrimary backgroundColor
        }
    }"
}

pub fn list_events_for_user() -> String {
    format!(
        "query listEventsForUser($userId: uuid!, $startDate: timestamp!, $endDate: timestamp!) {{
            Event(where: {{userId: {{_eq: $userId}}, endDate: {{_gte: $startDate}}, startDate: {{_lte: $endDate}}, deleted: {{_neq: true}}, allDay: {{_neq: true}}}}) {{
                {EVENT_FIELDS}
            }}
        }}"
    )
}

pub fn list_events_with_ids() -> String {
    format!(
        "query listEventsWithIds($ids: [String!]!) {{
            Event(where: {{id: {{_in: $ids}}}}) {{
                {EVENT_FIELDS}
            }}
        }}"
    )
}

pub fn list_preferred_time_ranges_for_event() -> &'static str {
    "query ListPreferredTimeRangesGivenEventId($eventId: String!) {
        PreferredTimeRange(where: {eventId: {_eq: $eventId}}) {
            id eventId dayOfWeek startTime endTime userId hostId
        }
    }"
}

pub fn get_meeting_assist() -> &'static str {
    "query GetMeetingAssistById($id: uuid!) {
        Meeting_Assist_by_pk(id: $id) {
            id userId calendarId summary notes windowStartDate windowEndDate timezone duration
            priority bufferTime transparency visibility
        }
    }"
}

pub fn list_meeting_assist_attendees() -> &'static str {
    "query ListMeetingAssistAttendeesByMeetingId($meetingId: uuid!) {
        Meeting_Assist_Attendee(where: {meetingId: {_eq: $meetingId}}) {
            id name hostId userId emails primaryEmail timezone externalAttendee meetingId
        }
    }"
}

pub fn meeting_assist_attendee_count() -> &'static str {
    "query AttendeeCountGiveMeetingId($meetingId: uuid!) {
        Meeting_Assist_Attendee_aggregate(where: {meetingId: {_eq: $meetingId}}) {
            aggregate { count }
        }
    }"
}

pub fn list_meeting_assist_preferred_time_ranges() -> &'static str {
    "query ListMeetingAssistPrefereredTimeRangesByMeetingId($meetingId: uuid!) {
        Meeting_Assist_Preferred_Time_Range(where: {meetingId: {_eq: $meetingId}}) {
            id meetingId dayOfWeek startTime endTime hostId attendeeId
        }
    }"
}

pub fn list_meeting_assist_events_for_attendee() -> &'static str {
    "query ListMeetingAssistEventsForAttendeeGivenDates($attendeeId: String!, $startDate: timestamp!, $endDate: timestamp!) {
        Meeting_Assist_Event(where: {attendeeId: {_eq: $attendeeId}, endDate: {_gte: $startDate}, startDate: {_lte: $endDate}}) {
            id attendeeId calendarId eventId summary startDate endDate timezone allDay meetingId
            recurringEventId
        }
    }"
}

pub fn list_external_attendee_preferences() -> &'static str {
    "query ListExternalAttendeePreferences($meetingAssistId: uuid!, $meetingAssistAttendeeId: uuid!) {
        Meeting_Assist_External_Attendee_Preference(
            where: {
                meeting_assist_id: {_eq: $meetingAssistId},
                meeting_assist_attendee_id: {_eq: $meetingAssistAttendeeId}
            },
            order_by: {preferred_start_datetime: asc}
        ) {
            preferred_start_datetime
            preferred_end_datetime
        }
    }"
}

pub fn get_freemium_by_user_id() -> &'static str {
    "query GetFreemiumByUserId($userId: uuid!) {
        Freemium(where: {userId: {_eq: $userId}}) {
            id userId usage period
        }
    }"
}

pub fn update_freemium_usage() -> &'static str {
    "mutation UpdateFreemiumById($id: uuid!, $usage: Int!) {
        update_Freemium_by_pk(pk_columns: {id: $id}, _set: {usage: $usage}) {
            id userId usage period
        }
    }"
}
