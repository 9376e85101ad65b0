//! Domain types and models

pub mod calendar;
pub mod civil;
pub mod meeting;
pub mod planner;
pub mod preference;
pub mod replan;
pub mod week;

pub use calendar::{
    BufferTimeConfig, BufferTimeObject, BufferedEvent, Calendar, CalendarEvent, PreferredTimeRange,
};
pub use meeting::{
    AttendeeEmail, ExternalAttendeePreference, MeetingAssist, MeetingAssistAttendee,
    MeetingAssistEvent, MeetingAssistPreferredTimeRange,
};
pub use planner::{
    InitialEventPart, PlanArchive, PlannerEventPart, PlannerEventSummary, PlannerRequestBody,
    PlannerUser, ReplanArchiveContext, TimeSlot, WorkTime,
};
pub use preference::{DayClock, Freemium, UserPreference};
pub use replan::{AddedAttendee, NewConstraints, ReplanTarget};
pub use week::DayOfWeek;
