//! Stored user preferences and the usage counter.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::week::DayOfWeek;
use crate::constants::{
    DEFAULT_BREAK_LENGTH_MINUTES, DEFAULT_MAX_NUMBER_OF_MEETINGS, DEFAULT_MAX_WORK_LOAD_PERCENT,
    DEFAULT_MIN_NUMBER_OF_BREAKS, DEFAULT_WORK_END_HOUR, DEFAULT_WORK_START_HOUR,
    MIN_BREAK_LENGTH_MINUTES,
};

/// Clock entry for one ISO weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DayClock {
    /// ISO weekday, 1 = Monday.
    pub day: u32,
    pub hour: u32,
    pub minutes: u32,
}

impl DayClock {
    pub fn time(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour, self.minutes, 0)
    }
}

/// Working-hour and workload preferences for one user.
///
/// Expected to carry exactly one start and one end entry per ISO weekday.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreference {
    pub id: Option<String>,
    pub user_id: String,
    pub start_times: Vec<DayClock>,
    pub end_times: Vec<DayClock>,
    pub max_work_load_percent: u32,
    pub min_number_of_breaks: u32,
    pub break_length: u32,
    pub break_color: Option<String>,
    pub back_to_back_meetings: bool,
    pub max_number_of_meetings: u32,
}

impl UserPreference {
    /// Fallback record for an internal attendee with nothing stored.
    pub fn defaults_for(user_id: impl Into<String>) -> Self {
        let clocks = |hour: u32| {
            DayOfWeek::ALL
                .iter()
                .map(|day| DayClock { day: day.iso_number(), hour, minutes: 0 })
                .collect::<Vec<_>>()
        };

        Self {
            id: None,
            user_id: user_id.into(),
            start_times: clocks(DEFAULT_WORK_START_HOUR),
            end_times: clocks(DEFAULT_WORK_END_HOUR),
            max_work_load_percent: DEFAULT_MAX_WORK_LOAD_PERCENT,
            min_number_of_breaks: DEFAULT_MIN_NUMBER_OF_BREAKS,
            break_length: DEFAULT_BREAK_LENGTH_MINUTES,
            break_color: None,
            back_to_back_meetings: false,
            max_number_of_meetings: DEFAULT_MAX_NUMBER_OF_MEETINGS,
        }
    }

    /// Local working window for `day`, or `None` when either entry is missing
    /// or the window is empty.
    pub fn working_window(&self, day: DayOfWeek) -> Option<(NaiveTime, NaiveTime)> {
        let pick = |entries: &[DayClock]| {
            entries.iter().find(|clock| clock.day == day.iso_number()).and_then(DayClock::time)
        };
        let start = pick(&self.start_times)?;
        let end = pick(&self.end_times)?;
        (start < end).then_some((start, end))
    }

    /// Break length in minutes, never below the 15 minute floor.
    pub fn effective_break_length(&self) -> u32 {
        self.break_length.max(MIN_BREAK_LENGTH_MINUTES)
    }
}

/// Per-user usage counter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Freemium {
    pub id: String,
    pub user_id: String,
    pub usage: i64,
    pub period: Option<String>,
}
