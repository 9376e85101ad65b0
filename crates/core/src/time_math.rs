//! Civil-time arithmetic across timezones and grid quantization.
//!
//! Civil timestamps (`NaiveDateTime`) are always paired with the zone they
//! are asserted to be in. Every conversion goes through an instant so that
//! host and attendee views of the same moment stay consistent.

use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
    Timelike, Utc,
};
use chrono_tz::Tz;
use scheduleprep_domain::constants::{FULL_GRANULE_MINUTES, LITE_GRANULE_MINUTES};
use scheduleprep_domain::DayOfWeek;

/// Parse an IANA zone name. Unknown names yield `None`.
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}

/// Resolve a civil timestamp asserted to be in `tz` to an instant.
///
/// Ambiguous times (DST fall-back) take the earlier offset. Times inside a
/// DST gap move forward by one hour.
pub fn civil_to_instant(civil: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    match tz.from_local_datetime(&civil) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => tz
            .from_local_datetime(&(civil + Duration::hours(1)))
            .earliest()
            .map_or_else(|| Utc.from_utc_datetime(&civil), |dt| dt.with_timezone(&Utc)),
    }
}

/// Render an instant as civil time in `tz`.
pub fn render(instant: DateTime<Utc>, tz: Tz) -> NaiveDateTime {
    instant.with_timezone(&tz).naive_local()
}

/// Re-express civil time from zone `from` in zone `to`.
pub fn convert_civil(civil: NaiveDateTime, from: Tz, to: Tz) -> NaiveDateTime {
    render(civil_to_instant(civil, from), to)
}

/// Move civil time by an absolute number of minutes, honouring DST in `tz`.
pub fn shift_civil(civil: NaiveDateTime, tz: Tz, minutes: i64) -> NaiveDateTime {
    render(civil_to_instant(civil, tz) + Duration::minutes(minutes), tz)
}

/// Elapsed minutes between two civil timestamps in the same zone.
pub fn minutes_between(start: NaiveDateTime, end: NaiveDateTime, tz: Tz) -> i64 {
    (civil_to_instant(end, tz) - civil_to_instant(start, tz)).num_minutes()
}

/// Slot and part granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grid {
    QuarterHour,
    HalfHour,
}

/// Which side of a band a timestamp snaps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// The boundary opening the band.
    Start,
    /// The boundary closing the band.
    End,
}

impl Grid {
    pub const fn minutes(self) -> u32 {
        match self {
            Self::QuarterHour => FULL_GRANULE_MINUTES,
            Self::HalfHour => LITE_GRANULE_MINUTES,
        }
    }

    /// Half-open `[start, end)` minute bands within one hour.
    const fn bands(self) -> &'static [(u32, u32)] {
        match self {
            Self::QuarterHour => &[(0, 15), (15, 30), (30, 45), (45, 60)],
            Self::HalfHour => &[(0, 30), (30, 60)],
        }
    }

    /// Opening boundary of the band containing `minute`.
    pub fn floor_minute(self, minute: u32) -> u32 {
        self.bands()
            .iter()
            .find(|(start, end)| (*start..*end).contains(&minute))
            .map_or(0, |(start, _)| *start)
    }
}

/// Snap civil time onto the grid.
///
/// `Edge::End` returns the close of the band, which may roll into the next
/// hour or day.
pub fn quantize_to_grid(civil: NaiveDateTime, grid: Grid, edge: Edge) -> NaiveDateTime {
    let floored = civil
        .with_minute(grid.floor_minute(civil.minute()))
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(civil);

    match edge {
        Edge::Start => floored,
        Edge::End => floored + Duration::minutes(i64::from(grid.minutes())),
    }
}

/// Clock-time variant of [`quantize_to_grid`], returning minutes since
/// midnight (the end edge can reach 1440).
pub fn quantize_clock(time: NaiveTime, grid: Grid, edge: Edge) -> u32 {
    let floored = time.hour() * 60 + grid.floor_minute(time.minute());
    match edge {
        Edge::Start => floored,
        Edge::End => floored + grid.minutes(),
    }
}

/// Last representable second of a day; stands in for 24:00.
pub fn end_of_day() -> NaiveTime {
    NaiveTime::from_num_seconds_from_midnight_opt(86_399, 0).unwrap_or_default()
}

/// Clock time for minutes since midnight, with 1440 and above clamped to
/// [`end_of_day`].
pub fn clock_from_minutes(minutes: u32) -> NaiveTime {
    if minutes >= 24 * 60 {
        return end_of_day();
    }
    NaiveTime::from_num_seconds_from_midnight_opt(minutes * 60, 0).unwrap_or_default()
}

/// Clock time at which an interval ends, as seen from its start day.
///
/// An end on a later civil date renders as [`end_of_day`].
pub fn clock_end(start: NaiveDateTime, end: NaiveDateTime) -> NaiveTime {
    if end.date() > start.date() {
        end_of_day()
    } else {
        end.time()
    }
}

/// One anchor per civil day from `window_start` through `window_end`.
///
/// Anchor `i` is `window_start + i days`; the count is the whole-day
/// difference plus one.
pub fn day_anchors(window_start: NaiveDateTime, window_end: NaiveDateTime) -> Vec<NaiveDateTime> {
    let whole_days = (window_end - window_start).num_days();
    if whole_days < 0 {
        return Vec::new();
    }
    (0..=whole_days).map(|offset| window_start + Duration::days(offset)).collect()
}

/// `--MM-DD` tag used by the solver.
pub fn month_day(date: NaiveDate) -> String {
    format!("--{:02}-{:02}", date.month(), date.day())
}

pub fn day_of_week(civil: NaiveDateTime) -> DayOfWeek {
    DayOfWeek::from(civil.weekday())
}

/// Civil midnight of `date`.
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::default())
}
