//! Schedule time helpers.
//!
//! Legs are scheduled in naive local time with minute precision. This
//! module provides the shared timestamp format and the departure-window
//! logic used by both flat leg search and itinerary enumeration.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Timestamp format used in renderings and snapshot records.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Date-only format used for card expiry and search inputs.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD HH:MM` timestamp.
pub fn parse_date_time(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, DATE_TIME_FORMAT)
}

/// Format a timestamp as `YYYY-MM-DD HH:MM`.
pub fn format_date_time(t: NaiveDateTime) -> String {
    t.format(DATE_TIME_FORMAT).to_string()
}

/// Format a duration as `HH:MM`.
///
/// Hours are not wrapped at 24, so a 30-hour journey renders as `30:00`.
pub fn format_hhmm(duration: Duration) -> String {
    let minutes = duration.num_minutes();
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// A window constraining when a leg may depart.
///
/// The window is inclusive on both ends. When no upper bound is given the
/// window instead covers the rest of the lower bound's calendar day: this is
/// the "travels on this date" search form, and also the first hop of an
/// itinerary search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepartureWindow {
    lower: NaiveDateTime,
    upper: Option<NaiveDateTime>,
}

impl DepartureWindow {
    /// A window spanning one whole calendar day.
    pub fn single_day(date: NaiveDate) -> Self {
        DepartureWindow {
            lower: date.and_time(NaiveTime::MIN),
            upper: None,
        }
    }

    /// A window with explicit inclusive bounds.
    pub fn bounded(lower: NaiveDateTime, upper: NaiveDateTime) -> Self {
        DepartureWindow {
            lower,
            upper: Some(upper),
        }
    }

    /// Returns the inclusive lower bound.
    pub fn lower(&self) -> NaiveDateTime {
        self.lower
    }

    /// Returns whether a departure time falls inside this window.
    pub fn contains(&self, start: NaiveDateTime) -> bool {
        if start < self.lower {
            return false;
        }
        match self.upper {
            Some(upper) => start <= upper,
            None => start.date() == self.lower.date(),
        }
    }
}
