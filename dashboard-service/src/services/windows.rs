//! Time-window calculation.
//!
//! All windows are computed on the wall clock of the requested timezone and
//! then pinned to concrete instants.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, LocalResult, Months, NaiveDate, NaiveDateTime,
    NaiveTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;

use super::ServiceError;
use crate::models::TimeWindowSet;

/// Timezone used for window boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// The host's local timezone.
    Local,
    Named(Tz),
}

impl Zone {
    /// Parse an IANA identifier. `None` or blank selects the host timezone.
    pub fn parse(identifier: Option<&str>) -> Result<Self, ServiceError> {
        let Some(identifier) = identifier.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Zone::Local);
        };

        identifier.parse::<Tz>().map(Zone::Named).map_err(|_| {
            ServiceError::Configuration(format!(
                "Invalid timezone identifier '{}' (expected IANA name, e.g. America/Los_Angeles)",
                identifier
            ))
        })
    }

    pub fn name(&self) -> String {
        match self {
            Zone::Local => "local".to_string(),
            Zone::Named(tz) => tz.name().to_string(),
        }
    }

    fn wall_clock(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self {
            Zone::Local => fixed(instant.with_timezone(&chrono::Local)),
            Zone::Named(tz) => fixed(instant.with_timezone(tz)),
        }
    }

    fn pin(&self, naive: NaiveDateTime) -> DateTime<FixedOffset> {
        match self {
            Zone::Local => pin_in(&chrono::Local, naive),
            Zone::Named(tz) => pin_in(tz, naive),
        }
    }

    /// Derive every named window from `reference`.
    pub fn windows(&self, reference: DateTime<Utc>) -> TimeWindowSet {
        let today = self.wall_clock(reference);
        let date = today.date_naive();

        let month_first = first_of_month(date);
        let prev_month_first = months_back(month_first);

        let day_end = self.pin(end_of_day(date));

        TimeWindowSet {
            reference_instant: reference,
            timezone: self.name(),
            today,
            day_start: self.pin(start_of_day(date)),
            day_end,
            month_start: self.pin(start_of_day(month_first)),
            month_end: self.pin(end_of_day(last_of_month(date))),
            month_to_date: day_end,
            prev_month_start: self.pin(start_of_day(prev_month_first)),
            prev_month_end: self.pin(end_of_day(last_of_month(prev_month_first))),
            prev_month_to_date: self.pin(end_of_day(months_back(date))),
        }
    }
}

/// Windows for `reference` in `timezone` (host timezone when `None`).
pub fn calculate_windows(
    reference: DateTime<Utc>,
    timezone: Option<&str>,
) -> Result<TimeWindowSet, ServiceError> {
    Ok(Zone::parse(timezone)?.windows(reference))
}

fn fixed<T: TimeZone>(dt: DateTime<T>) -> DateTime<FixedOffset> {
    let offset = dt.offset().fix();
    dt.with_timezone(&offset)
}

/// Resolve a wall-clock time in `tz`.
///
/// Ambiguous times (DST fall-back) take the earlier instant. Times skipped by
/// a DST jump move forward to the first valid wall-clock time.
fn pin_in<T: TimeZone>(tz: &T, naive: NaiveDateTime) -> DateTime<FixedOffset> {
    let mut candidate = naive;
    for _ in 0..8 {
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(dt) => return fixed(dt),
            LocalResult::Ambiguous(earliest, _) => return fixed(earliest),
            LocalResult::None => candidate += Duration::minutes(30),
        }
    }
    fixed(tz.from_utc_datetime(&naive))
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    start_of_day(date) + Duration::days(1) - Duration::milliseconds(1)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

fn last_of_month(date: NaiveDate) -> NaiveDate {
    first_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// Same day one calendar month earlier, clamped to that month's length.
fn months_back(date: NaiveDate) -> NaiveDate {
    date.checked_sub_months(Months::new(1)).unwrap_or(date)
}
