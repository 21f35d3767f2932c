use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

/// A closed interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl Window {
    pub fn new(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

/// Named date ranges derived from a reference instant in a timezone.
///
/// Bounds carry the UTC offset in effect at that wall-clock time, so a day
/// spanning a DST transition has different offsets at its start and end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeWindowSet {
    pub reference_instant: DateTime<Utc>,
    /// IANA name, or `"local"` when the system timezone was used.
    pub timezone: String,
    pub today: DateTime<FixedOffset>,
    pub day_start: DateTime<FixedOffset>,
    pub day_end: DateTime<FixedOffset>,
    pub month_start: DateTime<FixedOffset>,
    pub month_end: DateTime<FixedOffset>,
    pub month_to_date: DateTime<FixedOffset>,
    pub prev_month_start: DateTime<FixedOffset>,
    pub prev_month_end: DateTime<FixedOffset>,
    pub prev_month_to_date: DateTime<FixedOffset>,
}

impl TimeWindowSet {
    pub fn day(&self) -> Window {
        Window::new(self.day_start, self.day_end)
    }

    pub fn month(&self) -> Window {
        Window::new(self.month_start, self.month_end)
    }

    pub fn previous_month(&self) -> Window {
        Window::new(self.prev_month_start, self.prev_month_end)
    }

    pub fn month_to_date(&self) -> Window {
        Window::new(self.month_start, self.month_to_date)
    }

    pub fn previous_month_to_date(&self) -> Window {
        Window::new(self.prev_month_start, self.prev_month_to_date)
    }
}
