use chrono::{Datelike, Days, Duration, Local, NaiveDate};
use serde::Serialize;

use crate::models::parse_date;

pub const DAYS_PER_WEEK: i64 = 7;

/// A Monday-aligned run of seven calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub previous_start: NaiveDate,
    pub next_start: NaiveDate,
}

impl WeekWindow {
    /// The window around `date`, or `None` when the surrounding weeks fall
    /// outside the representable calendar.
    #[must_use]
    pub fn checked(date: NaiveDate) -> Option<Self> {
        let week = DAYS_PER_WEEK.unsigned_abs();
        let offset = u64::from(date.weekday().num_days_from_monday());
        let start = date.checked_sub_days(Days::new(offset))?;
        Some(Self {
            start,
            end: start.checked_add_days(Days::new(week - 1))?,
            previous_start: start.checked_sub_days(Days::new(week))?,
            next_start: start.checked_add_days(Days::new(week))?,
        })
    }

    /// # Panics
    ///
    /// For dates within a week of the ends of the calendar. Use
    /// [`WeekWindow::checked`] for untrusted input.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        let offset = i64::from(date.weekday().num_days_from_monday());
        let start = date - Duration::days(offset);
        Self {
            start,
            end: start + Duration::days(DAYS_PER_WEEK - 1),
            previous_start: start - Duration::days(DAYS_PER_WEEK),
            next_start: start + Duration::days(DAYS_PER_WEEK),
        }
    }

    pub fn days(self) -> impl Iterator<Item = NaiveDate> {
        (0..DAYS_PER_WEEK).map(move |i| self.start + Duration::days(i))
    }

    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Resolve the week to display from an optional `YYYY-MM-DD` parameter.
///
/// Absent, malformed or out-of-range input falls back to `today`; this never fails.
#[must_use]
pub fn resolve_week(param: Option<&str>, today: NaiveDate) -> WeekWindow {
    param
        .and_then(|s| parse_date(s).ok())
        .and_then(WeekWindow::checked)
        .unwrap_or_else(|| WeekWindow::containing(today))
}

#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
