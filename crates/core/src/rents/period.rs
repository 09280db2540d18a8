//! Calendar month a rent snapshot covers.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::error::RentsError;

/// A calendar month, the unit of every rent snapshot.
///
/// Both ends of the month are resolved on construction, so every accessor is infallible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "PeriodParts", into = "PeriodParts")]
pub struct RentPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

/// Wire form of a [`RentPeriod`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct PeriodParts {
    year: i32,
    month: u32,
}

/// Half-open date range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    /// First day included.
    pub start: NaiveDate,
    /// First day excluded.
    pub end: NaiveDate,
}

impl DateWindow {
    /// Returns true if the date falls inside the window.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }
}

impl RentPeriod {
    /// Creates the period for a year and month (1-12).
    ///
    /// # Errors
    ///
    /// Returns `RentsError::InvalidPeriod` if the month is out of range or the year cannot be
    /// represented.
    pub fn new(year: i32, month: u32) -> Result<Self, RentsError> {
        let invalid = || RentsError::InvalidPeriod { year, month };
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let end = start
            .checked_add_months(Months::new(1))
            .ok_or_else(invalid)?;
        Ok(Self { start, end })
    }

    /// Returns the period containing the given date.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Option<Self> {
        Self::new(date.year(), date.month()).ok()
    }

    /// Calendar year.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.start.year()
    }

    /// Calendar month (1-12).
    #[must_use]
    pub fn month(&self) -> u32 {
        self.start.month()
    }

    /// First day of the month. Unoccupied markers are keyed by this date.
    #[must_use]
    pub const fn month_start(&self) -> NaiveDate {
        self.start
    }

    /// The month as a half-open date window.
    #[must_use]
    pub const fn window(&self) -> DateWindow {
        DateWindow {
            start: self.start,
            end: self.end,
        }
    }

    /// Number of days in the month.
    #[must_use]
    pub fn days_in_month(&self) -> u32 {
        // A month spans 28..=31 days.
        u32::try_from((self.end - self.start).num_days()).unwrap_or(28)
    }

    /// Due date for a configured due day, clamped into the month.
    ///
    /// Day 31 in a 30-day month falls on the 30th; day 0 falls on the 1st.
    #[must_use]
    pub fn due_date(&self, due_day: u32) -> NaiveDate {
        let day = due_day.clamp(1, self.days_in_month());
        self.start
            .checked_add_days(Days::new(u64::from(day - 1)))
            .unwrap_or(self.start)
    }

    /// The following month.
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        Self::containing(self.end)
    }

    /// The preceding month.
    #[must_use]
    pub fn previous(&self) -> Option<Self> {
        self.start.pred_opt().and_then(Self::containing)
    }

    /// Human-readable name, e.g. "March 2026".
    #[must_use]
    pub fn name(&self) -> String {
        format!("{} {}", month_name(self.month()), self.year())
    }
}

impl std::fmt::Display for RentPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl TryFrom<PeriodParts> for RentPeriod {
    type Error = RentsError;

    fn try_from(parts: PeriodParts) -> Result<Self, Self::Error> {
        Self::new(parts.year, parts.month)
    }
}

impl From<RentPeriod> for PeriodParts {
    fn from(period: RentPeriod) -> Self {
        Self {
            year: period.year(),
            month: period.month(),
        }
    }
}

/// Returns month name.
fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        _ => "December",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_is_half_open() {
        let period = RentPeriod::new(2026, 3).unwrap();
        let window = period.window();

        assert_eq!(window.start, date(2026, 3, 1));
        assert_eq!(window.end, date(2026, 4, 1));
        assert!(window.contains(date(2026, 3, 31)));
        assert!(!window.contains(date(2026, 4, 1)));
        assert!(!window.contains(date(2026, 2, 28)));
    }

    #[test]
    fn test_december_rolls_into_next_year() {
        let period = RentPeriod::new(2025, 12).unwrap();
        assert_eq!(period.window().end, date(2026, 1, 1));
        assert_eq!(period.next(), Some(RentPeriod::new(2026, 1).unwrap()));
        assert_eq!(
            RentPeriod::new(2026, 1).unwrap().previous(),
            Some(period)
        );
    }

    #[rstest]
    #[case(2026, 1, 31)]
    #[case(2026, 2, 28)]
    #[case(2024, 2, 29)]
    #[case(2026, 4, 30)]
    #[case(2026, 12, 31)]
    fn test_days_in_month(#[case] year: i32, #[case] month: u32, #[case] days: u32) {
        assert_eq!(RentPeriod::new(year, month).unwrap().days_in_month(), days);
    }

    #[rstest]
    #[case(2026, 4, 31, 30)]
    #[case(2026, 2, 30, 28)]
    #[case(2024, 2, 30, 29)]
    #[case(2026, 1, 15, 15)]
    #[case(2026, 1, 0, 1)]
    fn test_due_date_is_clamped(
        #[case] year: i32,
        #[case] month: u32,
        #[case] due_day: u32,
        #[case] expected_day: u32,
    ) {
        let period = RentPeriod::new(year, month).unwrap();
        assert_eq!(period.due_date(due_day), date(year, month, expected_day));
    }

    #[rstest]
    #[case(0)]
    #[case(13)]
    fn test_invalid_month_rejected(#[case] month: u32) {
        assert_eq!(
            RentPeriod::new(2026, month),
            Err(RentsError::InvalidPeriod { year: 2026, month })
        );
    }

    #[test]
    fn test_name_and_display() {
        let period = RentPeriod::new(2026, 3).unwrap();
        assert_eq!(period.name(), "March 2026");
        assert_eq!(period.to_string(), "2026-03");
    }

    #[test]
    fn test_serde_uses_year_and_month() {
        let period = RentPeriod::new(2026, 3).unwrap();
        let json = serde_json::to_value(period).unwrap();
        assert_eq!(json, serde_json::json!({ "year": 2026, "month": 3 }));

        let parsed: RentPeriod = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, period);

        let bad = serde_json::from_value::<RentPeriod>(serde_json::json!({ "year": 2026, "month": 13 }));
        assert!(bad.is_err());
    }
}
