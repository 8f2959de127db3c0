//! Civil-date primitives: the day cell, the month/year label and whole-month
//! arithmetic.
//!
//! All arithmetic is checked. chrono's representable range is roughly
//! ±262,000 years, so the error paths only matter for adversarial anchors,
//! but they are still reported instead of panicking.

use std::fmt;

use chrono::{Datelike, Months, NaiveDate, Weekday};

use crate::error::DateStripError;

/// A single calendar day in the strip.
///
/// Cells are immutable. Their [`key`](DateCell::key) is the day number since
/// the common era, which is unique and increases by exactly one between
/// consecutive days, so it doubles as a stable render key and as an O(1)
/// index base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DateCell {
    date: NaiveDate,
}

impl DateCell {
    /// Creates a cell for the given date.
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    /// The civil date of this cell.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Calendar year.
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// Calendar month, 1–12.
    pub fn month(&self) -> u32 {
        self.date.month()
    }

    /// Day of month, 1–31.
    pub fn day(&self) -> u32 {
        self.date.day()
    }

    /// Month and year this cell belongs to.
    pub fn month_year(&self) -> MonthYear {
        MonthYear::of(self.date)
    }

    /// Short English weekday label, e.g. `"Mon"`.
    pub fn weekday_label(&self) -> &'static str {
        match self.date.weekday() {
            Weekday::Mon => "Mon",
            Weekday::Tue => "Tue",
            Weekday::Wed => "Wed",
            Weekday::Thu => "Thu",
            Weekday::Fri => "Fri",
            Weekday::Sat => "Sat",
            Weekday::Sun => "Sun",
        }
    }

    /// Stable, unique, order-preserving key.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use dayline::calendar::DateCell;
    ///
    /// let a = DateCell::new(NaiveDate::from_ymd_opt(2024, 2, 28).unwrap());
    /// let b = DateCell::new(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    /// assert_eq!(b.key() - a.key(), 1);
    /// ```
    pub fn key(&self) -> i32 {
        self.date.num_days_from_ce()
    }

    /// ISO `YYYY-MM-DD` form, the key format daily-entry APIs are queried with.
    pub fn iso(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Whether this cell is the first day of its month.
    pub fn is_first_of_month(&self) -> bool {
        self.date.day() == 1
    }
}

impl From<NaiveDate> for DateCell {
    fn from(date: NaiveDate) -> Self {
        Self::new(date)
    }
}

impl fmt::Display for DateCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date.format("%Y-%m-%d"))
    }
}

/// A calendar month, as reported to month-header consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonthYear {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1–12.
    pub month: u32,
}

impl MonthYear {
    /// Creates a month/year pair.
    pub fn new(month: u32, year: i32) -> Self {
        Self { year, month }
    }

    /// The month/year a date falls in.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for MonthYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

fn out_of_range(date: NaiveDate) -> DateStripError {
    DateStripError::DateOutOfRange { date }
}

/// First day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> Result<NaiveDate, DateStripError> {
    date.with_day(1).ok_or_else(|| out_of_range(date))
}

/// Last day of the month containing `date`.
pub fn last_of_month(date: NaiveDate) -> Result<NaiveDate, DateStripError> {
    first_of_month(date)?
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| out_of_range(date))
}

/// First day of the month `delta` months away from the month of `date`.
///
/// ```
/// use chrono::NaiveDate;
/// use dayline::calendar::shift_months;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
/// let shifted = shift_months(date, -3).unwrap();
/// assert_eq!(shifted, NaiveDate::from_ymd_opt(2023, 12, 1).unwrap());
/// ```
pub fn shift_months(date: NaiveDate, delta: i32) -> Result<NaiveDate, DateStripError> {
    let first = first_of_month(date)?;
    let months = Months::new(delta.unsigned_abs());
    let shifted = if delta >= 0 {
        first.checked_add_months(months)
    } else {
        first.checked_sub_months(months)
    };
    shifted.ok_or_else(|| out_of_range(date))
}

/// Signed number of calendar months from the month of `from` to the month of
/// `to`, ignoring the day of month.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32
}

/// Number of days in the given month.
pub fn days_in_month(year: i32, month: u32) -> Result<u32, DateStripError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        DateStripError::invalid("month", format!("{year}-{month} is not a calendar month"))
    })?;
    Ok(last_of_month(first)?.day())
}

/// Cells for every day from `first` through `last`, inclusive.
///
/// Returns an empty vector when `last < first`.
pub fn day_cells(first: NaiveDate, last: NaiveDate) -> Vec<DateCell> {
    if last < first {
        return Vec::new();
    }
    let len = (last - first).num_days() as usize + 1;
    let mut cells = Vec::with_capacity(len);
    cells.extend(first.iter_days().take(len).map(DateCell::new));
    cells
}

/// Cells covering `months` whole calendar months starting at the month of
/// `first`.
pub fn month_span(first: NaiveDate, months: u32) -> Result<Vec<DateCell>, DateStripError> {
    if months == 0 {
        return Ok(Vec::new());
    }
    let start = first_of_month(first)?;
    let end = last_of_month(shift_months(start, months as i32 - 1)?)?;
    Ok(day_cells(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_bounds_handle_leap_years() {
        assert_eq!(last_of_month(ymd(2024, 2, 10)).unwrap(), ymd(2024, 2, 29));
        assert_eq!(last_of_month(ymd(2023, 2, 10)).unwrap(), ymd(2023, 2, 28));
        assert_eq!(last_of_month(ymd(2023, 12, 31)).unwrap(), ymd(2023, 12, 31));
        assert_eq!(days_in_month(2024, 2).unwrap(), 29);
        assert_eq!(days_in_month(2100, 2).unwrap(), 28);
    }

    #[test]
    fn shift_months_crosses_year_boundaries() {
        assert_eq!(shift_months(ymd(2024, 1, 31), -1).unwrap(), ymd(2023, 12, 1));
        assert_eq!(shift_months(ymd(2024, 11, 30), 2).unwrap(), ymd(2025, 1, 1));
        assert_eq!(shift_months(ymd(2024, 5, 5), 0).unwrap(), ymd(2024, 5, 1));
    }

    #[test]
    fn months_between_ignores_days() {
        assert_eq!(months_between(ymd(2024, 3, 31), ymd(2024, 4, 1)), 1);
        assert_eq!(months_between(ymd(2024, 2, 1), ymd(2023, 11, 30)), -3);
        assert_eq!(months_between(ymd(2024, 2, 1), ymd(2024, 2, 29)), 0);
    }

    #[test]
    fn month_span_covers_whole_months() {
        let cells = month_span(ymd(2024, 2, 14), 2).unwrap();
        assert_eq!(cells.len(), 29 + 31);
        assert_eq!(cells[0].date(), ymd(2024, 2, 1));
        assert_eq!(cells[cells.len() - 1].date(), ymd(2024, 3, 31));
        assert!(month_span(ymd(2024, 2, 14), 0).unwrap().is_empty());
    }

    #[test]
    fn cell_labels() {
        let cell = DateCell::new(ymd(2024, 3, 15));
        assert_eq!(cell.weekday_label(), "Fri");
        assert_eq!(cell.iso(), "2024-03-15");
        assert_eq!(cell.to_string(), "2024-03-15");
        assert_eq!(cell.month_year(), MonthYear::new(3, 2024));
        assert!(!cell.is_first_of_month());
        assert!(DateCell::new(ymd(2024, 3, 1)).is_first_of_month());
    }

    #[test]
    fn month_year_orders_by_year_then_month() {
        assert!(MonthYear::new(12, 2023) < MonthYear::new(1, 2024));
        assert_eq!(MonthYear::new(3, 2024).to_string(), "03/2024");
    }

    #[test]
    fn arithmetic_at_the_calendar_edge_is_reported() {
        let err = shift_months(NaiveDate::MAX, 1).unwrap_err();
        assert!(matches!(err, DateStripError::DateOutOfRange { .. }));
        assert!(days_in_month(2024, 13).is_err());
    }
}
