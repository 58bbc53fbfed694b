//! Calendar helpers: business dates and the month keys the backend indexes by.

use std::fmt;

use chrono::{Datelike, Local, NaiveDate};

/// Today's date in local time.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn previous_day(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(date)
}

pub fn next_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(date)
}

/// A day given as `YYYY-MM-DD` or as `today`, `yesterday` or `tomorrow`
/// relative to `today`.
pub fn parse_day(value: &str, today: NaiveDate) -> Option<NaiveDate> {
    match value.trim().to_lowercase().as_str() {
        "today" => Some(today),
        "yesterday" => Some(previous_day(today)),
        "tomorrow" => Some(next_day(today)),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d").ok(),
    }
}

/// A calendar month.
///
/// Displays as `YYYY-MM`; the backend expects the upper-case
/// `MON YYYY` form from [`MonthKey::wire_label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// `None` unless `month` is 1-12 and `year` is within the calendar's range.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) && Self::year_in_range(year) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn current() -> Self {
        Self::containing(today())
    }

    fn year_in_range(year: i32) -> bool {
        (NaiveDate::MIN.year()..=NaiveDate::MAX.year()).contains(&year)
    }

    /// Resolve a month argument relative to `current`: `prev` (or `last`,
    /// `previous`) and `next` step one month; anything else is parsed as
    /// `YYYY-MM`, falling back to `current`.
    pub fn resolve(value: &str, current: MonthKey) -> Self {
        match value.trim().to_lowercase().as_str() {
            "prev" | "previous" | "last" => current.previous(),
            "next" => current.next(),
            other => Self::parse(other).unwrap_or(current),
        }
    }

    /// Parse `YYYY-MM`, falling back to the current month when the input is
    /// not in that shape.
    ///
    /// Out-of-range months roll over the way a calendar does: `2026-13`
    /// is January 2027 and `2026-00` is December 2025.
    pub fn parse_or_current(value: &str) -> Self {
        Self::parse(value).unwrap_or_else(Self::current)
    }

    fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let (year, month) = value.split_once('-')?;
        if year.len() != 4 || month.len() != 2 {
            return None;
        }
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }
        let year: i32 = year.parse().ok()?;
        let month: i32 = month.parse().ok()?;
        Some(Self::from_index(year * 12 + month - 1))
    }

    fn index(&self) -> i32 {
        self.year * 12 + self.month as i32 - 1
    }

    fn from_index(index: i32) -> Self {
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Step by `months`, staying put at the edges of the calendar.
    fn step(&self, months: i32) -> Self {
        let stepped = Self::from_index(self.index() + months);
        if Self::year_in_range(stepped.year) {
            stepped
        } else {
            *self
        }
    }

    pub fn previous(&self) -> Self {
        self.step(-1)
    }

    pub fn next(&self) -> Self {
        self.step(1)
    }

    fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Upper-case short month and year, e.g. `JAN 2026`.
    pub fn wire_label(&self) -> String {
        match self.first_day() {
            Some(date) => date.format("%b %Y").to_string().to_uppercase(),
            None => format!("{:04}-{:02}", self.year, self.month),
        }
    }

    /// Long display form, e.g. `January 2026`.
    pub fn display_long(&self) -> String {
        match self.first_day() {
            Some(date) => date.format("%B %Y").to_string(),
            None => self.to_string(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
