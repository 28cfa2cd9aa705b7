//! Date helpers shared by the store, the grid and the task panel.
//!
//! Everything here works on calendar dates. Callers pass `today` in
//! explicitly so the projections stay pure.

use std::fmt;

use chrono::{Datelike, Local, NaiveDate};

pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Zero-padded `YYYY-MM-DD` key for a date.
pub fn format_date<D: Datelike>(date: &D) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), DATE_KEY_FORMAT).ok()
}

pub fn is_same_day<A: Datelike, B: Datelike>(a: &A, b: &B) -> bool {
    a.year() == b.year() && a.month() == b.month() && a.day() == b.day()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Signed distance from today to a due date, in whole days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Remaining(u64),
    Today,
    Overdue(u64),
}

impl Countdown {
    /// Both sides are reduced to their calendar date before subtracting,
    /// so any time of day on `target`'s date counts as the same day.
    pub fn between<A: Datelike, B: Datelike>(target: &A, today: &B) -> Self {
        let days = i64::from(target.num_days_from_ce()) - i64::from(today.num_days_from_ce());
        match days {
            0 => Countdown::Today,
            d if d > 0 => Countdown::Remaining(d.unsigned_abs()),
            d => Countdown::Overdue(d.unsigned_abs()),
        }
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Countdown::Remaining(n) => write!(f, "D-{n}"),
            Countdown::Today => f.write_str("D-Day!"),
            Countdown::Overdue(n) => write!(f, "D+{n}"),
        }
    }
}

pub fn compute_countdown<A: Datelike, B: Datelike>(target: &A, today: &B) -> String {
    Countdown::between(target, today).to_string()
}

/// Number of days in the given month (1-based).
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(31)
}
