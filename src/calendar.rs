use crate::assignment_store::AssignmentStore;
use crate::date::{days_in_month, format_date, is_same_day};
use chrono::{Datelike, Month, NaiveDate};

pub const WEEKDAY_HEADERS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// The displayed month. Only navigation moves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarCursor {
    pub year: i32,
    pub month: u32, // 1-based
}

impl CalendarCursor {
    pub fn new(year: i32, month: u32) -> Self {
        Self {
            year,
            month: month.clamp(1, 12),
        }
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }

    pub fn prev_month(&mut self) {
        if self.month == 1 {
            self.month = 12;
            self.year -= 1;
        } else {
            self.month -= 1;
        }
    }

    pub fn next_month(&mut self) {
        if self.month == 12 {
            self.month = 1;
            self.year += 1;
        } else {
            self.month += 1;
        }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// 0 = Sunday .. 6 = Saturday.
    pub fn first_weekday(&self) -> u32 {
        self.first_day()
            .map(|d| d.weekday().num_days_from_sunday())
            .unwrap_or(0)
    }

    pub fn day_count(&self) -> u32 {
        days_in_month(self.year, self.month)
    }

    pub fn date(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    pub fn label(&self) -> String {
        let name = u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name())
            .unwrap_or("?");
        format!("{name} {}", self.year)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub day: u32,
    pub date: NaiveDate,
    pub key: String,
    pub today: bool,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridCell {
    Empty,
    Day(DayCell),
}

impl GridCell {
    pub fn as_day(&self) -> Option<&DayCell> {
        match self {
            GridCell::Day(cell) => Some(cell),
            GridCell::Empty => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub label: String,
    pub leading: u32,
    pub cells: Vec<GridCell>,
}

impl MonthGrid {
    /// Projects the cursor's month: leading blanks up to the first weekday,
    /// then one cell per day with the first stored task as its summary.
    pub fn build(cursor: CalendarCursor, store: &AssignmentStore, today: NaiveDate) -> Self {
        let leading = cursor.first_weekday();
        let mut cells: Vec<GridCell> = (0..leading).map(|_| GridCell::Empty).collect();

        for day in 1..=cursor.day_count() {
            let Some(date) = cursor.date(day) else {
                continue;
            };
            let key = format_date(&date);
            let summary = store.tasks_for(&key).first().map(|t| t.content.clone());
            cells.push(GridCell::Day(DayCell {
                day,
                date,
                today: is_same_day(&date, &today),
                key,
                summary,
            }));
        }

        Self {
            label: cursor.label(),
            leading,
            cells,
        }
    }

    pub fn days(&self) -> impl Iterator<Item = &DayCell> {
        self.cells.iter().filter_map(GridCell::as_day)
    }

    pub fn day(&self, day: u32) -> Option<&DayCell> {
        self.days().find(|c| c.day == day)
    }

    /// Rows of seven, the last one padded with blanks.
    pub fn weeks(&self) -> Vec<Vec<GridCell>> {
        self.cells
            .chunks(7)
            .map(|week| {
                let mut week = week.to_vec();
                week.resize(7, GridCell::Empty);
                week
            })
            .collect()
    }
}
