//! Per-date task overlay.

use crate::assignment_store::AssignmentStore;
use crate::date::{compute_countdown, format_date};
use chrono::NaiveDate;

pub const EMPTY_PLACEHOLDER: &str = "No assignments for this date.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelRow {
    pub id: i64,
    pub content: String,
    pub countdown: String,
}

#[derive(Debug, Clone, Default)]
pub struct TaskPanel {
    date: Option<NaiveDate>,
    pub input: String,
    pub selected: usize,
}

impl TaskPanel {
    pub fn open(&mut self, date: NaiveDate) {
        self.date = Some(date);
        self.input.clear();
        self.selected = 0;
    }

    pub fn close(&mut self) {
        self.date = None;
    }

    pub fn is_open(&self) -> bool {
        self.date.is_some()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn date_key(&self) -> Option<String> {
        self.date.map(|d| format_date(&d))
    }

    pub fn title(&self) -> String {
        match self.date_key() {
            Some(key) => format!("{key} assignments"),
            None => String::new(),
        }
    }

    /// Rows for the open date; empty when closed or when the date has no
    /// tasks.
    pub fn rows(&self, store: &AssignmentStore, today: NaiveDate) -> Vec<PanelRow> {
        let Some(date) = self.date else {
            return Vec::new();
        };
        let countdown = compute_countdown(&date, &today);
        store
            .tasks_for(&format_date(&date))
            .iter()
            .map(|t| PanelRow {
                id: t.id,
                content: t.content.clone(),
                countdown: countdown.clone(),
            })
            .collect()
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self, row_count: usize) {
        if self.selected + 1 < row_count {
            self.selected += 1;
        }
    }

    /// Keeps the highlight on a real row after deletions.
    pub fn clamp_selection(&mut self, row_count: usize) {
        self.selected = self.selected.min(row_count.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn opening_resets_input_and_selection() {
        let mut panel = TaskPanel {
            input: "left over".into(),
            selected: 3,
            ..TaskPanel::default()
        };
        panel.open(ymd(2025, 1, 9));
        assert!(panel.is_open());
        assert!(panel.input.is_empty());
        assert_eq!(panel.selected, 0);
        assert_eq!(panel.title(), "2025-01-09 assignments");

        panel.close();
        assert!(!panel.is_open());
        assert_eq!(panel.date_key(), None);
    }

    #[test]
    fn rows_carry_countdown_relative_to_the_open_date() {
        let dir = TempDir::new().expect("tempdir");
        let mut store = AssignmentStore::load(dir.path().join("a.json"));
        store.add_task("2025-01-13", "Science fair").expect("add");

        let mut panel = TaskPanel::default();
        panel.open(ymd(2025, 1, 13));
        let rows = panel.rows(&store, ymd(2025, 1, 10));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].content, "Science fair");
        assert_eq!(rows[0].countdown, "D-3");
    }

    #[test]
    fn rows_empty_for_date_without_tasks() {
        let dir = TempDir::new().expect("tempdir");
        let store = AssignmentStore::load(dir.path().join("a.json"));
        let mut panel = TaskPanel::default();
        assert!(panel.rows(&store, ymd(2025, 1, 1)).is_empty());
        panel.open(ymd(2025, 1, 2));
        assert!(panel.rows(&store, ymd(2025, 1, 1)).is_empty());
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut panel = TaskPanel::default();
        panel.select_prev();
        assert_eq!(panel.selected, 0);
        panel.select_next(2);
        panel.select_next(2);
        assert_eq!(panel.selected, 1);
        panel.clamp_selection(1);
        assert_eq!(panel.selected, 0);
        panel.clamp_selection(0);
        assert_eq!(panel.selected, 0);
    }
}
