use crate::assignment_store::{AssignmentStore, TaskInputError};
use crate::calendar::{CalendarCursor, MonthGrid};
use crate::panel::TaskPanel;
use chrono::{Datelike, Duration, NaiveDate};
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::{Position, Rect};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Previous,
    Next,
}

/// Actions a front end forwards to the calendar core.
pub trait CalendarHandler {
    fn on_cell_click(&mut self, date: NaiveDate);
    fn on_add_task(&mut self);
    fn on_delete_task(&mut self, date_key: &str, id: i64);
    fn on_navigate(&mut self, navigation: Navigation);
}

/// Screen areas recorded by the last draw, used to route mouse clicks.
#[derive(Debug, Clone, Default)]
pub struct HitMap {
    pub cells: Vec<(Rect, NaiveDate)>,
    pub overlay: Option<Rect>,
    pub close: Option<Rect>,
    /// Delete control of each visible overlay row, with the row's task id.
    pub deletes: Vec<(Rect, i64)>,
}

#[derive(Debug)]
pub struct App {
    pub cursor: CalendarCursor,
    pub store: AssignmentStore,
    pub panel: TaskPanel,
    /// Day of the cursor month that Enter opens.
    pub focused_day: u32,
    pub today: NaiveDate,
    pub notification: Option<String>,
    pub hits: HitMap,
    pub should_quit: bool,
}

impl App {
    pub fn new(store: AssignmentStore, cursor: CalendarCursor, today: NaiveDate) -> Self {
        let focused_day = if CalendarCursor::containing(today) == cursor {
            today.day()
        } else {
            1
        };
        Self {
            cursor,
            store,
            panel: TaskPanel::default(),
            focused_day,
            today,
            notification: None,
            hits: HitMap::default(),
            should_quit: false,
        }
    }

    pub fn grid(&self) -> MonthGrid {
        MonthGrid::build(self.cursor, &self.store, self.today)
    }

    pub fn focused_date(&self) -> Option<NaiveDate> {
        self.cursor.date(self.focused_day)
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        self.notification = Some(message.into());
    }

    pub fn close_overlay(&mut self) {
        self.panel.close();
    }

    /// Moves the focused cell by `days`, following it into the adjacent
    /// month when it leaves the current one.
    pub fn move_focus(&mut self, days: i64) {
        let Some(target) = self
            .focused_date()
            .and_then(|d| d.checked_add_signed(Duration::days(days)))
        else {
            return;
        };
        self.cursor = CalendarCursor::containing(target);
        self.focused_day = target.day();
    }

    pub fn jump_to_today(&mut self) {
        self.cursor = CalendarCursor::containing(self.today);
        self.focused_day = self.today.day();
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.notification.is_some() {
            self.notification = None;
            return;
        }
        if self.panel.is_open() {
            self.handle_overlay_key(key);
        } else {
            self.handle_grid_key(key);
        }
    }

    fn handle_grid_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Left | KeyCode::Char('h') => self.move_focus(-1),
            KeyCode::Right | KeyCode::Char('l') => self.move_focus(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_focus(-7),
            KeyCode::Down | KeyCode::Char('j') => self.move_focus(7),
            KeyCode::Char('[') | KeyCode::PageUp => self.on_navigate(Navigation::Previous),
            KeyCode::Char(']') | KeyCode::PageDown => self.on_navigate(Navigation::Next),
            KeyCode::Char('t') => self.jump_to_today(),
            KeyCode::Enter => {
                if let Some(date) = self.focused_date() {
                    self.on_cell_click(date);
                }
            }
            _ => {}
        }
    }

    fn handle_overlay_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.close_overlay(),
            KeyCode::Enter => self.on_add_task(),
            KeyCode::Up => self.panel.select_prev(),
            KeyCode::Down => {
                let count = self.panel.rows(&self.store, self.today).len();
                self.panel.select_next(count);
            }
            KeyCode::Delete => self.delete_selected(),
            KeyCode::Char('d') if ctrl => self.delete_selected(),
            KeyCode::Backspace => {
                self.panel.input.pop();
            }
            KeyCode::Char(c) if !ctrl => self.panel.input.push(c),
            _ => {}
        }
    }

    fn delete_selected(&mut self) {
        let Some(key) = self.panel.date_key() else {
            return;
        };
        let rows = self.panel.rows(&self.store, self.today);
        if let Some(row) = rows.get(self.panel.selected) {
            let id = row.id;
            self.on_delete_task(&key, id);
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        if self.notification.is_some() {
            self.notification = None;
            return;
        }

        let at = Position::new(mouse.column, mouse.row);
        if self.panel.is_open() {
            let inside = self.hits.overlay.is_some_and(|area| area.contains(at));
            if !inside || self.hits.close.is_some_and(|area| area.contains(at)) {
                self.close_overlay();
                return;
            }
            let delete = self
                .hits
                .deletes
                .iter()
                .find(|(area, _)| area.contains(at))
                .map(|(_, id)| *id);
            if let (Some(id), Some(key)) = (delete, self.panel.date_key()) {
                self.on_delete_task(&key, id);
            }
            return;
        }

        let clicked = self
            .hits
            .cells
            .iter()
            .find(|(area, _)| area.contains(at))
            .map(|(_, date)| *date);
        if let Some(date) = clicked {
            self.on_cell_click(date);
        }
    }
}

impl CalendarHandler for App {
    fn on_cell_click(&mut self, date: NaiveDate) {
        debug!(%date, "opening task overlay");
        self.cursor = CalendarCursor::containing(date);
        self.focused_day = date.day();
        self.panel.open(date);
    }

    fn on_add_task(&mut self) {
        let Some(key) = self.panel.date_key() else {
            self.notify(TaskInputError::NoDateSelected.to_string());
            return;
        };
        match self.store.add_task(&key, &self.panel.input) {
            Ok(_) => self.panel.input.clear(),
            Err(err) => {
                if err.downcast_ref::<TaskInputError>().is_none() {
                    warn!(error = %err, "failed to add task");
                }
                self.notify(format!("{err:#}"));
            }
        }
    }

    fn on_delete_task(&mut self, date_key: &str, id: i64) {
        if let Err(err) = self.store.delete_task(date_key, id) {
            warn!(error = %err, "failed to delete task");
            self.notify(format!("{err:#}"));
        }
        let count = self.store.tasks_for(date_key).len();
        self.panel.clamp_selection(count);
    }

    fn on_navigate(&mut self, navigation: Navigation) {
        match navigation {
            Navigation::Previous => self.cursor.prev_month(),
            Navigation::Next => self.cursor.next_month(),
        }
        self.focused_day = self.focused_day.min(self.cursor.day_count());
        debug!(year = self.cursor.year, month = self.cursor.month, "navigated");
    }
}
