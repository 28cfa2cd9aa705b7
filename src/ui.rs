use crate::app::App;
use crate::calendar::{GridCell, WEEKDAY_HEADERS};
use crate::date;
use crate::panel::EMPTY_PLACEHOLDER;
use crossterm::event;
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;

const DELETE_LABEL: &str = "[del]";
const CLOSE_LABEL: &str = "[x]";

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        app.today = date::today();
        terminal.draw(|f| draw(f, app))?;

        app.handle_event(event::read()?);
        if app.should_quit {
            return Ok(());
        }
    }
}

pub fn draw(f: &mut Frame<'_>, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(7),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    draw_weekdays(f, chunks[1]);
    draw_grid(f, app, chunks[2]);

    let help = if app.panel.is_open() {
        "Enter add • ↑/↓ select • Del/Ctrl-d delete • Esc close"
    } else {
        "←↓↑→/hjkl move • [ ] month • Enter open • t today • q quit"
    };
    f.render_widget(
        Paragraph::new(Span::styled(help, Style::default().fg(Color::Gray))),
        chunks[3],
    );

    app.hits.overlay = None;
    app.hits.close = None;
    app.hits.deletes.clear();
    if app.panel.is_open() {
        draw_overlay(f, app);
    }
    if let Some(message) = &app.notification {
        draw_notification(f, message);
    }
}

fn draw_header(f: &mut Frame<'_>, app: &App, area: Rect) {
    let title = Line::from(vec![
        Span::styled("◀ [  ", Style::default().fg(Color::Gray)),
        Span::styled(
            app.cursor.label(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("  ] ▶", Style::default().fg(Color::Gray)),
    ]);
    let header = Paragraph::new(title)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn draw_weekdays(f: &mut Frame<'_>, area: Rect) {
    let columns = seven_columns(area);
    for (i, name) in WEEKDAY_HEADERS.iter().enumerate() {
        let style = match i {
            0 => Style::default().fg(Color::LightRed),
            6 => Style::default().fg(Color::LightBlue),
            _ => Style::default(),
        };
        f.render_widget(
            Paragraph::new(Span::styled(*name, style.add_modifier(Modifier::BOLD)))
                .alignment(Alignment::Center),
            columns[i],
        );
    }
}

fn draw_grid(f: &mut Frame<'_>, app: &mut App, area: Rect) {
    let grid = app.grid();
    let weeks = grid.weeks();
    let row_count = weeks.len().max(1) as u32;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            (0..row_count)
                .map(|_| Constraint::Ratio(1, row_count))
                .collect::<Vec<_>>(),
        )
        .split(area);

    app.hits.cells.clear();
    for (week, row_area) in weeks.iter().zip(rows.iter()) {
        let columns = seven_columns(*row_area);
        for (cell, cell_area) in week.iter().zip(columns.iter()) {
            let GridCell::Day(day) = cell else {
                continue;
            };
            // the grid only holds days of the cursor month, so the day number is enough
            let focused = day.day == app.focused_day;

            let mut border = Style::default();
            if day.today {
                border = border.fg(Color::Yellow);
            }
            if focused {
                border = border.fg(Color::Cyan).add_modifier(Modifier::BOLD);
            }

            let mut number = Style::default();
            if day.today {
                number = number.fg(Color::Yellow).add_modifier(Modifier::BOLD);
            }
            if focused {
                number = number.add_modifier(Modifier::REVERSED);
            }

            let mut lines = vec![Line::from(Span::styled(day.day.to_string(), number))];
            if let Some(summary) = &day.summary {
                lines.push(Line::from(Span::styled(
                    summary.as_str(),
                    Style::default().fg(Color::White),
                )));
            }

            let widget = Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).border_style(border));
            f.render_widget(widget, *cell_area);
            app.hits.cells.push((*cell_area, day.date));
        }
    }
}

fn draw_overlay(f: &mut Frame<'_>, app: &mut App) {
    let area = centered_rect(60, 60, f.area());
    app.hits.overlay = Some(area);
    app.hits.deletes.clear();

    let block = Block::default()
        .title(Span::styled(
            app.panel.title(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(Clear, area);
    f.render_widget(block, area);

    app.hits.close = None;
    if area.width >= CLOSE_LABEL.len() as u16 + 4 {
        let close = Rect::new(
            area.right() - CLOSE_LABEL.len() as u16 - 1,
            area.y,
            CLOSE_LABEL.len() as u16,
            1,
        );
        f.render_widget(
            Paragraph::new(Span::styled(
                CLOSE_LABEL,
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::BOLD),
            )),
            close,
        );
        app.hits.close = Some(close);
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(3), Constraint::Min(1)])
        .split(inner);

    let input = Paragraph::new(app.panel.input.as_str())
        .block(Block::default().title("New assignment").borders(Borders::ALL));
    f.render_widget(input, chunks[0]);
    let typed = u16::try_from(app.panel.input.chars().count()).unwrap_or(u16::MAX);
    let cursor_x = chunks[0].x.saturating_add(1).saturating_add(typed);
    f.set_cursor_position(Position::new(
        cursor_x.min(chunks[0].right().saturating_sub(2)),
        chunks[0].y + 1,
    ));

    let rows = app.panel.rows(&app.store, app.today);
    if rows.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled(
                EMPTY_PLACEHOLDER,
                Style::default().fg(Color::Gray),
            )),
            chunks[1],
        );
        return;
    }

    // Scroll so the highlighted row stays visible.
    let list_area = chunks[1];
    if list_area.height == 0 {
        return;
    }
    let height = usize::from(list_area.height);
    let offset = app.panel.selected.saturating_sub(height - 1);

    for (i, row) in rows.iter().enumerate().skip(offset).take(height) {
        let y = list_area.y + (i - offset) as u16;
        let line_area = Rect::new(list_area.x, y, list_area.width, 1);
        let parts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(DELETE_LABEL.len() as u16 + 1),
            ])
            .split(line_area);

        let selected = i == app.panel.selected;
        let marker = if selected { "> " } else { "  " };
        let mut text_style = Style::default().fg(Color::White);
        if selected {
            text_style = text_style.add_modifier(Modifier::REVERSED);
        }
        let line = Line::from(vec![
            Span::raw(marker),
            Span::styled(row.content.as_str(), text_style),
            Span::raw("  "),
            Span::styled(
                row.countdown.as_str(),
                Style::default()
                    .fg(Color::LightMagenta)
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        f.render_widget(Paragraph::new(line), parts[0]);

        let delete =
            Rect::new(parts[1].x + 1, y, DELETE_LABEL.len() as u16, 1).intersection(parts[1]);
        f.render_widget(
            Paragraph::new(Span::styled(DELETE_LABEL, Style::default().fg(Color::LightRed))),
            delete,
        );
        app.hits.deletes.push((delete, row.id));
    }
}

fn draw_notification(f: &mut Frame<'_>, message: &str) {
    let area = centered_rect(50, 20, f.area());
    let body = vec![
        Line::from(Span::styled(
            message,
            Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Press any key to continue"),
    ];
    let dialog = Paragraph::new(body)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::LightRed)),
        );
    f.render_widget(Clear, area);
    f.render_widget(dialog, area);
}

fn seven_columns(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints((0..7).map(|_| Constraint::Ratio(1, 7)).collect::<Vec<_>>())
        .split(area)
        .to_vec()
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::CalendarHandler;
    use crate::assignment_store::AssignmentStore;
    use crate::calendar::CalendarCursor;
    use chrono::NaiveDate;
    use crossterm::event::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
    use ratatui::backend::TestBackend;
    use tempfile::TempDir;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn render(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).expect("terminal");
        terminal.draw(|f| draw(f, app)).expect("draw");
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app_in(dir: &TempDir) -> App {
        let store = AssignmentStore::load(dir.path().join("assignments.json"));
        App::new(store, CalendarCursor::new(2025, 1), ymd(2025, 1, 10))
    }

    #[test]
    fn grid_shows_month_label_weekdays_and_summary() {
        let dir = TempDir::new().expect("tempdir");
        let mut app = app_in(&dir);
        app.store.add_task("2025-01-20", "Essay").expect("add");

        let screen = render(&mut app);
        assert!(screen.contains("January 2025"));
        assert!(screen.contains("Wed"));
        assert!(screen.contains("Essay"));
        assert_eq!(app.hits.cells.len(), 31);
        assert!(app.hits.overlay.is_none());
    }

    #[test]
    fn first_cell_sits_under_wednesday() {
        let dir = TempDir::new().expect("tempdir");
        let mut app = app_in(&dir);
        render(&mut app);
        let area_of = |day: u32| {
            app.hits
                .cells
                .iter()
                .find(|(_, date)| *date == ymd(2025, 1, day))
                .map(|(area, _)| *area)
                .expect("cell drawn")
        };
        assert_eq!(app.hits.cells[0].1, ymd(2025, 1, 1));
        assert_eq!(area_of(1).x, area_of(8).x);
        assert_eq!(area_of(5).x, 0);
        assert!(area_of(1).x > area_of(7).x);
    }

    #[test]
    fn overlay_shows_placeholder_then_rows() {
        let dir = TempDir::new().expect("tempdir");
        let mut app = app_in(&dir);
        app.on_cell_click(ymd(2025, 1, 13));
        let screen = render(&mut app);
        assert!(screen.contains("2025-01-13 assignments"));
        assert!(screen.contains(EMPTY_PLACEHOLDER));
        assert!(app.hits.overlay.is_some());

        app.panel.input = "Science fair".into();
        app.on_add_task();
        let screen = render(&mut app);
        assert!(screen.contains("Science fair"));
        assert!(screen.contains("D-3"));
    }

    fn left_click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn clicking_drawn_delete_control_removes_the_row() {
        let dir = TempDir::new().expect("tempdir");
        let mut app = app_in(&dir);
        app.store.add_task("2025-01-13", "Keep").expect("add");
        app.store.add_task("2025-01-13", "Drop").expect("add");
        app.on_cell_click(ymd(2025, 1, 13));
        let screen = render(&mut app);
        assert!(screen.contains("[del]"));
        assert_eq!(app.hits.deletes.len(), 2);

        let (area, id) = app.hits.deletes[1];
        assert_eq!(id, app.store.tasks_for("2025-01-13")[1].id);
        app.handle_mouse(left_click(area.x + 1, area.y));

        let left: Vec<&str> = app
            .store
            .tasks_for("2025-01-13")
            .iter()
            .map(|t| t.content.as_str())
            .collect();
        assert_eq!(left, ["Keep"]);
        assert!(app.panel.is_open());

        render(&mut app);
        assert_eq!(app.hits.deletes.len(), 1);
    }

    #[test]
    fn clicking_drawn_close_control_hides_overlay() {
        let dir = TempDir::new().expect("tempdir");
        let mut app = app_in(&dir);
        app.on_cell_click(ymd(2025, 1, 13));
        let screen = render(&mut app);
        assert!(screen.contains("[x]"));

        let close = app.hits.close.expect("close control drawn");
        assert!(app.hits.overlay.is_some_and(|o| o.contains(Position::new(close.x, close.y))));
        app.handle_mouse(left_click(close.x, close.y));
        assert!(!app.panel.is_open());

        render(&mut app);
        assert!(app.hits.close.is_none());
        assert!(app.hits.deletes.is_empty());
    }

    #[test]
    fn huge_input_does_not_overflow_cursor() {
        let dir = TempDir::new().expect("tempdir");
        let mut app = app_in(&dir);
        app.on_cell_click(ymd(2025, 1, 13));
        app.panel.input = "x".repeat(70_000);
        render(&mut app);
    }

    #[test]
    fn notification_is_drawn_on_top() {
        let dir = TempDir::new().expect("tempdir");
        let mut app = app_in(&dir);
        app.notify("No date is selected.");
        let screen = render(&mut app);
        assert!(screen.contains("No date is selected."));
    }
}
