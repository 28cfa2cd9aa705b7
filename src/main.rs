use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ddaycal::{
    app::App,
    assignment_store::AssignmentStore,
    cli::{self, Cli, LogTarget},
    commands,
    config::Config,
    date, ui,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing::info;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let log_file = cli.log_file.as_deref().or(config.log_file.as_deref());
    let target = match (log_file, &cli.command) {
        (Some(path), _) => LogTarget::File(path),
        (None, Some(_)) => LogTarget::Stderr,
        (None, None) => LogTarget::Off,
    };
    cli::init_tracing(cli.verbose, cli.quiet, target)?;

    let today = date::today();
    let data_file = config.data_file(cli.data.as_deref())?;
    let mut store = AssignmentStore::load(&data_file);

    match cli.command {
        Some(command) => commands::dispatch(&mut store, command, today, &mut io::stdout()),
        None => {
            let cursor = config.start_cursor(cli.month.as_deref(), today)?;
            info!(data_file = %data_file.display(), year = cursor.year, month = cursor.month, "starting calendar");
            let mut app = App::new(store, cursor, today);
            run_terminal(&mut app)
        }
    }
}

fn run_terminal(app: &mut App) -> anyhow::Result<()> {
    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = ui::run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result.context("calendar event loop failed")
}
