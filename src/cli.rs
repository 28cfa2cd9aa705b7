use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::date::parse_date_key;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "ddaycal",
    version,
    about = "Assignment calendar with D-day countdowns"
)]
pub struct Cli {
    #[arg(short = 'c', long = "config", help = "path to config file")]
    pub config: Option<PathBuf>,

    #[arg(long = "data", help = "path to the assignments file")]
    pub data: Option<PathBuf>,

    #[arg(long = "month", value_name = "YYYY-MM|today", help = "month to show first")]
    pub month: Option<String>,

    #[arg(long = "log-file", help = "write logs to this file")]
    pub log_file: Option<PathBuf>,

    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add an assignment to a date
    Add {
        #[arg(value_parser = parse_date_arg)]
        date: NaiveDate,
        #[arg(required = true, num_args = 1..)]
        content: Vec<String>,
    },
    /// List every assignment ordered by date
    List,
    /// Delete an assignment by date and id
    Delete {
        #[arg(value_parser = parse_date_arg)]
        date: NaiveDate,
        id: i64,
    },
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date_key(s).ok_or_else(|| format!("expected YYYY-MM-DD, got: {s}"))
}

fn default_level(verbose: u8, quiet: u8) -> &'static str {
    if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
    Off,
}

/// Installs the global subscriber. The interactive calendar owns the
/// terminal, so it logs to a file or not at all.
pub fn init_tracing(verbose: u8, quiet: u8, target: LogTarget<'_>) -> anyhow::Result<()> {
    let env_filter = match target {
        LogTarget::Off => EnvFilter::new("off"),
        _ => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_level(verbose, quiet)))
            .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true);

    let init_result = match target {
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        LogTarget::Stderr | LogTarget::Off => builder
            .with_ansi(std::io::stderr().is_terminal())
            .with_writer(std::io::stderr)
            .try_init(),
    };

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_interactive() {
        let cli = Cli::parse_from(["ddaycal", "--month", "2024-12"]);
        assert_eq!(cli.command, None);
        assert_eq!(cli.month.as_deref(), Some("2024-12"));
    }

    #[test]
    fn add_joins_content_words() {
        let cli = Cli::parse_from(["ddaycal", "add", "2025-01-20", "Lab", "report"]);
        assert_eq!(
            cli.command,
            Some(Command::Add {
                date: NaiveDate::from_ymd_opt(2025, 1, 20).expect("valid date"),
                content: vec!["Lab".into(), "report".into()],
            })
        );
    }

    #[test]
    fn bad_dates_are_rejected() {
        assert!(Cli::try_parse_from(["ddaycal", "add", "20-01-2025", "x"]).is_err());
        assert!(Cli::try_parse_from(["ddaycal", "delete", "2025-02-31", "1"]).is_err());
    }

    #[test]
    fn verbosity_levels() {
        assert_eq!(default_level(0, 0), "warn");
        assert_eq!(default_level(2, 0), "debug");
        assert_eq!(default_level(3, 0), "trace");
        assert_eq!(default_level(3, 2), "error");
    }
}
