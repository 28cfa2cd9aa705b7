//! Non-interactive subcommands.

use std::io::Write;

use anyhow::Context;
use chrono::NaiveDate;
use tracing::info;

use crate::assignment_store::AssignmentStore;
use crate::cli::Command;
use crate::date::{compute_countdown, format_date};

#[tracing::instrument(skip(store, out))]
pub fn dispatch<W: Write>(
    store: &mut AssignmentStore,
    command: Command,
    today: NaiveDate,
    out: &mut W,
) -> anyhow::Result<()> {
    match command {
        Command::Add { date, content } => {
            let key = format_date(&date);
            let task = store
                .add_task(&key, &content.join(" "))
                .context("failed to add assignment")?;
            writeln!(
                out,
                "[#{}] {} {} ({})",
                task.id,
                key,
                task.content,
                compute_countdown(&date, &today)
            )?;
        }
        Command::List => {
            let tasks = store.all_tasks();
            if tasks.is_empty() {
                writeln!(out, "No assignments.")?;
            }
            for (date, task) in tasks {
                writeln!(
                    out,
                    "{}  {:<7} [#{}] {}",
                    format_date(&date),
                    compute_countdown(&date, &today),
                    task.id,
                    task.content
                )?;
            }
        }
        Command::Delete { date, id } => {
            let key = format_date(&date);
            store
                .delete_task(&key, id)
                .context("failed to delete assignment")?;
            info!(%key, id, "delete requested");
        }
    }
    Ok(())
}
