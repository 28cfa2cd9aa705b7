use crate::date::parse_date_key;
use crate::task::Task;
use anyhow::{anyhow, Context};
use chrono::{Local, NaiveDate};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Date key (`YYYY-MM-DD`) to tasks in insertion order.
pub type Assignments = BTreeMap<String, Vec<Task>>;

/// Input rejected before it reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskInputError {
    EmptyContent,
    NoDateSelected,
}

impl fmt::Display for TaskInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskInputError::EmptyContent => f.write_str("Please enter the assignment text."),
            TaskInputError::NoDateSelected => f.write_str("No date is selected."),
        }
    }
}

impl std::error::Error for TaskInputError {}

#[derive(Debug, Default)]
pub struct AssignmentStore {
    path: PathBuf,
    assignments: Assignments,
    last_id: i64,
}

impl AssignmentStore {
    /// Opens the store at `path`. A missing or unreadable file yields an
    /// empty store.
    #[tracing::instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let assignments = match fs::read_to_string(&path) {
            Ok(data) => match serde_json::from_str::<Assignments>(&data) {
                Ok(mut assignments) => {
                    assignments.retain(|_, tasks| !tasks.is_empty());
                    assignments
                }
                Err(err) => {
                    warn!(error = %err, "assignment file is not valid JSON; starting empty");
                    Assignments::new()
                }
            },
            Err(err) => {
                debug!(error = %err, "no assignment file; starting empty");
                Assignments::new()
            }
        };
        info!(dates = assignments.len(), "loaded assignments");
        let last_id = assignments.values().flatten().map(|t| t.id).max().unwrap_or(0);
        Self {
            path,
            assignments,
            last_id,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn assignments(&self) -> &Assignments {
        &self.assignments
    }

    /// Overwrites the file with the whole mapping.
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    pub fn save(&self) -> anyhow::Result<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

        let mut temp = NamedTempFile::new_in(dir)?;
        let serialized = serde_json::to_string_pretty(&self.assignments)?;
        temp.write_all(serialized.as_bytes())?;
        temp.flush()?;
        temp.persist(&self.path)
            .map_err(|err| anyhow!("failed to persist {}: {}", self.path.display(), err))?;

        debug!(dates = self.assignments.len(), "saved assignments");
        Ok(())
    }

    /// Appends a task to `date_key` and persists. Content is trimmed; an
    /// empty result is rejected with [`TaskInputError::EmptyContent`]. When
    /// the write fails the task is taken back out, so memory matches the file.
    #[tracing::instrument(skip(self, content))]
    pub fn add_task(&mut self, date_key: &str, content: &str) -> anyhow::Result<Task> {
        let content = content.trim();
        if content.is_empty() {
            return Err(TaskInputError::EmptyContent.into());
        }

        let task = Task::new(self.next_id(), content);
        self.assignments
            .entry(date_key.to_string())
            .or_default()
            .push(task.clone());

        if let Err(err) = self.save() {
            self.discard_last(date_key);
            return Err(err);
        }
        info!(id = task.id, "added task");
        Ok(task)
    }

    /// Removes the first task on `date_key` with `id`. Unknown pairs are
    /// ignored and nothing is written.
    #[tracing::instrument(skip(self))]
    pub fn delete_task(&mut self, date_key: &str, id: i64) -> anyhow::Result<()> {
        let Some(tasks) = self.assignments.get_mut(date_key) else {
            return Ok(());
        };
        let Some(idx) = tasks.iter().position(|t| t.id == id) else {
            return Ok(());
        };

        tasks.remove(idx);
        if tasks.is_empty() {
            self.assignments.remove(date_key);
        }
        info!("deleted task");

        self.save()
    }

    fn discard_last(&mut self, date_key: &str) {
        if let Some(tasks) = self.assignments.get_mut(date_key) {
            tasks.pop();
            if tasks.is_empty() {
                self.assignments.remove(date_key);
            }
        }
    }

    /// Creation time in milliseconds, bumped past the last id handed out so
    /// two adds within one millisecond stay distinct.
    fn next_id(&mut self) -> i64 {
        self.last_id = Local::now().timestamp_millis().max(self.last_id + 1);
        self.last_id
    }

    pub fn tasks_for(&self, date_key: &str) -> &[Task] {
        self.assignments
            .get(date_key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every task ascending by date. Keys that are not valid dates are
    /// skipped.
    pub fn all_tasks(&self) -> Vec<(NaiveDate, &Task)> {
        let mut out: Vec<(NaiveDate, &Task)> = self
            .assignments
            .iter()
            .filter_map(|(key, tasks)| parse_date_key(key).map(|date| (date, tasks)))
            .flat_map(|(date, tasks)| tasks.iter().map(move |t| (date, t)))
            .collect();
        out.sort_by_key(|(date, _)| *date);
        out
    }
}
