use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info};

use crate::calendar::CalendarCursor;

const CONFIG_PATH_ENV_VAR: &str = "DDAYCAL_CONFIG";
const APP_DIR: &str = "ddaycal";
const DATA_FILE: &str = "assignments.json";

/// Month shown when neither the config nor `--month` picks one.
pub const DEFAULT_START: CalendarCursor = CalendarCursor {
    year: 2025,
    month: 1,
};

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub data_file: Option<PathBuf>,
    /// `"today"` or `"YYYY-MM"`.
    pub start: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Reads `path`, or the first default location that exists. No file at
    /// all gives the defaults; a file that fails to parse is an error.
    #[tracing::instrument]
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(),
        };
        let Some(path) = path else {
            debug!("no config file; using defaults");
            return Ok(Config::default());
        };

        info!(config = %path.display(), "loading config");
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Config::parse(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn data_file(&self, override_path: Option<&Path>) -> anyhow::Result<PathBuf> {
        if let Some(p) = override_path.or(self.data_file.as_deref()) {
            return Ok(p.to_path_buf());
        }
        let base = dirs::data_dir().ok_or_else(|| anyhow!("unable to find data directory"))?;
        Ok(base.join(APP_DIR).join(DATA_FILE))
    }

    pub fn start_cursor(
        &self,
        override_start: Option<&str>,
        today: NaiveDate,
    ) -> anyhow::Result<CalendarCursor> {
        match override_start.or(self.start.as_deref()) {
            Some(value) => parse_start(value, today),
            None => Ok(DEFAULT_START),
        }
    }
}

/// Parses `"today"` or `"YYYY-MM"`.
pub fn parse_start(value: &str, today: NaiveDate) -> anyhow::Result<CalendarCursor> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("today") {
        return Ok(CalendarCursor::containing(today));
    }
    let first = NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d")
        .map_err(|_| anyhow!("expected \"today\" or YYYY-MM, got: {value}"))?;
    Ok(CalendarCursor::containing(first))
}

fn find_config_file() -> Option<PathBuf> {
    let mut locations = Vec::new();
    if let Ok(path) = env::var(CONFIG_PATH_ENV_VAR) {
        locations.push(PathBuf::from(path));
    }
    if let Some(dir) = dirs::config_dir() {
        locations.push(dir.join(APP_DIR).join("config.toml"));
    }
    locations.into_iter().find(|p| p.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn parses_all_fields() {
        let cfg = Config::parse(
            r#"
            data_file = "/tmp/a.json"
            start = "2024-09"
            log_file = "/tmp/ddaycal.log"
            "#,
        )
        .expect("parse");
        assert_eq!(cfg.data_file, Some(PathBuf::from("/tmp/a.json")));
        assert_eq!(cfg.start.as_deref(), Some("2024-09"));
        assert_eq!(cfg.log_file, Some(PathBuf::from("/tmp/ddaycal.log")));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::parse("colour = \"blue\"").is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = TempDir::new().expect("tempdir");
        assert!(Config::load(Some(dir.path().join("nope.toml").as_path())).is_err());
    }

    #[test]
    fn loads_explicit_file() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "start = \"today\"\n").expect("write");
        let cfg = Config::load(Some(path.as_path())).expect("load");
        assert_eq!(
            cfg.start_cursor(None, ymd(2026, 3, 14)).expect("start"),
            CalendarCursor::new(2026, 3)
        );
    }

    #[test]
    fn start_defaults_to_january_2025() {
        let cfg = Config::default();
        assert_eq!(
            cfg.start_cursor(None, ymd(2030, 6, 1)).expect("start"),
            CalendarCursor::new(2025, 1)
        );
    }

    #[test]
    fn override_beats_config() {
        let cfg = Config {
            start: Some("2024-02".into()),
            data_file: Some(PathBuf::from("from-config.json")),
            ..Config::default()
        };
        assert_eq!(
            cfg.start_cursor(Some("2023-11"), ymd(2025, 1, 1)).expect("start"),
            CalendarCursor::new(2023, 11)
        );
        assert_eq!(
            cfg.data_file(Some(Path::new("flag.json"))).expect("path"),
            PathBuf::from("flag.json")
        );
        assert_eq!(
            cfg.data_file(None).expect("path"),
            PathBuf::from("from-config.json")
        );
    }

    #[test]
    fn bad_start_is_an_error() {
        assert!(parse_start("2024-13", ymd(2025, 1, 1)).is_err());
        assert!(parse_start("soon", ymd(2025, 1, 1)).is_err());
    }
}
