use crate::domain::{CalendarOptions, DEFAULT_HEADER_FORMAT, MAX_PAGE_YEAR_SPAN, ScopeMetrics};
use anyhow::{Context, Result, bail};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tunables read from `settings.json`; every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    pub first_weekday: String,
    pub page_year_span: i32,
    pub row_height: f32,
    pub weekday_height: f32,
    pub drag_commit_threshold: f32,
    pub drag_debounce_ms: u64,
    pub header_format: String,
    pub theme: String,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            first_weekday: "sunday".to_string(),
            page_year_span: 10,
            row_height: 60.0,
            weekday_height: 36.0,
            drag_commit_threshold: 0.5,
            drag_debounce_ms: 100,
            header_format: DEFAULT_HEADER_FORMAT.to_string(),
            theme: "dark".to_string(),
        }
    }
}

impl CalendarSettings {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid settings in {}", path.display()))
    }

    pub fn to_options(&self) -> Result<CalendarOptions> {
        let first_weekday: Weekday = self
            .first_weekday
            .parse()
            .map_err(|_| anyhow::anyhow!("Unknown weekday '{}'", self.first_weekday))?;
        if !(0..=MAX_PAGE_YEAR_SPAN).contains(&self.page_year_span) {
            bail!(
                "page_year_span must be between 0 and {}, got {}",
                MAX_PAGE_YEAR_SPAN,
                self.page_year_span
            );
        }

        Ok(CalendarOptions {
            first_weekday,
            page_year_span: self.page_year_span,
            metrics: ScopeMetrics {
                row_height: self.row_height,
                weekday_height: self.weekday_height,
            },
            drag_commit_threshold: self.drag_commit_threshold.clamp(0.0, 1.0),
            drag_debounce_ms: self.drag_debounce_ms,
        })
    }
}

pub struct Config {
    pub data_dir: PathBuf,
    pub events_file: PathBuf,
    pub log_file: PathBuf,
    pub settings: CalendarSettings,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let data_dir = std::env::var("SCOPECAL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::data_local_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("scopecal")
            });

        let events_file = std::env::var("SCOPECAL_EVENTS")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("events.json"));

        Self::in_dir(data_dir, events_file)
    }

    pub fn in_dir(data_dir: PathBuf, events_file: PathBuf) -> Result<Self> {
        let settings = CalendarSettings::load(&data_dir.join("settings.json"))?;
        let log_file = data_dir.join("scopecal.log");

        Ok(Self {
            data_dir,
            events_file,
            log_file,
            settings,
        })
    }
}
