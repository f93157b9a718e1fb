//! Application configuration, read from a RON file.
//!
//! A missing file means defaults. A malformed or invalid file is a setup fault
//! and stops the process before anything is fetched.

use std::fs;
use std::io;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveTime;
use serde::Deserialize;
use thiserror::Error;
use vacancy_core::{ExtractionProfile, Trigger};
use vacancy_engine::{
    FetchSettings, DEFAULT_DETAIL_CLASS, DEFAULT_FOOTER_CLASS, DEFAULT_LISTING_URL,
};

use crate::logging::LogDestination;

pub const CONFIG_ENV_VAR: &str = "VACANCY_CONFIG";
pub const DEFAULT_CONFIG_FILENAME: &str = "vacancy.ron";
const DAILY_TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid listing url {url:?}: {source}")]
    InvalidUrl { url: String, source: url::ParseError },
    #[error("trigger interval must be at least one minute")]
    ZeroInterval,
    #[error("daily trigger time {0:?} is not HH:MM")]
    InvalidDailyTime(String),
    #[error("poll interval must be non-zero")]
    ZeroPoll,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum TriggerConfig {
    EveryMinutes(u32),
    DailyAt(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub listing_url: String,
    pub log_file: PathBuf,
    pub log_destination: LogDestination,
    /// Overrides the profile's default output filename.
    pub output_file: Option<PathBuf>,
    pub detail_class: String,
    pub footer_class: String,
    pub trigger: TriggerConfig,
    pub poll_interval_ms: u64,
    pub request_timeout_secs: Option<u64>,
    pub max_bytes: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            log_file: PathBuf::from("logs").join("scraper.log"),
            log_destination: LogDestination::Both,
            output_file: None,
            detail_class: DEFAULT_DETAIL_CLASS.to_string(),
            footer_class: DEFAULT_FOOTER_CLASS.to_string(),
            trigger: TriggerConfig::EveryMinutes(1),
            poll_interval_ms: 1_000,
            request_timeout_secs: None,
            max_bytes: None,
        }
    }
}

impl AppConfig {
    /// Reads `$VACANCY_CONFIG`, falling back to `./vacancy.ron`.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILENAME));
        Self::load(&path)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_ron_str(&text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.listing_url).map_err(|source| ConfigError::InvalidUrl {
            url: self.listing_url.clone(),
            source,
        })?;
        self.trigger()?;
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPoll);
        }
        Ok(())
    }

    pub fn trigger(&self) -> Result<Trigger, ConfigError> {
        match &self.trigger {
            TriggerConfig::EveryMinutes(minutes) => NonZeroU32::new(*minutes)
                .map(Trigger::EveryMinutes)
                .ok_or(ConfigError::ZeroInterval),
            TriggerConfig::DailyAt(time) => NaiveTime::parse_from_str(time, DAILY_TIME_FORMAT)
                .map(Trigger::DailyAt)
                .map_err(|_| ConfigError::InvalidDailyTime(time.clone())),
        }
    }

    pub fn output_path(&self, profile: ExtractionProfile) -> PathBuf {
        self.output_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(profile.default_output_filename()))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
            max_bytes: self.max_bytes,
            ..FetchSettings::default()
        }
    }
}
