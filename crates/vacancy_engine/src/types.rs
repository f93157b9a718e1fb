use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use log::Level;
use vacancy_core::JobRecord;

use crate::WriteSummary;

pub const DEFAULT_LISTING_URL: &str = "https://vacancymail.co.zw/jobs/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub html: String,
    /// Address after redirects.
    pub final_url: String,
    pub encoding: String,
    pub replaced_malformed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// What happened to one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    FetchFailed(FetchError),
    NothingToSave,
    Saved(WriteSummary),
    SaveFailed(String),
}

/// Everything the pipeline and scheduler report; routed through an [`crate::EventSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    Waiting { next_due: NaiveDateTime },
    RunStarted,
    Fetched {
        url: String,
        encoding: String,
        replaced_malformed: bool,
    },
    FetchFailed { url: String, error: FetchError },
    Parsed { count: usize },
    RecordParsed(JobRecord),
    NothingToSave,
    Saved {
        rows: usize,
        duplicates_removed: usize,
        path: PathBuf,
    },
    SaveFailed { message: String },
    TicksSkipped { count: u32 },
    Stopped { runs: usize },
}

impl PipelineEvent {
    pub fn level(&self) -> Level {
        match self {
            PipelineEvent::FetchFailed { .. } | PipelineEvent::SaveFailed { .. } => Level::Error,
            PipelineEvent::NothingToSave | PipelineEvent::TicksSkipped { .. } => Level::Warn,
            PipelineEvent::Fetched {
                replaced_malformed: true,
                ..
            } => Level::Warn,
            PipelineEvent::Fetched { .. } => Level::Debug,
            PipelineEvent::Waiting { .. }
            | PipelineEvent::RunStarted
            | PipelineEvent::Parsed { .. }
            | PipelineEvent::RecordParsed(_)
            | PipelineEvent::Saved { .. }
            | PipelineEvent::Stopped { .. } => Level::Info,
        }
    }
}

impl fmt::Display for PipelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineEvent::Waiting { next_due } => write!(
                f,
                "Waiting for scheduled jobs, next run at {next_due} (Press Ctrl + C to stop)"
            ),
            PipelineEvent::RunStarted => write!(f, "Scheduled job started."),
            PipelineEvent::Fetched {
                url,
                encoding,
                replaced_malformed,
            } => {
                write!(f, "Fetched {url} as {encoding}")?;
                if *replaced_malformed {
                    write!(f, " (malformed bytes replaced)")?;
                }
                Ok(())
            }
            PipelineEvent::FetchFailed { url, error } => {
                write!(f, "Failed to fetch jobs page {url}: {error}")
            }
            PipelineEvent::Parsed { count } => write!(f, "Parsed {count} job posts."),
            PipelineEvent::RecordParsed(record) => write!(
                f,
                "title={:?} company={:?} location={:?} expiry={:?} url={:?}",
                record.title, record.company, record.location, record.expiry, record.job_url
            ),
            PipelineEvent::NothingToSave => write!(f, "No job data to save."),
            PipelineEvent::Saved {
                rows,
                duplicates_removed,
                path,
            } => write!(
                f,
                "Saved {rows} job posts to {} ({duplicates_removed} duplicates removed)",
                path.display()
            ),
            PipelineEvent::SaveFailed { message } => write!(f, "Error saving to CSV: {message}"),
            PipelineEvent::TicksSkipped { count } => {
                write!(f, "Skipped {count} scheduled runs that fell due during the last run")
            }
            PipelineEvent::Stopped { runs } => write!(f, "Scheduler stopped after {runs} runs"),
        }
    }
}
