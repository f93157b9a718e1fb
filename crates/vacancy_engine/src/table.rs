use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use vacancy_core::{Column, ExtractionProfile, JobRecord, Location};

use crate::persist::{AtomicFileWriter, PersistError};

/// Formats tried, in order, when turning an expiry token into a date.
/// Month-first wins over day-first for ambiguous slash dates.
pub const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%d-%B-%Y",
];

const UNKNOWN_LOCATION: &str = "Unknown";
const CELL_DATE_FORMAT: &str = "%Y-%m-%d";

/// Unparseable tokens become `None`; they never fail the write.
pub fn coerce_expiry_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    pub rows_written: usize,
    pub duplicates_removed: usize,
    pub path: PathBuf,
}

/// A record after date coercion; the unit of deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TableRow<'r> {
    title: &'r str,
    company: &'r str,
    location: Option<Location>,
    expiry: Option<NaiveDate>,
    description: &'r str,
    job_url: Option<&'r str>,
}

impl<'r> TableRow<'r> {
    fn from_record(record: &'r JobRecord) -> Self {
        Self {
            title: &record.title,
            company: &record.company,
            location: record.location,
            expiry: record.expiry.as_deref().and_then(coerce_expiry_date),
            description: &record.description,
            job_url: record.job_url.as_deref(),
        }
    }

    fn cell(&self, column: Column) -> String {
        match column {
            Column::JobTitle => self.title.to_string(),
            Column::Company => self.company.to_string(),
            Column::Location => self
                .location
                .map_or(UNKNOWN_LOCATION, Location::name)
                .to_string(),
            Column::ExpiryDate => self
                .expiry
                .map(|date| date.format(CELL_DATE_FORMAT).to_string())
                .unwrap_or_default(),
            Column::Description => self.description.to_string(),
            Column::JobUrl => self.job_url.unwrap_or_default().to_string(),
        }
    }
}

/// Comma-delimited table with a header row, fully replaced on every write.
#[derive(Debug, Clone)]
pub struct CsvTableWriter {
    profile: ExtractionProfile,
    path: PathBuf,
}

impl CsvTableWriter {
    pub fn new(profile: ExtractionProfile, path: impl Into<PathBuf>) -> Self {
        Self {
            profile,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` for an empty batch: nothing is written and the file is left alone.
    pub fn write(&self, records: &[JobRecord]) -> Result<Option<WriteSummary>, TableError> {
        if records.is_empty() {
            return Ok(None);
        }

        let rows = dedupe(records.iter().map(TableRow::from_record));
        let content = self.render(&rows)?;
        let path = AtomicFileWriter::for_target(&self.path)?.write(&content)?;

        Ok(Some(WriteSummary {
            rows_written: rows.len(),
            duplicates_removed: records.len() - rows.len(),
            path,
        }))
    }

    fn render(&self, rows: &[TableRow<'_>]) -> Result<Vec<u8>, TableError> {
        let columns = self.profile.columns();
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(columns.iter().map(|column| column.header()))?;
        for row in rows {
            writer.write_record(columns.iter().map(|&column| row.cell(column)))?;
        }
        writer
            .into_inner()
            .map_err(|err| TableError::Io(err.into_error()))
    }
}

/// Keeps the first occurrence of every row, preserving order.
fn dedupe<'r>(rows: impl Iterator<Item = TableRow<'r>>) -> Vec<TableRow<'r>> {
    let mut seen = HashSet::new();
    rows.filter(|row| seen.insert(row.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slash_dates_prefer_month_first() {
        assert_eq!(
            coerce_expiry_date("01/10/2025"),
            NaiveDate::from_ymd_opt(2025, 1, 10)
        );
        assert_eq!(
            coerce_expiry_date("25/10/2025"),
            NaiveDate::from_ymd_opt(2025, 10, 25)
        );
    }

    #[test]
    fn invalid_calendar_dates_are_rejected() {
        assert_eq!(coerce_expiry_date("2025-13-45"), None);
        assert_eq!(coerce_expiry_date("10th."), None);
        assert_eq!(coerce_expiry_date(""), None);
    }

    #[test]
    fn named_months_are_accepted() {
        assert_eq!(
            coerce_expiry_date("31-Jan-2025"),
            NaiveDate::from_ymd_opt(2025, 1, 31)
        );
        assert_eq!(
            coerce_expiry_date("31-January-2025"),
            NaiveDate::from_ymd_opt(2025, 1, 31)
        );
    }

    #[test]
    fn rows_differing_only_by_unparseable_expiry_collapse() {
        let a = JobRecord {
            title: "T".into(),
            expiry: Some("soon".into()),
            ..JobRecord::default()
        };
        let b = JobRecord {
            expiry: Some("later".into()),
            ..a.clone()
        };
        let rows = dedupe([&a, &b].into_iter().map(TableRow::from_record));
        assert_eq!(rows.len(), 1);
    }
}
