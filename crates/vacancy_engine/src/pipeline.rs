use std::sync::Arc;

use crate::{CsvTableWriter, EventSink, Extractor, Fetcher, PipelineEvent, RunOutcome};

/// Fetch -> extract -> write, each stage short-circuiting the next.
///
/// Every expected failure is reported through the sink and returned as a
/// [`RunOutcome`]; nothing escapes `run_once`.
pub struct Pipeline {
    url: String,
    fetcher: Box<dyn Fetcher>,
    extractor: Box<dyn Extractor>,
    writer: CsvTableWriter,
    sink: Arc<dyn EventSink>,
}

impl Pipeline {
    pub fn new(
        url: impl Into<String>,
        fetcher: Box<dyn Fetcher>,
        extractor: Box<dyn Extractor>,
        writer: CsvTableWriter,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            url: url.into(),
            fetcher,
            extractor,
            writer,
            sink,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn writer(&self) -> &CsvTableWriter {
        &self.writer
    }

    pub async fn run_once(&self) -> RunOutcome {
        let page = match self.fetcher.fetch(&self.url).await {
            Ok(page) => page,
            Err(error) => {
                self.sink.emit(PipelineEvent::FetchFailed {
                    url: self.url.clone(),
                    error: error.clone(),
                });
                return RunOutcome::FetchFailed(error);
            }
        };

        self.sink.emit(PipelineEvent::Fetched {
            url: page.final_url.clone(),
            encoding: page.encoding.clone(),
            replaced_malformed: page.replaced_malformed,
        });

        let records = self.extractor.extract(&page.html);
        self.sink.emit(PipelineEvent::Parsed {
            count: records.len(),
        });
        for record in &records {
            self.sink.emit(PipelineEvent::RecordParsed(record.clone()));
        }

        match self.writer.write(&records) {
            Ok(None) => {
                self.sink.emit(PipelineEvent::NothingToSave);
                RunOutcome::NothingToSave
            }
            Ok(Some(summary)) => {
                self.sink.emit(PipelineEvent::Saved {
                    rows: summary.rows_written,
                    duplicates_removed: summary.duplicates_removed,
                    path: summary.path.clone(),
                });
                RunOutcome::Saved(summary)
            }
            Err(err) => {
                let message = err.to_string();
                self.sink.emit(PipelineEvent::SaveFailed {
                    message: message.clone(),
                });
                RunOutcome::SaveFailed(message)
            }
        }
    }
}
