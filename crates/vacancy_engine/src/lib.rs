//! Vacancy engine: fetch, extract, persist and schedule.
mod decode;
mod extract;
mod fetch;
mod persist;
mod pipeline;
mod scheduler;
mod sink;
mod table;
mod types;

pub use decode::{decode_html, DecodedHtml};
pub use extract::{
    ExtractError, Extractor, ListingExtractor, ListingSelectors, DEFAULT_DETAIL_CLASS,
    DEFAULT_FOOTER_CLASS,
};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use pipeline::Pipeline;
pub use scheduler::Scheduler;
pub use sink::{EventSink, LogEventSink};
pub use table::{coerce_expiry_date, CsvTableWriter, TableError, WriteSummary, DATE_FORMATS};
pub use types::{
    FailureKind, FetchError, FetchedPage, PipelineEvent, RunOutcome, DEFAULT_LISTING_URL,
};
