//! Vacancy core: job record model, text heuristics and schedule state machine.
mod heuristics;
mod profile;
mod record;
mod schedule;
mod strategy;

pub use heuristics::{
    collapse_whitespace, infer_location, scan_expiry_token, truncate_chars, EXPIRY_KEYWORDS,
    TITLE_FALLBACK_CHARS,
};
pub use profile::{Column, ExtractionProfile};
pub use record::{JobRecord, Location};
pub use schedule::{Schedule, Trigger};
pub use strategy::{first_success, Strategy};
