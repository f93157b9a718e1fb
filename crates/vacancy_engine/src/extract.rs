use scraper::{ElementRef, Html, Selector};
use vacancy_core::{
    collapse_whitespace, first_success, infer_location, scan_expiry_token, truncate_chars,
    ExtractionProfile, JobRecord, Strategy, TITLE_FALLBACK_CHARS,
};

pub const DEFAULT_DETAIL_CLASS: &str = "job-listing-details";
pub const DEFAULT_FOOTER_CLASS: &str = "job-listing-footer";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("class name {0:?} must be a single non-empty token")]
    InvalidClass(String),
    #[error("invalid selector {selector:?}: {message}")]
    InvalidSelector { selector: String, message: String },
}

pub trait Extractor: Send + Sync {
    /// Never fails: missing sub-elements degrade to fallback values.
    fn extract(&self, html: &str) -> Vec<JobRecord>;
}

#[derive(Debug, Clone)]
pub struct ListingSelectors {
    detail: Selector,
    footer: Selector,
    heading: Selector,
    company: Selector,
    link: Selector,
}

impl ListingSelectors {
    pub fn new(detail_class: &str, footer_class: &str) -> Result<Self, ExtractError> {
        Ok(Self {
            detail: div_with_class(detail_class)?,
            footer: div_with_class(footer_class)?,
            heading: parse_selector("h4")?,
            company: parse_selector("span")?,
            link: parse_selector("a")?,
        })
    }

    pub fn with_default_classes() -> Result<Self, ExtractError> {
        Self::new(DEFAULT_DETAIL_CLASS, DEFAULT_FOOTER_CLASS)
    }
}

fn div_with_class(class: &str) -> Result<Selector, ExtractError> {
    if class.is_empty() || class.chars().any(|c| c.is_whitespace() || c == '.') {
        return Err(ExtractError::InvalidClass(class.to_string()));
    }
    parse_selector(&format!("div.{class}"))
}

fn parse_selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|err| ExtractError::InvalidSelector {
        selector: css.to_string(),
        message: err.to_string(),
    })
}

/// Listing-page extractor.
///
/// Each detail block becomes one record. With [`ExtractionProfile::Detailed`]
/// the i-th detail block is paired with the i-th footer block and blocks beyond
/// the shorter of the two lists are dropped.
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    profile: ExtractionProfile,
    selectors: ListingSelectors,
}

impl ListingExtractor {
    pub fn new(profile: ExtractionProfile, selectors: ListingSelectors) -> Self {
        Self { profile, selectors }
    }

    pub fn profile(&self) -> ExtractionProfile {
        self.profile
    }

    fn detail_record<'a>(&self, block: ElementRef<'a>) -> JobRecord {
        let block_text = visible_text(block);

        let heading = |b: &ElementRef<'a>| first_text(b, &self.selectors.heading);
        let snippet =
            |_: &ElementRef<'a>| Some(truncate_chars(&block_text, TITLE_FALLBACK_CHARS));
        let span = |b: &ElementRef<'a>| first_text(b, &self.selectors.company);
        let anchor_href = |b: &ElementRef<'a>| {
            b.select(&self.selectors.link)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(ToOwned::to_owned)
        };

        let title: [Strategy<'_, ElementRef<'a>, String>; 2] = [&heading, &snippet];
        let company: [Strategy<'_, ElementRef<'a>, String>; 1] = [&span];
        let job_url: [Strategy<'_, ElementRef<'a>, String>; 1] = [&anchor_href];

        JobRecord {
            title: first_success(&block, &title).unwrap_or_default(),
            company: first_success(&block, &company).unwrap_or_default(),
            location: None,
            expiry: None,
            job_url: first_success(&block, &job_url),
            description: block_text.clone(),
        }
    }
}

impl Extractor for ListingExtractor {
    fn extract(&self, html: &str) -> Vec<JobRecord> {
        let doc = Html::parse_document(html);
        let details = doc.select(&self.selectors.detail);

        if !self.profile.reads_footers() {
            return details.map(|block| self.detail_record(block)).collect();
        }

        details
            .zip(doc.select(&self.selectors.footer))
            .map(|(detail, footer)| {
                let footer_text = visible_text(footer);
                JobRecord {
                    location: infer_location(&footer_text),
                    expiry: scan_expiry_token(&footer_text),
                    ..self.detail_record(detail)
                }
            })
            .collect()
    }
}

/// Text of the first match, inline markup concatenated as written.
fn first_text(element: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(|found| collapse_whitespace(&found.text().collect::<String>()))
}

/// Text nodes trimmed, joined by single spaces.
fn visible_text(element: ElementRef<'_>) -> String {
    let joined = element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    collapse_whitespace(&joined)
}
