use std::fs;
use std::sync::{Arc, Mutex};

use log::Level;
use tempfile::TempDir;
use vacancy_core::ExtractionProfile;
use vacancy_engine::{
    CsvTableWriter, EventSink, FailureKind, ListingExtractor, ListingSelectors, Pipeline,
    PipelineEvent, ReqwestFetcher, RunOutcome,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<PipelineEvent>>,
}

impl RecordingSink {
    fn take(&self) -> Vec<PipelineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: PipelineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

const LISTING_PAGE: &str = r#"
<html><body>
  <div class="job-listing-details">
    <h4>Accountant</h4><span>Acme Ltd</span><a href="/jobs/1">Apply</a>
  </div>
  <div class="job-listing-footer"><p>Harare</p><p>Expires 2025-01-10</p></div>
  <div class="job-listing-details">
    <h4>Accountant</h4><span>Acme Ltd</span><a href="/jobs/1">Apply</a>
  </div>
  <div class="job-listing-footer"><p>Harare</p><p>Expires 2025-01-10</p></div>
</body></html>
"#;

fn pipeline(url: String, output: &std::path::Path, sink: Arc<RecordingSink>) -> Pipeline {
    let profile = ExtractionProfile::Detailed;
    Pipeline::new(
        url,
        Box::new(ReqwestFetcher::default()),
        Box::new(ListingExtractor::new(
            profile,
            ListingSelectors::with_default_classes().unwrap(),
        )),
        CsvTableWriter::new(profile, output),
        sink,
    )
}

async fn serve(status: u16, body: impl AsRef<[u8]>) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/"))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_raw(body.as_ref().to_vec(), "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn non_success_status_short_circuits_the_run() {
    engine_logging::initialize_for_tests();
    let server = serve(500, "boom").await;
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("scraped_data.csv");
    let sink = Arc::new(RecordingSink::default());

    let outcome = pipeline(format!("{}/jobs/", server.uri()), &output, sink.clone())
        .run_once()
        .await;

    match outcome {
        RunOutcome::FetchFailed(err) => assert_eq!(err.kind, FailureKind::HttpStatus(500)),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert!(!output.exists());

    let events = sink.take();
    let errors: Vec<_> = events.iter().filter(|e| e.level() == Level::Error).collect();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], PipelineEvent::FetchFailed { .. }));
    assert!(!events
        .iter()
        .any(|e| matches!(e, PipelineEvent::Parsed { .. } | PipelineEvent::Saved { .. })));
}

#[tokio::test]
async fn listing_page_is_saved_without_duplicates() {
    let server = serve(200, LISTING_PAGE).await;
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("scraped_data.csv");
    let sink = Arc::new(RecordingSink::default());

    let outcome = pipeline(format!("{}/jobs/", server.uri()), &output, sink.clone())
        .run_once()
        .await;

    let summary = match outcome {
        RunOutcome::Saved(summary) => summary,
        other => panic!("unexpected outcome {other:?}"),
    };
    assert_eq!(summary.rows_written, 1);
    assert_eq!(summary.duplicates_removed, 1);

    let content = fs::read_to_string(&output).unwrap();
    assert!(content
        .contains("Accountant,Acme Ltd,Harare,2025-01-10,Accountant Acme Ltd Apply,/jobs/1"));

    let events = sink.take();
    assert!(events.contains(&PipelineEvent::Parsed { count: 2 }));
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::RecordParsed(_)))
            .count(),
        2
    );
    let record_event = events
        .iter()
        .find(|e| matches!(e, PipelineEvent::RecordParsed(_)))
        .expect("record event");
    assert_eq!(record_event.level(), Level::Info);
}

#[tokio::test]
async fn malformed_byte_in_page_still_yields_records() {
    let parts: [&[u8]; 3] = [
        br#"<html><body><div class="job-listing-details"><h4>Accountant</h4><span>Acme L"#,
        &[0xff],
        br#"td</span><a href="/jobs/1">Apply</a></div>
        <div class="job-listing-footer"><p>Harare</p><p>Expires 2025-01-10</p></div>
        </body></html>"#,
    ];
    let server = serve(200, parts.concat()).await;
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("scraped_data.csv");
    let sink = Arc::new(RecordingSink::default());

    let outcome = pipeline(format!("{}/jobs/", server.uri()), &output, sink.clone())
        .run_once()
        .await;

    let summary = match outcome {
        RunOutcome::Saved(summary) => summary,
        other => panic!("unexpected outcome {other:?}"),
    };
    assert_eq!(summary.rows_written, 1);
    let content = fs::read_to_string(&output).unwrap();
    assert!(content.contains("Accountant,Acme L\u{fffd}td,Harare,2025-01-10"));

    let events = sink.take();
    let fetched = events
        .iter()
        .find(|e| matches!(e, PipelineEvent::Fetched { .. }))
        .expect("fetched event");
    assert_eq!(fetched.level(), Level::Warn);
    assert!(!events.iter().any(|e| e.level() == Level::Error));
}

#[tokio::test]
async fn page_without_listings_reports_nothing_to_save() {
    let server = serve(200, "<html><body><p>No vacancies</p></body></html>").await;
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("scraped_data.csv");
    let sink = Arc::new(RecordingSink::default());

    let outcome = pipeline(format!("{}/jobs/", server.uri()), &output, sink.clone())
        .run_once()
        .await;

    assert_eq!(outcome, RunOutcome::NothingToSave);
    assert!(!output.exists());
    let events = sink.take();
    assert!(events.contains(&PipelineEvent::NothingToSave));
    assert_eq!(PipelineEvent::NothingToSave.level(), Level::Warn);
}

#[tokio::test]
async fn write_failure_is_reported_not_raised() {
    let server = serve(200, LISTING_PAGE).await;
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("blocker");
    fs::write(&blocker, "x").unwrap();
    let sink = Arc::new(RecordingSink::default());

    let outcome = pipeline(
        format!("{}/jobs/", server.uri()),
        &blocker.join("scraped_data.csv"),
        sink.clone(),
    )
    .run_once()
    .await;

    assert!(matches!(outcome, RunOutcome::SaveFailed(_)));
    let events = sink.take();
    assert!(events
        .iter()
        .any(|e| matches!(e, PipelineEvent::SaveFailed { .. })));
}
