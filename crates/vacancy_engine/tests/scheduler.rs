use std::num::NonZeroU32;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use tempfile::TempDir;
use tokio::sync::oneshot;
use vacancy_core::{ExtractionProfile, Trigger};
use vacancy_engine::{
    CsvTableWriter, EventSink, FailureKind, FetchError, FetchedPage, Fetcher, ListingExtractor,
    ListingSelectors, Pipeline, PipelineEvent, Scheduler,
};

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

/// Always fails; signals `done` once `limit` fetches have been attempted.
struct CountingFetcher {
    calls: Arc<AtomicUsize>,
    limit: usize,
    done: Mutex<Option<oneshot::Sender<()>>>,
}

#[async_trait::async_trait]
impl Fetcher for CountingFetcher {
    async fn fetch(&self, _url: &str) -> Result<FetchedPage, FetchError> {
        let calls = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if calls >= self.limit {
            if let Some(done) = self.done.lock().unwrap().take() {
                let _ = done.send(());
            }
        }
        Err(FetchError::new(FailureKind::HttpStatus(503), "unavailable"))
    }
}

fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 10)
        .and_then(|d| d.and_hms_opt(8, 0, 0))
        .unwrap()
}

/// Each read moves the clock forward by `step`.
fn stepping_clock(step: TimeDelta) -> impl Fn() -> NaiveDateTime + Send + Sync + 'static {
    let now = Mutex::new(start());
    move || {
        let mut now = now.lock().unwrap();
        let current = *now;
        *now += step;
        current
    }
}

fn pipeline(fetcher: Box<dyn Fetcher>, temp: &TempDir, sink: Arc<RecordingSink>) -> Pipeline {
    let profile = ExtractionProfile::Detailed;
    Pipeline::new(
        "https://jobs.example.com/",
        fetcher,
        Box::new(ListingExtractor::new(
            profile,
            ListingSelectors::with_default_classes().unwrap(),
        )),
        CsvTableWriter::new(profile, temp.path().join("scraped_data.csv")),
        sink,
    )
}

fn every_minute() -> Trigger {
    Trigger::EveryMinutes(NonZeroU32::new(1).unwrap())
}

#[tokio::test]
async fn failed_runs_keep_the_loop_alive_until_shutdown() {
    let temp = TempDir::new().unwrap();
    let sink = Arc::new(RecordingSink::default());
    let calls = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = oneshot::channel();
    let fetcher = CountingFetcher {
        calls: calls.clone(),
        limit: 3,
        done: Mutex::new(Some(tx)),
    };
    let pipeline = pipeline(Box::new(fetcher), &temp, sink.clone());

    let scheduler = Scheduler::new(every_minute(), Duration::from_millis(1), sink.clone())
        .with_clock(stepping_clock(TimeDelta::seconds(30)));
    let runs = scheduler
        .run_until(&pipeline, async {
            let _ = rx.await;
        })
        .await;

    assert_eq!(runs, 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    let events = sink.take();
    assert!(matches!(events.first(), Some(PipelineEvent::Waiting { .. })));
    assert_eq!(events.last(), Some(&PipelineEvent::Stopped { runs: 3 }));
    let started = events
        .iter()
        .filter(|e| matches!(e, PipelineEvent::RunStarted))
        .count();
    let failed = events
        .iter()
        .filter(|e| matches!(e, PipelineEvent::FetchFailed { .. }))
        .count();
    assert_eq!(started, 3);
    assert_eq!(failed, 3);
    assert!(!temp.path().join("scraped_data.csv").exists());
}

#[tokio::test]
async fn slow_runs_skip_missed_ticks() {
    let temp = TempDir::new().unwrap();
    let sink = Arc::new(RecordingSink::default());
    let (tx, rx) = oneshot::channel();
    let fetcher = CountingFetcher {
        calls: Arc::new(AtomicUsize::new(0)),
        limit: 1,
        done: Mutex::new(Some(tx)),
    };
    let pipeline = pipeline(Box::new(fetcher), &temp, sink.clone());

    // Clock reads: 08:00 at start, 08:02:30 (due), 08:05:00 after the run.
    // 08:02, 08:03, 08:04 and 08:05 all passed while the run was in flight.
    let scheduler = Scheduler::new(every_minute(), Duration::from_millis(1), sink.clone())
        .with_clock(stepping_clock(TimeDelta::seconds(150)));
    let runs = scheduler
        .run_until(&pipeline, async {
            let _ = rx.await;
        })
        .await;

    assert_eq!(runs, 1);
    let events = sink.take();
    assert!(events.contains(&PipelineEvent::TicksSkipped { count: 4 }));
}

#[tokio::test]
async fn immediate_shutdown_runs_nothing() {
    let temp = TempDir::new().unwrap();
    let sink = Arc::new(RecordingSink::default());
    let fetcher = CountingFetcher {
        calls: Arc::new(AtomicUsize::new(0)),
        limit: usize::MAX,
        done: Mutex::new(None),
    };
    let pipeline = pipeline(Box::new(fetcher), &temp, sink.clone());

    let scheduler = Scheduler::new(every_minute(), Duration::from_secs(3600), sink.clone());
    let runs = scheduler.run_until(&pipeline, async {}).await;

    assert_eq!(runs, 0);
    let events = sink.take();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1], PipelineEvent::Stopped { runs: 0 });
}
