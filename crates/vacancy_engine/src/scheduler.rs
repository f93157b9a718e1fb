use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use vacancy_core::{Schedule, Trigger};

use crate::{EventSink, Pipeline, PipelineEvent};

type Clock = Box<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Single-threaded poll loop around a [`Pipeline`].
///
/// The pipeline is awaited inline, so runs never overlap. Due instants that
/// pass while a run is in flight are skipped.
pub struct Scheduler {
    trigger: Trigger,
    poll_interval: Duration,
    clock: Clock,
    sink: Arc<dyn EventSink>,
}

impl Scheduler {
    pub fn new(trigger: Trigger, poll_interval: Duration, sink: Arc<dyn EventSink>) -> Self {
        Self {
            trigger,
            poll_interval,
            clock: Box::new(|| Local::now().naive_local()),
            sink,
        }
    }

    /// Replaces the local wall clock used to decide when a run is due.
    pub fn with_clock(
        mut self,
        clock: impl Fn() -> NaiveDateTime + Send + Sync + 'static,
    ) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Polls until `shutdown` resolves and returns the number of completed runs.
    ///
    /// `shutdown` is only observed between runs.
    pub async fn run_until<F>(&self, pipeline: &Pipeline, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        let mut schedule = Schedule::new(self.trigger, (self.clock)());
        self.sink.emit(PipelineEvent::Waiting {
            next_due: schedule.next_due(),
        });

        tokio::pin!(shutdown);
        let mut runs = 0;
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }

            if !schedule.is_due((self.clock)()) {
                continue;
            }

            self.sink.emit(PipelineEvent::RunStarted);
            pipeline.run_once().await;
            runs += 1;

            let skipped = schedule.advance((self.clock)());
            if skipped > 0 {
                self.sink.emit(PipelineEvent::TicksSkipped { count: skipped });
            }
        }

        self.sink.emit(PipelineEvent::Stopped { runs });
        runs
    }
}
