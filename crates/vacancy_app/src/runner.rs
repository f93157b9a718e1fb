//! The two run modes: one Basic pass, or the Detailed pipeline on a schedule.

use std::sync::Arc;

use anyhow::Context;
use engine_logging::{engine_error, engine_info};
use vacancy_core::ExtractionProfile;
use vacancy_engine::{
    CsvTableWriter, EventSink, ListingExtractor, ListingSelectors, LogEventSink, Pipeline,
    ReqwestFetcher, RunOutcome, Scheduler,
};

use crate::config::AppConfig;

pub fn build_pipeline(
    config: &AppConfig,
    profile: ExtractionProfile,
    sink: Arc<dyn EventSink>,
) -> anyhow::Result<Pipeline> {
    let selectors = ListingSelectors::new(&config.detail_class, &config.footer_class)
        .context("invalid listing selectors")?;
    Ok(Pipeline::new(
        config.listing_url.clone(),
        Box::new(ReqwestFetcher::new(config.fetch_settings())),
        Box::new(ListingExtractor::new(profile, selectors)),
        CsvTableWriter::new(profile, config.output_path(profile)),
        sink,
    ))
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")
}

/// Fetches, extracts and writes once with the Basic profile.
pub fn run_once(config: &AppConfig) -> anyhow::Result<RunOutcome> {
    let pipeline = build_pipeline(config, ExtractionProfile::Basic, Arc::new(LogEventSink))?;
    let outcome = runtime()?.block_on(pipeline.run_once());
    if let RunOutcome::FetchFailed(_) = outcome {
        engine_error!("Could not get the web page.");
    }
    Ok(outcome)
}

/// Runs the Detailed pipeline on the configured trigger until Ctrl+C.
pub fn run_watch(config: &AppConfig) -> anyhow::Result<usize> {
    let sink: Arc<dyn EventSink> = Arc::new(LogEventSink);
    let pipeline = build_pipeline(config, ExtractionProfile::Detailed, sink.clone())?;
    let scheduler = Scheduler::new(config.trigger()?, config.poll_interval(), sink);

    let runs = runtime()?.block_on(scheduler.run_until(&pipeline, shutdown_signal()));
    engine_info!("Exiting after {} scheduled runs", runs);
    Ok(runs)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        engine_error!("Failed to listen for Ctrl+C: {}", err);
        std::future::pending::<()>().await;
    }
}
