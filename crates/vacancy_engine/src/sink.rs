use engine_logging::engine_log;

use crate::PipelineEvent;

/// Receives pipeline events; injected wherever something needs to be reported.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: PipelineEvent);
}

/// Forwards every event to the global logger at the event's level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&self, event: PipelineEvent) {
        engine_log!(event.level(), "{event}");
    }
}
