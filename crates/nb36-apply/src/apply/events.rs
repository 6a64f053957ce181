use serde_json::Value;
use tracing::info;

pub const CHECKS_STARTED: &str = "checks_started";
pub const CHECK_UPDATE: &str = "check_update";
pub const CHECKS_COMPLETED: &str = "checks_completed";
pub const REPORT_VIEWED: &str = "report_viewed";
pub const JSON_DOWNLOADED: &str = "json_downloaded";

/// Sink for product telemetry events emitted during an apply run.
pub trait EventSink: Send + Sync {
    fn record(&self, event: &str, props: Value);
}

/// Writes telemetry events to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn record(&self, event: &str, props: Value) {
        info!(target: "nb36::telemetry", event, %props, "telemetry");
    }
}
