use metrics_exporter_prometheus::PrometheusHandle;
use nb36_apply::apply::{
    ApplyOrchestrator, HttpDecisionClient, StaggerSchedule, TracingEventSink,
};
use nb36_apply::config::ApplyConfig;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type HttpOrchestrator = ApplyOrchestrator<HttpDecisionClient, TracingEventSink>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn build_orchestrator(
    config: &ApplyConfig,
    endpoint: Option<String>,
    stagger: Option<StaggerSchedule>,
) -> Arc<HttpOrchestrator> {
    let endpoint = endpoint.unwrap_or_else(|| config.decision_endpoint.clone());
    let stagger = stagger.unwrap_or_else(|| config.stagger.clone());
    Arc::new(ApplyOrchestrator::new(
        Arc::new(HttpDecisionClient::new(endpoint)),
        Arc::new(TracingEventSink),
        stagger,
    ))
}
