use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use super::checks::CheckResult;
use super::client::DecisionClient;
use super::eligibility::Eligibility;
use super::events::EventSink;
use super::orchestrator::{ApplyLogs, ApplyOrchestrator, ApplyReport};
use super::payload::{ApplicantPayload, PayloadError};

#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    pub report: ApplyReport,
    pub logs: ApplyLogs,
    pub eligibility: Eligibility,
}

/// Router exposing the apply flow over HTTP.
pub fn apply_router<C, S>(orchestrator: Arc<ApplyOrchestrator<C, S>>) -> Router
where
    C: DecisionClient + 'static,
    S: EventSink + 'static,
{
    Router::new()
        .route("/api/v1/apply", post(apply_handler::<C, S>))
        .with_state(orchestrator)
}

pub(crate) async fn apply_handler<C, S>(
    State(orchestrator): State<Arc<ApplyOrchestrator<C, S>>>,
    Json(payload): Json<ApplicantPayload>,
) -> Response
where
    C: DecisionClient + 'static,
    S: EventSink + 'static,
{
    if let Err(error) = payload.validate() {
        let PayloadError::MissingFields(missing) = &error;
        let body = json!({
            "error": error.to_string(),
            "missing_fields": missing,
        });
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
    }

    let outcome = orchestrator.run(&payload, log_progress).await;

    let eligibility = Eligibility::from_outcome(&outcome);
    let body = ApplyResponse {
        report: outcome.report,
        logs: outcome.logs,
        eligibility,
    };
    (StatusCode::OK, Json(body)).into_response()
}

fn log_progress(update: &CheckResult) {
    debug!(
        check = update.id.as_str(),
        status = update.status.label(),
        "apply progress"
    );
}
