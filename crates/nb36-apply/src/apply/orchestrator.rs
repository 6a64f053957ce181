use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::checks::{derive_checks, CheckId, CheckResult};
use super::client::{DecisionClient, DecisionClientError};
use super::events::{EventSink, CHECKS_COMPLETED, CHECKS_STARTED, CHECK_UPDATE};
use super::response::DecisionResponse;
use super::summary::ReportSummary;

/// Offsets, in milliseconds, at which terminal check updates are emitted.
pub const DEFAULT_STAGGER_MS: [u64; 4] = [350, 800, 1200, 1600];
const FALLBACK_STAGGER: Duration = Duration::from_millis(300);

/// Cosmetic pacing for terminal check updates.
///
/// Each delay is measured from the moment the checks are derived, so entries
/// behave like independent timers. Checks without an entry use 300 ms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaggerSchedule {
    delays: Vec<Duration>,
}

impl Default for StaggerSchedule {
    fn default() -> Self {
        Self::from_millis(DEFAULT_STAGGER_MS)
    }
}

impl StaggerSchedule {
    pub fn from_millis<I>(millis: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        Self {
            delays: millis.into_iter().map(Duration::from_millis).collect(),
        }
    }

    /// Zero-delay schedule for deterministic tests and scripted runs.
    pub fn immediate() -> Self {
        Self::from_millis([0; 4])
    }

    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    pub fn delay_for(&self, index: usize) -> Duration {
        self.delays.get(index).copied().unwrap_or(FALLBACK_STAGGER)
    }

    /// Indices ordered by firing time; equal delays keep declaration order.
    fn emission_order(&self, count: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..count).collect();
        order.sort_by_key(|index| self.delay_for(*index));
        order
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid stagger entry '{entry}': expected a comma-separated list of milliseconds")]
pub struct ParseStaggerError {
    entry: String,
}

impl FromStr for StaggerSchedule {
    type Err = ParseStaggerError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let millis = raw
            .split(',')
            .map(|entry| {
                entry.trim().parse::<u64>().map_err(|_| ParseStaggerError {
                    entry: entry.trim().to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_millis(millis))
    }
}

/// Final report of an apply run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyReport {
    pub request_id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub started_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub finished_at: DateTime<Utc>,
    pub checks: [CheckResult; 4],
    pub summary: ReportSummary,
}

/// One HTTP exchange, kept for display and export only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestLogEntry {
    pub endpoint: String,
    pub method: String,
    /// `0` when the request never produced a parsable response.
    pub status: u16,
    /// Wall-clock milliseconds.
    pub duration: u64,
    pub request: Value,
    pub response: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplyLogs {
    pub requests: Vec<RequestLogEntry>,
}

/// Everything a caller needs to render or export a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyOutcome {
    pub report: ApplyReport,
    pub logs: ApplyLogs,
}

impl ApplyOutcome {
    /// Body of the single decisioning exchange, if one was logged.
    pub fn decision_body(&self) -> Option<&Value> {
        self.logs.requests.first().map(|entry| &entry.response)
    }
}

/// Runs the apply flow: one decisioning call, four derived checks, one report.
pub struct ApplyOrchestrator<C, S> {
    client: Arc<C>,
    events: Arc<S>,
    schedule: StaggerSchedule,
}

impl<C, S> ApplyOrchestrator<C, S>
where
    C: DecisionClient + 'static,
    S: EventSink + 'static,
{
    pub fn new(client: Arc<C>, events: Arc<S>, schedule: StaggerSchedule) -> Self {
        Self {
            client,
            events,
            schedule,
        }
    }

    pub fn endpoint(&self) -> &str {
        self.client.endpoint()
    }

    pub fn schedule(&self) -> &StaggerSchedule {
        &self.schedule
    }

    /// Submit `payload` and report progress through `on_update`.
    ///
    /// `on_update` first sees all four checks as `pending`, then each terminal
    /// result on the stagger schedule. The run always resolves with a complete
    /// report: transport or decode failures are logged with status `0` and the
    /// checks are derived from the error body.
    pub async fn run<P, F>(&self, payload: &P, mut on_update: F) -> ApplyOutcome
    where
        P: Serialize + ?Sized + Sync,
        F: FnMut(&CheckResult) + Send,
    {
        let started_at = Utc::now();
        let fallback_id = Uuid::new_v4().to_string();
        self.events
            .record(CHECKS_STARTED, json!({ "requestId": fallback_id }));

        let mut checks = CheckId::ordered().map(|id| CheckResult {
            t_start: Some(Utc::now()),
            ..CheckResult::pending(id)
        });
        for check in &checks {
            self.emit(check, &mut on_update);
        }

        let (entry, body) = self.exchange(payload).await;
        let response = DecisionResponse::from(&body);
        let derived = derive_checks(&response);

        let origin = Instant::now();
        for index in self.schedule.emission_order(derived.len()) {
            sleep_until(origin + self.schedule.delay_for(index)).await;
            let terminal = CheckResult {
                t_start: checks[index].t_start,
                t_end: Some(Utc::now()),
                ..derived[index].clone()
            };
            self.emit(&terminal, &mut on_update);
            checks[index] = terminal;
        }

        let finished_at = Utc::now();
        let summary = ReportSummary::build(&checks, &response);
        let request_id = response
            .request_id()
            .map(str::to_string)
            .unwrap_or(fallback_id);

        info!(
            %request_id,
            overall = summary.overall.label(),
            passed = summary.passed,
            "apply run completed"
        );
        self.events
            .record(CHECKS_COMPLETED, json!({ "requestId": request_id }));

        ApplyOutcome {
            report: ApplyReport {
                request_id,
                started_at,
                finished_at,
                checks,
                summary,
            },
            logs: ApplyLogs {
                requests: vec![entry],
            },
        }
    }

    async fn exchange<P>(&self, payload: &P) -> (RequestLogEntry, Value)
    where
        P: Serialize + ?Sized + Sync,
    {
        let request = serde_json::to_value(payload);
        let started = Instant::now();
        let outcome = match &request {
            Ok(body) => self.client.submit(body).await,
            Err(err) => Err(DecisionClientError::Encode(err.to_string())),
        };
        let duration = (started.elapsed().as_secs_f64() * 1000.0).round() as u64;

        let (status, body) = match outcome {
            Ok(exchange) => {
                info!(
                    endpoint = self.client.endpoint(),
                    status = exchange.status,
                    duration_ms = duration,
                    "decision request completed"
                );
                (exchange.status, exchange.body)
            }
            Err(err) => {
                warn!(
                    endpoint = self.client.endpoint(),
                    duration_ms = duration,
                    error = %err,
                    "decision request failed"
                );
                (0, json!({ "error": err.to_string() }))
            }
        };

        let entry = RequestLogEntry {
            endpoint: self.client.endpoint().to_string(),
            method: "POST".to_string(),
            status,
            duration,
            request: request.unwrap_or(Value::Null),
            response: body.clone(),
        };
        (entry, body)
    }

    fn emit<F>(&self, check: &CheckResult, on_update: &mut F)
    where
        F: FnMut(&CheckResult),
    {
        debug!(check = check.id.as_str(), status = check.status.label(), "check update");
        self.events.record(
            CHECK_UPDATE,
            json!({ "id": check.id, "status": check.status }),
        );
        on_update(check);
    }
}
