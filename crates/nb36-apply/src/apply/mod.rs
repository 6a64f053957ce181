//! Apply flow: submit an applicant once, derive four checks from the decision,
//! pace their updates, and summarize the result.

pub mod checks;
pub mod client;
pub mod eligibility;
pub mod events;
pub mod export;
pub mod orchestrator;
pub mod payload;
pub mod response;
pub mod router;
pub mod status;
pub mod summary;

#[cfg(test)]
mod tests;

pub use checks::{derive_checks, CheckId, CheckResult};
pub use client::{DecisionClient, DecisionClientError, DecisionExchange, HttpDecisionClient};
pub use eligibility::{Eligibility, EligibilityStep};
pub use events::{EventSink, TracingEventSink};
pub use export::{export_file_name, render_export, write_export};
pub use orchestrator::{
    ApplyLogs, ApplyOrchestrator, ApplyOutcome, ApplyReport, ParseStaggerError, RequestLogEntry,
    StaggerSchedule, DEFAULT_STAGGER_MS,
};
pub use payload::{
    compose_address_line, ApplicantPayload, DemoConfig, IncomeScenario, PayloadError,
    TestScenario, UnknownScenario,
};
pub use response::{DecisionResponse, SubDecision};
pub use router::{apply_router, ApplyResponse};
pub use status::{decision_to_status, CheckStatus};
pub use summary::{overall_status, ReportSummary, Tiers};
