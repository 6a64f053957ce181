use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::apply::client::{DecisionClient, DecisionClientError, DecisionExchange};
use crate::apply::events::EventSink;
use crate::apply::orchestrator::{ApplyOrchestrator, StaggerSchedule};
use crate::apply::payload::{ApplicantPayload, DemoConfig};

pub(super) const ENDPOINT: &str = "http://decisions.test/apply/kyc";

pub(super) enum Script {
    Respond(u16, Value),
    TransportError(&'static str),
}

/// Decision client replaying a fixed answer and recording what it was sent.
pub(super) struct ScriptedClient {
    script: Script,
    calls: Mutex<Vec<Value>>,
}

impl ScriptedClient {
    pub(super) fn responding(body: Value) -> Self {
        Self::new(Script::Respond(200, body))
    }

    pub(super) fn new(script: Script) -> Self {
        Self {
            script,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn calls(&self) -> Vec<Value> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }
}

#[async_trait]
impl DecisionClient for ScriptedClient {
    fn endpoint(&self) -> &str {
        ENDPOINT
    }

    async fn submit(&self, body: &Value) -> Result<DecisionExchange, DecisionClientError> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(body.clone());
        match &self.script {
            Script::Respond(status, body) => Ok(DecisionExchange {
                status: *status,
                body: body.clone(),
            }),
            Script::TransportError(message) => {
                Err(DecisionClientError::Transport(message.to_string()))
            }
        }
    }
}

#[derive(Default)]
pub(super) struct MemoryEventSink {
    events: Mutex<Vec<(String, Value)>>,
}

impl EventSink for MemoryEventSink {
    fn record(&self, event: &str, props: Value) {
        self.events
            .lock()
            .expect("event mutex poisoned")
            .push((event.to_string(), props));
    }
}

impl MemoryEventSink {
    pub(super) fn names(&self) -> Vec<String> {
        self.events
            .lock()
            .expect("event mutex poisoned")
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub(super) fn events(&self) -> Vec<(String, Value)> {
        self.events.lock().expect("event mutex poisoned").clone()
    }
}

pub(super) fn orchestrator(
    client: Arc<ScriptedClient>,
    schedule: StaggerSchedule,
) -> (
    ApplyOrchestrator<ScriptedClient, MemoryEventSink>,
    Arc<MemoryEventSink>,
) {
    let events = Arc::new(MemoryEventSink::default());
    (
        ApplyOrchestrator::new(client, events.clone(), schedule),
        events,
    )
}

pub(super) fn applicant() -> ApplicantPayload {
    ApplicantPayload {
        user_fullname: "Avery Quinn".to_string(),
        user_dob: "1990-04-12".to_string(),
        user_country: "US".to_string(),
        ssn: "123-45-6789".to_string(),
        gov_id_type: "drivers_license".to_string(),
        gov_id_number: "D1234567".to_string(),
        address_line1: "500 Market St, Apt 4".to_string(),
        address_city: "San Francisco".to_string(),
        address_state: "CA".to_string(),
        address_zip: "94105".to_string(),
        email: "avery@example.com".to_string(),
        phone_number: "+14155550100".to_string(),
        ip: None,
        session: None,
        custom_fields: Default::default(),
    }
    .with_demo(&DemoConfig::default())
}

pub(super) fn approved_response() -> Value {
    json!({
        "case_id": "case-7f3a",
        "status": "KYC_COMPLETE",
        "aml_decision": { "decision": "PROCEED", "reasons": [] },
        "fraud_decision": { "decision": "PASS", "provisional_tier": 2 },
        "credit_decision": { "decision": "CREDIT_PASS", "bureau_tier": 2, "final_tier": 3 },
        "income_decision": {
            "decision": "INCOME_PASS",
            "income_tier": 4,
            "credit_limit": 2500,
            "metrics": { "coverage_months": 12 }
        },
        "message": "End-to-end KYC (AML + Fraud + Credit + Income) completed for demo"
    })
}
