//! End-to-end scenarios for the apply flow against a local decisioning endpoint.
//!
//! A throwaway axum server stands in for the decisioning backend so the real
//! `reqwest` client, the orchestrator, and the HTTP router are exercised
//! together through the public API.

mod common {
    use std::sync::Arc;

    use axum::Router;
    use nb36_apply::apply::{
        ApplicantPayload, ApplyOrchestrator, DemoConfig, HttpDecisionClient, StaggerSchedule,
        TestScenario, TracingEventSink,
    };
    use serde_json::{json, Value};

    pub(super) type Orchestrator = ApplyOrchestrator<HttpDecisionClient, TracingEventSink>;

    pub(super) async fn spawn_decision_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind decision server");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("decision server runs");
        });
        format!("http://{addr}/apply/kyc")
    }

    /// Endpoint that refuses connections: bound once, then released.
    pub(super) async fn closed_endpoint() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind probe");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);
        format!("http://{addr}/apply/kyc")
    }

    pub(super) fn orchestrator(endpoint: String) -> Arc<Orchestrator> {
        Arc::new(ApplyOrchestrator::new(
            Arc::new(HttpDecisionClient::new(endpoint)),
            Arc::new(TracingEventSink),
            StaggerSchedule::immediate(),
        ))
    }

    pub(super) fn applicant() -> ApplicantPayload {
        ApplicantPayload {
            user_fullname: "Jordan Lee".to_string(),
            user_dob: "1988-11-02".to_string(),
            user_country: "US".to_string(),
            ssn: "987-65-4321".to_string(),
            gov_id_type: "passport".to_string(),
            gov_id_number: "P7654321".to_string(),
            address_line1: "77 Elm St".to_string(),
            address_city: "Denver".to_string(),
            address_state: "CO".to_string(),
            address_zip: "80202".to_string(),
            email: "jordan@example.com".to_string(),
            phone_number: "+13035550111".to_string(),
            ip: Some("203.0.113.9".to_string()),
            session: None,
            custom_fields: Default::default(),
        }
        .with_demo(&DemoConfig {
            scenario: Some(TestScenario::Pass),
            ..DemoConfig::default()
        })
    }

    /// Decision body in the shape of the KYC endpoint, echoing the applicant's
    /// scenario so tests can assert what was sent.
    pub(super) fn kyc_decision(request: &Value) -> Value {
        let scenario = request["custom_fields"]["scenario"].clone();
        json!({
            "case_id": format!("case-{}", request["gov_id_number"].as_str().unwrap_or("x")),
            "status": "KYC_COMPLETE",
            "scenario": scenario,
            "aml_decision": { "decision": "PROCEED" },
            "fraud_decision": { "decision": "FRAUD_PASS", "provisional_tier": 2 },
            "credit_decision": { "decision": "CREDIT_PASS", "bureau_tier": 2, "final_tier": 2 },
            "income_decision": {
                "decision": "INCOME_PASS",
                "income_tier": 3,
                "credit_limit": 1500,
                "metrics": { "coverage_months": request["custom_fields"]["income_coverage_months"] }
            }
        })
    }
}

mod orchestration {
    use super::common::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use nb36_apply::apply::{CheckStatus, Eligibility};
    use serde_json::{json, Value};

    #[tokio::test]
    async fn approved_applicant_passes_every_check() {
        let router = Router::new().route(
            "/apply/kyc",
            post(|Json(body): Json<Value>| async move { Json(kyc_decision(&body)) }),
        );
        let endpoint = spawn_decision_server(router).await;
        let orchestrator = orchestrator(endpoint.clone());

        let mut updates = Vec::new();
        let outcome = orchestrator
            .run(&applicant(), |update| updates.push(update.clone()))
            .await;

        assert_eq!(updates.len(), 8);
        assert_eq!(outcome.report.request_id, "case-P7654321");
        assert_eq!(outcome.report.summary.overall, CheckStatus::Pass);
        assert_eq!(outcome.report.summary.percent, 100);
        assert_eq!(
            outcome.report.checks[2].detail.as_deref(),
            Some("12 months coverage")
        );

        let entry = &outcome.logs.requests[0];
        assert_eq!(entry.endpoint, endpoint);
        assert_eq!(entry.status, 200);
        assert_eq!(entry.response["scenario"], "pass");
        assert_eq!(entry.request["ip"], "203.0.113.9");

        let eligibility = Eligibility::from_outcome(&outcome);
        assert!(eligibility.approved);
        assert_eq!(eligibility.credit_limit, Some(1500.into()));
    }

    #[tokio::test]
    async fn error_statuses_are_recorded_but_still_interpreted() {
        let router = Router::new().route(
            "/apply/kyc",
            post(|| async {
                (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({
                        "case_id": "case-502",
                        "status": "FRAUD_REVIEW",
                        "aml_decision": null,
                        "fraud_decision": {
                            "decision": "FRAUD_REVIEW",
                            "reasons": ["taktile_unavailable_or_error"]
                        }
                    })),
                )
            }),
        );
        let endpoint = spawn_decision_server(router).await;

        let outcome = orchestrator(endpoint).run(&applicant(), |_| {}).await;

        assert_eq!(outcome.logs.requests[0].status, 502);
        assert_eq!(outcome.report.request_id, "case-502");
        assert_eq!(outcome.report.checks[0].status, CheckStatus::Pending);
        assert_eq!(outcome.report.checks[3].status, CheckStatus::Fail);
        assert_eq!(outcome.report.summary.overall, CheckStatus::Fail);
        assert_eq!(
            outcome.report.summary.status.as_deref(),
            Some("FRAUD_REVIEW")
        );
    }

    #[tokio::test]
    async fn unparsable_bodies_degrade_to_status_zero() {
        let router = Router::new().route(
            "/apply/kyc",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "<html>upstream down</html>") }),
        );
        let endpoint = spawn_decision_server(router).await;

        let outcome = orchestrator(endpoint).run(&applicant(), |_| {}).await;

        let entry = &outcome.logs.requests[0];
        assert_eq!(entry.status, 0);
        let message = entry.response["error"].as_str().expect("error captured");
        assert!(message.contains("HTTP 500"), "unexpected message: {message}");
        assert!(outcome
            .report
            .checks
            .iter()
            .all(|check| check.status == CheckStatus::Pending));
    }

    #[tokio::test]
    async fn refused_connections_still_resolve_with_a_report() {
        let endpoint = closed_endpoint().await;

        let outcome = orchestrator(endpoint).run(&applicant(), |_| {}).await;

        assert_eq!(outcome.report.checks.len(), 4);
        assert_eq!(outcome.logs.requests.len(), 1);
        assert_eq!(outcome.logs.requests[0].status, 0);
        assert!(outcome.logs.requests[0].response["error"].is_string());
        assert_eq!(outcome.report.summary.overall, CheckStatus::Pending);
        assert!(!Eligibility::from_outcome(&outcome).approved);
    }
}

mod routing {
    use super::common::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use nb36_apply::apply::apply_router;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn app() -> Router {
        let decisions = Router::new().route(
            "/apply/kyc",
            post(|Json(body): Json<Value>| async move { Json(kyc_decision(&body)) }),
        );
        let endpoint = spawn_decision_server(decisions).await;
        apply_router(orchestrator(endpoint))
    }

    fn apply_request(body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/apply")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).expect("serialize payload")))
            .expect("request")
    }

    #[tokio::test]
    async fn apply_endpoint_returns_report_logs_and_eligibility() {
        let payload = serde_json::to_value(applicant()).expect("payload");

        let response = app()
            .await
            .oneshot(apply_request(&payload))
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(payload["report"]["requestId"], "case-P7654321");
        assert_eq!(payload["report"]["checks"].as_array().map(Vec::len), Some(4));
        assert_eq!(payload["report"]["summary"]["overall"], "pass");
        assert_eq!(payload["logs"]["requests"][0]["method"], "POST");
        assert_eq!(payload["eligibility"]["approved"], true);
        assert_eq!(payload["eligibility"]["tier"], 2);
    }

    #[tokio::test]
    async fn apply_endpoint_rejects_incomplete_applicants() {
        let mut payload = serde_json::to_value(applicant()).expect("payload");
        payload["email"] = Value::from("");
        payload["address_city"] = Value::from(" ");

        let response = app()
            .await
            .oneshot(apply_request(&payload))
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(payload["error"], "Please complete all required fields.");
        assert_eq!(
            payload["missing_fields"],
            serde_json::json!(["email", "address_city"])
        );
    }
}
