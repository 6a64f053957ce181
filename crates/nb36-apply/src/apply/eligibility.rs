use serde::Serialize;
use serde_json::Number;

use super::orchestrator::ApplyOutcome;
use super::response::{DecisionResponse, SubDecision};

pub const APPROVED_HEADLINE: &str = "Congratulations! You're eligible for a credit card";
pub const DECLINED_HEADLINE: &str =
    "Unfortunately, you are not eligible for a credit card at this time";
pub const APPROVED_MESSAGE: &str = "Your application has been approved.";
pub const DECLINED_MESSAGE: &str =
    "We encourage you to explore our other programs that might be a better fit for your needs.";

/// One row of the eligibility step list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EligibilityStep {
    pub label: &'static str,
    pub ok: bool,
}

/// Customer-facing verdict shown once an apply run finishes.
///
/// Stricter than the check statuses: each stage must report its exact
/// success code, and the credit stage counts even though no check shows it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Eligibility {
    pub approved: bool,
    pub headline: &'static str,
    pub message: &'static str,
    pub credit_limit: Option<Number>,
    pub tier: Option<Number>,
    pub steps: Vec<EligibilityStep>,
}

impl Eligibility {
    pub fn from_outcome(outcome: &ApplyOutcome) -> Self {
        let response = outcome
            .decision_body()
            .map(DecisionResponse::from)
            .unwrap_or_default();

        let decision = |sub: &Option<SubDecision>| {
            sub.as_ref()
                .and_then(|sub| sub.decision.clone())
                .unwrap_or_default()
        };

        let aml_ok = decision(&response.aml_decision) == "PROCEED";
        let fraud_ok = decision(&response.fraud_decision)
            .to_uppercase()
            .contains("PASS");
        let credit_ok = decision(&response.credit_decision) == "CREDIT_PASS";
        let income_ok = decision(&response.income_decision) == "INCOME_PASS";
        let approved = aml_ok && fraud_ok && credit_ok && income_ok;

        let tier = response
            .final_tier
            .clone()
            .or_else(|| {
                response
                    .credit_decision
                    .as_ref()
                    .and_then(|credit| credit.number("final_tier"))
            })
            .or_else(|| outcome.report.summary.tiers.final_tier.clone());

        Self {
            approved,
            headline: if approved {
                APPROVED_HEADLINE
            } else {
                DECLINED_HEADLINE
            },
            message: if approved {
                APPROVED_MESSAGE
            } else {
                DECLINED_MESSAGE
            },
            credit_limit: response.credit_limit(),
            tier,
            steps: vec![
                EligibilityStep {
                    label: "AML Scan",
                    ok: aml_ok,
                },
                EligibilityStep {
                    label: "Fraud Signals",
                    ok: fraud_ok,
                },
                EligibilityStep {
                    label: "Credit Risk Assessment",
                    ok: credit_ok,
                },
                EligibilityStep {
                    label: "Income Verification",
                    ok: income_ok,
                },
            ],
        }
    }
}
