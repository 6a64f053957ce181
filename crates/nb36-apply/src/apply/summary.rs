use serde::{Deserialize, Serialize};
use serde_json::Number;

use super::checks::CheckResult;
use super::response::{DecisionResponse, SubDecision};
use super::status::CheckStatus;

/// Tier numbers surfaced from the decisioning backend, each independently absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tiers {
    pub bureau: Option<Number>,
    pub income: Option<Number>,
    pub provisional: Option<Number>,
    #[serde(rename = "final")]
    pub final_tier: Option<Number>,
}

impl Tiers {
    pub fn from_response(response: &DecisionResponse) -> Self {
        let nested = |sub: &Option<SubDecision>, key: &str| {
            sub.as_ref().and_then(|sub| sub.number(key))
        };

        Self {
            bureau: nested(&response.credit_decision, "bureau_tier")
                .or_else(|| response.bureau_tier.clone()),
            income: nested(&response.income_decision, "income_tier"),
            provisional: nested(&response.fraud_decision, "provisional_tier")
                .or_else(|| response.provisional_tier.clone()),
            final_tier: nested(&response.credit_decision, "final_tier")
                .or_else(|| response.final_tier.clone()),
        }
    }
}

/// Headline numbers for a finished apply run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub overall: CheckStatus,
    pub percent: u8,
    pub passed: usize,
    pub total: usize,
    pub status: Option<String>,
    pub tiers: Tiers,
}

impl ReportSummary {
    pub fn build(checks: &[CheckResult], response: &DecisionResponse) -> Self {
        let total = checks.len();
        let passed = checks
            .iter()
            .filter(|check| check.status == CheckStatus::Pass)
            .count();

        Self {
            overall: overall_status(checks),
            percent: percent_complete(passed, total),
            passed,
            total,
            status: response.status.clone(),
            tiers: Tiers::from_response(response),
        }
    }
}

/// `pass` only when every check passed, `fail` when any failed, else `pending`.
pub fn overall_status(checks: &[CheckResult]) -> CheckStatus {
    if !checks.is_empty() && checks.iter().all(|check| check.status == CheckStatus::Pass) {
        CheckStatus::Pass
    } else if checks.iter().any(|check| check.status == CheckStatus::Fail) {
        CheckStatus::Fail
    } else {
        CheckStatus::Pending
    }
}

fn percent_complete(passed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((passed as f64 / total as f64) * 100.0).round() as u8
}
