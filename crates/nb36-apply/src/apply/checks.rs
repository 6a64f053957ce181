use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::response::{DecisionResponse, SubDecision};
use super::status::{decision_to_status, CheckStatus};

/// Months of verified income required for the overage-month check to pass.
pub const MIN_COVERAGE_MONTHS: f64 = 3.0;

/// The four checks shown during an apply run, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckId {
    Identity,
    IncomeVerification,
    OverageMonth,
    FraudSignals,
}

impl CheckId {
    pub fn ordered() -> [CheckId; 4] {
        [
            CheckId::Identity,
            CheckId::IncomeVerification,
            CheckId::OverageMonth,
            CheckId::FraudSignals,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            CheckId::Identity => "Identity",
            CheckId::IncomeVerification => "Income Verification",
            CheckId::OverageMonth => "Overage Month",
            CheckId::FraudSignals => "Fraud Signals",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckId::Identity => "identity",
            CheckId::IncomeVerification => "incomeVerification",
            CheckId::OverageMonth => "overageMonth",
            CheckId::FraudSignals => "fraudSignals",
        }
    }
}

/// Snapshot of one check as emitted to update handlers and stored in reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub id: CheckId,
    pub label: String,
    pub status: CheckStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub t_start: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub t_end: Option<DateTime<Utc>>,
}

impl CheckResult {
    pub fn pending(id: CheckId) -> Self {
        Self {
            id,
            label: id.label().to_string(),
            status: CheckStatus::Pending,
            detail: None,
            raw: None,
            t_start: None,
            t_end: None,
        }
    }

    fn from_decision(id: CheckId, sub: Option<&SubDecision>) -> Self {
        let decision = sub.and_then(|sub| sub.decision.as_deref());
        Self {
            status: decision_to_status(decision),
            detail: decision.filter(|text| !text.is_empty()).map(str::to_string),
            raw: sub.map(SubDecision::raw),
            ..Self::pending(id)
        }
    }
}

/// Derives all four checks from a single decision response.
///
/// Each check reads its own field only, so a partial response produces
/// `pending` checks rather than errors.
pub fn derive_checks(response: &DecisionResponse) -> [CheckResult; 4] {
    [
        CheckResult::from_decision(CheckId::Identity, response.aml_decision.as_ref()),
        CheckResult::from_decision(
            CheckId::IncomeVerification,
            response.income_decision.as_ref(),
        ),
        overage_month(response),
        CheckResult::from_decision(CheckId::FraudSignals, response.fraud_decision.as_ref()),
    ]
}

fn overage_month(response: &DecisionResponse) -> CheckResult {
    let coverage = response.coverage_value();
    let months = coverage.and_then(Value::as_f64);

    let (status, detail) = match months {
        Some(months) if months >= MIN_COVERAGE_MONTHS => {
            (CheckStatus::Pass, Some(coverage_detail(months)))
        }
        Some(months) => (CheckStatus::Fail, Some(coverage_detail(months))),
        None => (CheckStatus::Pending, None),
    };

    CheckResult {
        status,
        detail,
        raw: Some(json!({ "coverage_months": coverage.cloned().unwrap_or(Value::Null) })),
        ..CheckResult::pending(CheckId::OverageMonth)
    }
}

fn coverage_detail(months: f64) -> String {
    let unit = if months == 1.0 { "month" } else { "months" };
    format!("{} {unit} coverage", format_months(months))
}

fn format_months(months: f64) -> String {
    if months.fract() == 0.0 && months.abs() < 1e15 {
        format!("{}", months as i64)
    } else {
        format!("{months}")
    }
}
