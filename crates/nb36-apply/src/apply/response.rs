use serde_json::{Map, Number, Value};

/// Structurally optional view of the decisioning backend's JSON body.
///
/// Built through a total conversion: every field the flow reads is optional and
/// a missing or mistyped field is simply absent. Nothing here can fail.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecisionResponse {
    pub case_id: Option<String>,
    pub id: Option<String>,
    pub status: Option<String>,
    pub aml_decision: Option<SubDecision>,
    pub fraud_decision: Option<SubDecision>,
    pub credit_decision: Option<SubDecision>,
    pub income_decision: Option<SubDecision>,
    pub bureau_tier: Option<Number>,
    pub provisional_tier: Option<Number>,
    pub final_tier: Option<Number>,
}

/// One nested decision object (`aml_decision`, `fraud_decision`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct SubDecision {
    pub decision: Option<String>,
    fields: Map<String, Value>,
}

impl SubDecision {
    fn from_object(fields: &Map<String, Value>) -> Self {
        Self {
            decision: fields.get("decision").and_then(scalar_text),
            fields: fields.clone(),
        }
    }

    /// Numeric field on the sub-decision, ignoring non-numeric values.
    pub fn number(&self, key: &str) -> Option<Number> {
        match self.fields.get(key) {
            Some(Value::Number(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Metric value under `metrics.<key>`, `None` when absent or null.
    pub fn metric(&self, key: &str) -> Option<&Value> {
        self.fields
            .get("metrics")
            .and_then(Value::as_object)
            .and_then(|metrics| metrics.get(key))
            .filter(|value| !value.is_null())
    }

    /// Copy of the sub-object as received, for previews and exports.
    pub fn raw(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

impl DecisionResponse {
    /// Income coverage months, preferring `coverage_months` over `coverage`.
    pub fn coverage_value(&self) -> Option<&Value> {
        self.income_decision.as_ref().and_then(|income| {
            income
                .metric("coverage_months")
                .or_else(|| income.metric("coverage"))
        })
    }

    /// Identifier assigned by the backend, `case_id` first.
    pub fn request_id(&self) -> Option<&str> {
        self.case_id.as_deref().or(self.id.as_deref())
    }

    pub fn credit_limit(&self) -> Option<Number> {
        self.income_decision
            .as_ref()
            .and_then(|income| income.number("credit_limit"))
    }
}

impl From<&Value> for DecisionResponse {
    fn from(value: &Value) -> Self {
        let Some(body) = value.as_object() else {
            return Self::default();
        };

        let sub = |key: &str| {
            body.get(key)
                .and_then(Value::as_object)
                .map(SubDecision::from_object)
        };
        let number = |key: &str| match body.get(key) {
            Some(Value::Number(value)) => Some(value.clone()),
            _ => None,
        };

        Self {
            case_id: body.get("case_id").and_then(identifier_text),
            id: body.get("id").and_then(identifier_text),
            status: body.get("status").and_then(Value::as_str).map(str::to_string),
            aml_decision: sub("aml_decision"),
            fraud_decision: sub("fraud_decision"),
            credit_decision: sub("credit_decision"),
            income_decision: sub("income_decision"),
            bureau_tier: number("bureau_tier"),
            provisional_tier: number("provisional_tier"),
            final_tier: number("final_tier"),
        }
    }
}

impl From<Value> for DecisionResponse {
    fn from(value: Value) -> Self {
        Self::from(&value)
    }
}

/// Decision strings are used verbatim; numbers and booleans are stringified.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number_text(number)),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Integral floats print without a fraction, so `1.0` reads as `"1"`.
fn number_text(number: &Number) -> String {
    match number.as_f64() {
        Some(value) if number.is_f64() && value.fract() == 0.0 && value.abs() < 1e15 => {
            format!("{}", value as i64)
        }
        _ => number.to_string(),
    }
}

/// Identifiers must be non-empty strings, non-zero numbers, or `true`.
fn identifier_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) if number.as_f64() != Some(0.0) => Some(number_text(number)),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_object_bodies_yield_empty_response() {
        assert_eq!(DecisionResponse::from(&json!("oops")), DecisionResponse::default());
        assert_eq!(DecisionResponse::from(&Value::Null), DecisionResponse::default());
    }

    #[test]
    fn mistyped_fields_are_treated_as_absent() {
        let response = DecisionResponse::from(&json!({
            "case_id": "",
            "id": 0,
            "status": 7,
            "aml_decision": "PROCEED",
            "fraud_decision": { "decision": ["PASS"] },
            "credit_decision": { "final_tier": "3" },
        }));

        assert!(response.request_id().is_none());
        assert!(response.status.is_none());
        assert!(response.aml_decision.is_none());
        let fraud = response.fraud_decision.expect("fraud object kept");
        assert!(fraud.decision.is_none());
        let credit = response.credit_decision.expect("credit object kept");
        assert!(credit.number("final_tier").is_none());
    }

    #[test]
    fn coverage_falls_back_only_when_months_missing() {
        let response = DecisionResponse::from(&json!({
            "income_decision": { "metrics": { "coverage_months": null, "coverage": 4 } }
        }));
        assert_eq!(response.coverage_value(), Some(&json!(4)));

        let response = DecisionResponse::from(&json!({
            "income_decision": { "metrics": { "coverage_months": "6", "coverage": 4 } }
        }));
        assert_eq!(response.coverage_value(), Some(&json!("6")));
    }

    #[test]
    fn case_id_wins_over_id() {
        let response = DecisionResponse::from(&json!({ "case_id": "case-9", "id": "id-1" }));
        assert_eq!(response.request_id(), Some("case-9"));

        let response = DecisionResponse::from(&json!({ "id": 42 }));
        assert_eq!(response.request_id(), Some("42"));
    }

    #[test]
    fn integral_float_identifiers_drop_the_fraction() {
        let response = DecisionResponse::from(&json!({ "id": 1.0 }));
        assert_eq!(response.request_id(), Some("1"));

        let response = DecisionResponse::from(&json!({ "id": 2.5 }));
        assert_eq!(response.request_id(), Some("2.5"));
    }
}
