use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Applicant data submitted to the decisioning backend.
///
/// The orchestrator treats this as opaque JSON; only [`ApplicantPayload::validate`]
/// looks inside, before a run is started.
/// Omitted keys deserialize as empty strings so validation can name them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicantPayload {
    pub user_fullname: String,
    pub user_dob: String,
    #[serde(default = "default_country")]
    pub user_country: String,
    pub ssn: String,
    pub gov_id_type: String,
    pub gov_id_number: String,
    pub address_line1: String,
    pub address_city: String,
    pub address_state: String,
    pub address_zip: String,
    pub email: String,
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    /// Test-harness knobs for the mocked backends (see [`DemoConfig`]).
    #[serde(default)]
    pub custom_fields: Map<String, Value>,
}

fn default_country() -> String {
    "US".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("Please complete all required fields.")]
    MissingFields(Vec<&'static str>),
}

impl ApplicantPayload {
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        let required: [(&'static str, &str); 11] = [
            ("user_fullname", &self.user_fullname),
            ("user_dob", &self.user_dob),
            ("ssn", &self.ssn),
            ("gov_id_type", &self.gov_id_type),
            ("gov_id_number", &self.gov_id_number),
            ("email", &self.email),
            ("phone_number", &self.phone_number),
            ("address_line1", &self.address_line1),
            ("address_city", &self.address_city),
            ("address_state", &self.address_state),
            ("address_zip", &self.address_zip),
        ];

        required
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect()
    }

    pub fn validate(&self) -> Result<(), PayloadError> {
        let missing = self.missing_required_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PayloadError::MissingFields(missing))
        }
    }

    /// Replace `custom_fields` with the knobs derived from `demo`.
    pub fn with_demo(mut self, demo: &DemoConfig) -> Self {
        self.custom_fields = demo.custom_fields();
        self
    }
}

/// Joins the street and optional apartment into the single address line the
/// backend expects.
pub fn compose_address_line(street: &str, apt: Option<&str>) -> String {
    match apt.map(str::trim).filter(|apt| !apt.is_empty()) {
        Some(apt) => format!("{street}, {apt}"),
        None => street.to_string(),
    }
}

/// End-to-end outcome requested from the mocked AML, fraud, and credit stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestScenario {
    Pass,
    Review,
    KoCompliance,
    KoFraud,
    ReviewCredit,
    KoCredit,
}

impl TestScenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestScenario::Pass => "pass",
            TestScenario::Review => "review",
            TestScenario::KoCompliance => "ko_compliance",
            TestScenario::KoFraud => "ko_fraud",
            TestScenario::ReviewCredit => "review_credit",
            TestScenario::KoCredit => "ko_credit",
        }
    }

    pub fn all() -> [TestScenario; 6] {
        [
            TestScenario::Pass,
            TestScenario::Review,
            TestScenario::KoCompliance,
            TestScenario::KoFraud,
            TestScenario::ReviewCredit,
            TestScenario::KoCredit,
        ]
    }
}

/// Preset for the mocked income-verification provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeScenario {
    #[default]
    IncomePass,
    IncomeBank,
    IncomeEmpty,
    IncomeReview,
    IncomeKo,
    IncomeError,
}

impl IncomeScenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncomeScenario::IncomePass => "income_pass",
            IncomeScenario::IncomeBank => "income_bank",
            IncomeScenario::IncomeEmpty => "income_empty",
            IncomeScenario::IncomeReview => "income_review",
            IncomeScenario::IncomeKo => "income_ko",
            IncomeScenario::IncomeError => "income_error",
        }
    }

    pub fn all() -> [IncomeScenario; 6] {
        [
            IncomeScenario::IncomePass,
            IncomeScenario::IncomeBank,
            IncomeScenario::IncomeEmpty,
            IncomeScenario::IncomeReview,
            IncomeScenario::IncomeKo,
            IncomeScenario::IncomeError,
        ]
    }

    fn force_mode(&self) -> &'static str {
        match self {
            IncomeScenario::IncomePass | IncomeScenario::IncomeReview => "payroll",
            IncomeScenario::IncomeBank | IncomeScenario::IncomeKo | IncomeScenario::IncomeError => {
                "bank"
            }
            IncomeScenario::IncomeEmpty => "empty",
        }
    }

    fn risk_profile(&self) -> &'static str {
        match self {
            IncomeScenario::IncomeReview => "suspicious",
            _ => "clean",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownScenario {
    kind: &'static str,
    value: String,
}

impl fmt::Display for UnknownScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownScenario {}

impl FromStr for TestScenario {
    type Err = UnknownScenario;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw.trim().to_ascii_lowercase();
        Self::all()
            .into_iter()
            .find(|scenario| scenario.as_str() == value)
            .ok_or(UnknownScenario {
                kind: "test scenario",
                value,
            })
    }
}

impl FromStr for IncomeScenario {
    type Err = UnknownScenario;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw.trim().to_ascii_lowercase();
        Self::all()
            .into_iter()
            .find(|scenario| scenario.as_str() == value)
            .ok_or(UnknownScenario {
                kind: "income scenario",
                value,
            })
    }
}

pub const DEFAULT_COVERAGE_MONTHS: u32 = 12;
const KO_COVERAGE_MONTHS: u32 = 2;
const INJECTED_INCOME_ERROR: &str = "RATE_LIMIT_EXCEEDED";

/// Demo controls steering the mocked backends through `custom_fields`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoConfig {
    #[serde(default)]
    pub scenario: Option<TestScenario>,
    #[serde(default)]
    pub income_scenario: IncomeScenario,
    #[serde(default = "default_coverage_months")]
    pub income_coverage_months: u32,
}

fn default_coverage_months() -> u32 {
    DEFAULT_COVERAGE_MONTHS
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            scenario: None,
            income_scenario: IncomeScenario::default(),
            income_coverage_months: DEFAULT_COVERAGE_MONTHS,
        }
    }
}

impl DemoConfig {
    pub fn custom_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(scenario) = self.scenario {
            fields.insert("scenario".to_string(), Value::from(scenario.as_str()));
        }

        let income = self.income_scenario;
        let coverage = match income {
            IncomeScenario::IncomeKo => KO_COVERAGE_MONTHS,
            _ => self.income_coverage_months,
        };

        fields.insert(
            "income_force_mode".to_string(),
            Value::from(income.force_mode()),
        );
        fields.insert(
            "income_risk_profile".to_string(),
            Value::from(income.risk_profile()),
        );
        if income == IncomeScenario::IncomeError {
            fields.insert(
                "income_inject_error".to_string(),
                Value::from(INJECTED_INCOME_ERROR),
            );
        }
        fields.insert("income_coverage_months".to_string(), Value::from(coverage));

        fields
    }
}
