use serde::{Deserialize, Serialize};

/// Progress of a single check, also reused as the overall report verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pending,
    Pass,
    Fail,
}

impl CheckStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CheckStatus::Pending => "pending",
            CheckStatus::Pass => "pass",
            CheckStatus::Fail => "fail",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, CheckStatus::Pending)
    }
}

const PASS_EXACT: [&str; 6] = ["OK", "ACCEPT", "ACCEPTED", "APPROVE", "APPROVED", "PROCEED"];
const FAIL_MARKERS: [&str; 4] = ["KO", "DECLINE", "REJECT", "REVIEW"];

/// Maps a free-text decision from the decisioning backend to a check status.
///
/// Pass markers are checked before fail markers, so `"PASS_WITH_REVIEW"`
/// resolves to [`CheckStatus::Pass`]. `REVIEW` outcomes count as failures so
/// the UI draws attention to them.
pub fn decision_to_status(decision: Option<&str>) -> CheckStatus {
    let normalized = decision.unwrap_or_default().trim().to_uppercase();
    if normalized.is_empty() {
        return CheckStatus::Pending;
    }

    if normalized.contains("PASS") || PASS_EXACT.contains(&normalized.as_str()) {
        return CheckStatus::Pass;
    }

    if FAIL_MARKERS.iter().any(|marker| normalized.contains(marker)) {
        return CheckStatus::Fail;
    }

    CheckStatus::Pending
}
