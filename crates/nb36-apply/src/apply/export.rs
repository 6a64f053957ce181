use std::fs;
use std::path::{Path, PathBuf};

use super::orchestrator::ApplyOutcome;
use crate::error::AppError;

/// File name of the downloadable `{report, logs}` bundle.
///
/// Backend identifiers are untrusted, so anything outside `[A-Za-z0-9._-]`
/// becomes `_`.
pub fn export_file_name(request_id: &str) -> String {
    let trimmed = request_id.trim();
    if trimmed.is_empty() {
        return "nb36-eligibility-unknown.json".to_string();
    }

    let id: String = trimmed
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("nb36-eligibility-{id}.json")
}

pub fn render_export(outcome: &ApplyOutcome) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(outcome)?)
}

/// Writes the export bundle into `dir` and returns the file path.
pub fn write_export(dir: &Path, outcome: &ApplyOutcome) -> Result<PathBuf, AppError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(&outcome.report.request_id));
    fs::write(&path, render_export(outcome)?)?;
    Ok(path)
}
