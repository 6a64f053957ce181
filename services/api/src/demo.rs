use crate::infra::build_orchestrator;
use chrono::SecondsFormat;
use clap::Args;
use nb36_apply::apply::events::{EventSink, JSON_DOWNLOADED, REPORT_VIEWED};
use nb36_apply::apply::{
    write_export, ApplicantPayload, ApplyOutcome, CheckResult, DemoConfig, Eligibility,
    IncomeScenario, StaggerSchedule, TestScenario, TracingEventSink,
};
use nb36_apply::config::AppConfig;
use nb36_apply::error::AppError;
use nb36_apply::telemetry;
use serde_json::{json, Number};
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Default)]
pub(crate) struct ApplyArgs {
    /// Applicant JSON file. Defaults to a built-in sample applicant.
    #[arg(long)]
    pub(crate) payload: Option<PathBuf>,
    /// Mocked end-to-end outcome (pass, review, ko_compliance, ko_fraud, review_credit, ko_credit)
    #[arg(long)]
    pub(crate) scenario: Option<TestScenario>,
    /// Mocked income provider preset (income_pass, income_bank, income_empty, ...)
    #[arg(long)]
    pub(crate) income_scenario: Option<IncomeScenario>,
    /// Months of income coverage reported by the mocked provider
    #[arg(long)]
    pub(crate) coverage_months: Option<u32>,
    /// Override the configured decisioning endpoint
    #[arg(long)]
    pub(crate) endpoint: Option<String>,
    /// Comma-separated check delays in milliseconds (e.g. 350,800,1200,1600)
    #[arg(long, conflicts_with = "no_stagger")]
    pub(crate) stagger: Option<StaggerSchedule>,
    /// Publish every check update as soon as the decision arrives
    #[arg(long)]
    pub(crate) no_stagger: bool,
    /// Directory to write the JSON export into
    #[arg(long)]
    pub(crate) out: Option<PathBuf>,
}

pub(crate) async fn run_apply(args: ApplyArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let demo_requested =
        args.scenario.is_some() || args.income_scenario.is_some() || args.coverage_months.is_some();
    let demo = DemoConfig {
        scenario: args.scenario,
        income_scenario: args.income_scenario.unwrap_or_default(),
        income_coverage_months: args
            .coverage_months
            .unwrap_or(DemoConfig::default().income_coverage_months),
    };

    let payload = match &args.payload {
        Some(path) => {
            let loaded = load_payload(path)?;
            if demo_requested {
                loaded.with_demo(&demo)
            } else {
                loaded
            }
        }
        None => sample_applicant().with_demo(&demo),
    };
    payload.validate()?;

    let stagger = if args.no_stagger {
        Some(StaggerSchedule::immediate())
    } else {
        args.stagger
    };
    let orchestrator = build_orchestrator(&config.apply, args.endpoint, stagger);

    println!("NB36 apply flow");
    println!("Decisioning endpoint: {}", orchestrator.endpoint());
    println!("Applicant: {} ({})", payload.user_fullname, payload.email);
    println!("\nChecks");

    let outcome = orchestrator.run(&payload, print_update).await;
    let eligibility = Eligibility::from_outcome(&outcome);

    let events = TracingEventSink;
    render_outcome(&outcome, &eligibility);
    events.record(
        REPORT_VIEWED,
        json!({ "requestId": outcome.report.request_id }),
    );

    if let Some(dir) = args.out {
        let path = write_export(&dir, &outcome)?;
        events.record(
            JSON_DOWNLOADED,
            json!({ "requestId": outcome.report.request_id }),
        );
        println!("\nExport written to {}", path.display());
    }

    Ok(())
}

fn load_payload(path: &Path) -> Result<ApplicantPayload, AppError> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map_err(|err| AppError::Input(format!("{}: {err}", path.display())))
}

fn sample_applicant() -> ApplicantPayload {
    ApplicantPayload {
        user_fullname: "Avery Quinn".to_string(),
        user_dob: "1991-04-18".to_string(),
        user_country: "US".to_string(),
        ssn: "123-45-6789".to_string(),
        gov_id_type: "drivers_license".to_string(),
        gov_id_number: "D1234567".to_string(),
        address_line1: "1200 Market St".to_string(),
        address_city: "San Francisco".to_string(),
        address_state: "CA".to_string(),
        address_zip: "94103".to_string(),
        email: "avery.quinn@example.com".to_string(),
        phone_number: "+14155550123".to_string(),
        ip: None,
        session: None,
        custom_fields: Default::default(),
    }
}

fn print_update(update: &CheckResult) {
    if !update.status.is_terminal() {
        println!("  {:<20} {}", update.label, update.status.label());
        return;
    }
    match &update.detail {
        Some(detail) => println!(
            "  {:<20} {} ({})",
            update.label,
            update.status.label(),
            detail
        ),
        None => println!("  {:<20} {}", update.label, update.status.label()),
    }
}

fn render_outcome(outcome: &ApplyOutcome, eligibility: &Eligibility) {
    let report = &outcome.report;
    let summary = &report.summary;

    println!("\nReport {}", report.request_id);
    println!(
        "  Started {} / finished {}",
        report.started_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        report.finished_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    );
    println!(
        "  Overall: {} ({}% complete, {}/{} passed)",
        summary.overall.label(),
        summary.percent,
        summary.passed,
        summary.total
    );
    if let Some(status) = &summary.status {
        println!("  Backend status: {status}");
    }
    println!(
        "  Tiers: bureau {} | income {} | provisional {} | final {}",
        tier_label(summary.tiers.bureau.as_ref()),
        tier_label(summary.tiers.income.as_ref()),
        tier_label(summary.tiers.provisional.as_ref()),
        tier_label(summary.tiers.final_tier.as_ref())
    );

    for entry in &outcome.logs.requests {
        println!(
            "  {} {} -> HTTP {} in {} ms",
            entry.method, entry.endpoint, entry.status, entry.duration
        );
    }

    println!("\n{}", eligibility.headline);
    println!("{}", eligibility.message);
    if let Some(limit) = &eligibility.credit_limit {
        println!("  Credit limit: {}", format_currency(limit));
    }
    if let Some(tier) = &eligibility.tier {
        println!("  Tier: {tier}");
    }
    for step in &eligibility.steps {
        let mark = if step.ok { "x" } else { " " };
        println!("  [{mark}] {}", step.label);
    }
}

fn tier_label(tier: Option<&Number>) -> String {
    tier.map(ToString::to_string)
        .unwrap_or_else(|| "-".to_string())
}

fn format_currency(amount: &Number) -> String {
    match amount.as_f64() {
        Some(value) => {
            let cents = format!("{:.2}", value.abs());
            let (whole, fraction) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
            let mut grouped = String::new();
            for (index, digit) in whole.chars().enumerate() {
                if index > 0 && (whole.len() - index) % 3 == 0 {
                    grouped.push(',');
                }
                grouped.push(digit);
            }
            let sign = if value < 0.0 { "-" } else { "" };
            format!("{sign}${grouped}.{fraction}")
        }
        None => amount.to_string(),
    }
}
