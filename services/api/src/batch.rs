use crate::infra::build_service;
use clap::Args;
use credit_rules::config::AppConfig;
use credit_rules::error::AppError;
use credit_rules::workflows::intake::{load_profiles, ApplicationImporter};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct MineArgs {
    /// Historical applications (JSON array, or CSV when the file ends in .csv)
    #[arg(long)]
    pub(crate) records: PathBuf,
    /// Approval threshold for the candidate profile (defaults to APP_APPROVAL_THRESHOLD)
    #[arg(long)]
    pub(crate) approval_threshold: Option<f64>,
    /// Write the report here instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct DecideArgs {
    /// Applications to decide (JSON array, or CSV when the file ends in .csv)
    #[arg(long)]
    pub(crate) records: PathBuf,
    /// JSON array of decision profiles
    #[arg(long)]
    pub(crate) profiles: PathBuf,
    /// Write the results here instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) fn run_mine(args: MineArgs) -> Result<(), AppError> {
    let MineArgs {
        records,
        approval_threshold,
        output,
    } = args;

    let mut config = AppConfig::load()?;
    if let Some(threshold) = approval_threshold {
        config.underwriting.set_approval_threshold(threshold)?;
    }

    let applications = ApplicationImporter::from_path(&records)?;
    let report = build_service(&config).mine(&applications)?;

    emit(&report, output.as_deref())
}

pub(crate) fn run_decide(args: DecideArgs) -> Result<(), AppError> {
    let DecideArgs {
        records,
        profiles,
        output,
    } = args;

    let config = AppConfig::load()?;
    let applications = ApplicationImporter::from_path(&records)?;
    let profiles = load_profiles(&profiles)?;
    let results = build_service(&config).decide(&applications, &profiles)?;

    emit(&results, output.as_deref())
}

fn emit<T: Serialize>(value: &T, output: Option<&Path>) -> Result<(), AppError> {
    match output {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            write_json(file, value)
        }
        None => write_json(std::io::stdout().lock(), value),
    }
}

fn write_json<W: Write, T: Serialize>(mut writer: W, value: &T) -> Result<(), AppError> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use credit_rules::config::ConfigError;
    use serde_json::Value;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "credit-rules-batch-{name}-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    #[test]
    fn write_json_appends_a_newline() {
        let mut buffer = Vec::new();
        write_json(&mut buffer, &serde_json::json!({ "ok": true })).expect("writes");
        let text = String::from_utf8(buffer).expect("utf8");
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn decide_writes_results_for_each_record() {
        let dir = scratch_dir("decide");
        let records = dir.join("records.json");
        let profiles = dir.join("profiles.json");
        let output = dir.join("results.json");

        std::fs::write(
            &records,
            r#"[{
                "application_id": "B-1",
                "application_datetime": "2024-04-01T08:00:00Z",
                "channel": "online",
                "product_type": "personal",
                "loan_purpose": "education",
                "state": "MN",
                "loan_amount": 8000,
                "loan_term_months": 36,
                "secured_flag": false,
                "prior_relationship_flag": false,
                "credit_score": 765,
                "credit_history_length_years": 9,
                "num_open_tradelines": 6,
                "num_revolving_accounts": 3,
                "revolving_utilization_pct": 0.18,
                "num_30d_late_last_12m": 0,
                "num_60d_late_last_24m": 0,
                "num_90d_late_last_24m": 0,
                "bankruptcy_last_7y_flag": false,
                "foreclosure_last_7y_flag": false,
                "collections_count": 0,
                "chargeoff_count": 0,
                "public_judgment_count": 0,
                "inquiries_last_6m": 1,
                "monthly_gross_income": 8000,
                "monthly_debt_payments": 1600,
                "dti_ratio": 0.20,
                "employment_status": "employed_full_time",
                "months_in_job": 50,
                "decision_source": "auto"
            }]"#,
        )
        .expect("write records");
        std::fs::write(
            &profiles,
            r#"[{
                "name": "prime",
                "approval_threshold": 50,
                "rules": [{
                    "rule": {
                        "id": "prime-1",
                        "family_id": "high_score_low_dti",
                        "name": "Prime",
                        "expression": "credit_score >= 740 and dti_ratio <= 0.25",
                        "target_outcome": "approve",
                        "base_score": 80
                    }
                }]
            }]"#,
        )
        .expect("write profiles");

        run_decide(DecideArgs {
            records,
            profiles,
            output: Some(output.clone()),
        })
        .expect("decide runs");

        let results: Value =
            serde_json::from_str(&std::fs::read_to_string(&output).expect("read output"))
                .expect("json output");
        assert_eq!(results[0]["application_id"], "B-1");
        assert_eq!(results[0]["final_decision"], "approve");

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn mine_rejects_a_non_finite_threshold_before_reading_records() {
        let dir = scratch_dir("mine-nan");
        let output = dir.join("report.json");

        let err = run_mine(MineArgs {
            records: PathBuf::from("/nonexistent/records.json"),
            approval_threshold: Some(f64::NAN),
            output: Some(output.clone()),
        })
        .expect_err("NaN threshold");

        assert!(matches!(
            err,
            AppError::Config(ConfigError::InvalidApprovalThreshold { .. })
        ));
        assert!(!output.exists());

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn missing_records_file_is_an_import_error() {
        let err = run_decide(DecideArgs {
            records: PathBuf::from("/nonexistent/records.json"),
            profiles: PathBuf::from("/nonexistent/profiles.json"),
            output: None,
        })
        .expect_err("missing file");
        assert!(matches!(err, AppError::Import(_)));
    }
}
