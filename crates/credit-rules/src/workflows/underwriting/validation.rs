use super::domain::LoanApplication;
use super::profile::DecisionProfile;

pub const MIN_CREDIT_SCORE: u32 = 300;
pub const MAX_CREDIT_SCORE: u32 = 850;

/// Request-level rejection raised before any engine logic runs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("application at position {index} has an empty application_id")]
    MissingApplicationId { index: usize },
    #[error("application {application_id}: {field} must be finite and non-negative (got {value})")]
    InvalidAmount {
        application_id: String,
        field: &'static str,
        value: f64,
    },
    #[error("application {application_id}: {field} must be within {min}..={max} (got {value})")]
    OutOfRange {
        application_id: String,
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("profile '{profile}': {field} must be finite (got {value})")]
    NonFiniteProfileValue {
        profile: String,
        field: String,
        value: f64,
    },
}

pub fn validate_applications(applications: &[LoanApplication]) -> Result<(), ValidationError> {
    for (index, application) in applications.iter().enumerate() {
        validate_application(index, application)?;
    }
    Ok(())
}

fn validate_application(index: usize, application: &LoanApplication) -> Result<(), ValidationError> {
    if application.application_id.0.trim().is_empty() {
        return Err(ValidationError::MissingApplicationId { index });
    }

    let id = || application.application_id.0.clone();

    let amounts = [
        ("loan_amount", Some(application.loan_amount)),
        ("collateral_value", application.collateral_value),
        ("ltv_ratio", application.ltv_ratio),
        (
            "credit_history_length_years",
            Some(application.credit_history_length_years),
        ),
        ("monthly_gross_income", Some(application.monthly_gross_income)),
        ("monthly_debt_payments", Some(application.monthly_debt_payments)),
        ("dti_ratio", Some(application.dti_ratio)),
    ];
    for (field, value) in amounts {
        if let Some(value) = value {
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::InvalidAmount {
                    application_id: id(),
                    field,
                    value,
                });
            }
        }
    }

    let utilization = application.revolving_utilization_pct;
    if !(0.0..=1.0).contains(&utilization) {
        return Err(ValidationError::OutOfRange {
            application_id: id(),
            field: "revolving_utilization_pct",
            min: 0.0,
            max: 1.0,
            value: utilization,
        });
    }

    if !(MIN_CREDIT_SCORE..=MAX_CREDIT_SCORE).contains(&application.credit_score) {
        return Err(ValidationError::OutOfRange {
            application_id: id(),
            field: "credit_score",
            min: f64::from(MIN_CREDIT_SCORE),
            max: f64::from(MAX_CREDIT_SCORE),
            value: f64::from(application.credit_score),
        });
    }

    Ok(())
}

pub fn validate_profiles(profiles: &[DecisionProfile]) -> Result<(), ValidationError> {
    for profile in profiles {
        let non_finite = |field: String, value: f64| ValidationError::NonFiniteProfileValue {
            profile: profile.name.clone(),
            field,
            value,
        };

        if !profile.approval_threshold.is_finite() {
            return Err(non_finite(
                "approval_threshold".to_string(),
                profile.approval_threshold,
            ));
        }

        for config in &profile.rules {
            if !config.weight_override.is_finite() {
                return Err(non_finite(
                    format!("weight_override of rule {}", config.rule.id),
                    config.weight_override,
                ));
            }
            if !config.rule.base_score.is_finite() {
                return Err(non_finite(
                    format!("base_score of rule {}", config.rule.id),
                    config.rule.base_score,
                ));
            }
        }
    }
    Ok(())
}
