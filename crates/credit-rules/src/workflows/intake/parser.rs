use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::io::Read;

use crate::workflows::underwriting::domain::{
    ApplicationId, Channel, CollateralType, DecisionSource, DeclineReason, EmploymentStatus,
    LoanApplication, LoanPurpose, Outcome, PerformanceLabel, ProductType,
};

const REASON_SEPARATOR: char = ';';

pub(crate) fn parse_csv<R: Read>(reader: R) -> Result<Vec<LoanApplication>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut applications = Vec::new();

    for record in csv_reader.deserialize::<ApplicationRow>() {
        let row = record?;
        applications.push(row.into_application());
    }

    Ok(applications)
}

pub(crate) fn parse_json<R: Read>(reader: R) -> Result<Vec<LoanApplication>, serde_json::Error> {
    serde_json::from_reader(reader)
}

/// Flat CSV row; headers match [`LoanApplication`] field names.
#[derive(Debug, Deserialize)]
struct ApplicationRow {
    application_id: String,
    application_datetime: DateTime<Utc>,
    channel: Channel,
    product_type: ProductType,
    loan_purpose: LoanPurpose,
    state: String,
    loan_amount: f64,
    loan_term_months: u32,
    secured_flag: bool,
    #[serde(default)]
    collateral_type: Option<CollateralType>,
    #[serde(default)]
    collateral_value: Option<f64>,
    #[serde(default)]
    ltv_ratio: Option<f64>,
    prior_relationship_flag: bool,
    credit_score: u32,
    credit_history_length_years: f64,
    num_open_tradelines: u32,
    num_revolving_accounts: u32,
    revolving_utilization_pct: f64,
    num_30d_late_last_12m: u32,
    num_60d_late_last_24m: u32,
    num_90d_late_last_24m: u32,
    bankruptcy_last_7y_flag: bool,
    foreclosure_last_7y_flag: bool,
    collections_count: u32,
    chargeoff_count: u32,
    public_judgment_count: u32,
    inquiries_last_6m: u32,
    monthly_gross_income: f64,
    monthly_debt_payments: f64,
    dti_ratio: f64,
    employment_status: EmploymentStatus,
    months_in_job: u32,
    #[serde(default)]
    months_in_industry: Option<u32>,
    decision_source: DecisionSource,
    #[serde(default)]
    final_decision: Option<Outcome>,
    #[serde(default)]
    manual_decline_reasons: Option<String>,
    #[serde(default)]
    performance_12m: Option<PerformanceLabel>,
}

impl ApplicationRow {
    fn into_application(self) -> LoanApplication {
        let manual_decline_reasons = self
            .manual_decline_reasons
            .as_deref()
            .map(split_reason_codes)
            .unwrap_or_default();

        LoanApplication {
            application_id: ApplicationId(self.application_id),
            application_datetime: self.application_datetime,
            channel: self.channel,
            product_type: self.product_type,
            loan_purpose: self.loan_purpose,
            state: self.state,
            loan_amount: self.loan_amount,
            loan_term_months: self.loan_term_months,
            secured_flag: self.secured_flag,
            collateral_type: self.collateral_type,
            collateral_value: self.collateral_value,
            ltv_ratio: self.ltv_ratio,
            prior_relationship_flag: self.prior_relationship_flag,
            credit_score: self.credit_score,
            credit_history_length_years: self.credit_history_length_years,
            num_open_tradelines: self.num_open_tradelines,
            num_revolving_accounts: self.num_revolving_accounts,
            revolving_utilization_pct: self.revolving_utilization_pct,
            num_30d_late_last_12m: self.num_30d_late_last_12m,
            num_60d_late_last_24m: self.num_60d_late_last_24m,
            num_90d_late_last_24m: self.num_90d_late_last_24m,
            bankruptcy_last_7y_flag: self.bankruptcy_last_7y_flag,
            foreclosure_last_7y_flag: self.foreclosure_last_7y_flag,
            collections_count: self.collections_count,
            chargeoff_count: self.chargeoff_count,
            public_judgment_count: self.public_judgment_count,
            inquiries_last_6m: self.inquiries_last_6m,
            monthly_gross_income: self.monthly_gross_income,
            monthly_debt_payments: self.monthly_debt_payments,
            dti_ratio: self.dti_ratio,
            employment_status: self.employment_status,
            months_in_job: self.months_in_job,
            months_in_industry: self.months_in_industry,
            decision_source: self.decision_source,
            final_decision: self.final_decision,
            manual_decline_reasons,
            performance_12m: self.performance_12m,
        }
    }
}

fn split_reason_codes(raw: &str) -> Vec<DeclineReason> {
    raw.split(REASON_SEPARATOR)
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(|code| DeclineReason {
            code: code.to_string(),
            description: code.to_string(),
            ecoa_category: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_codes_split_on_semicolons() {
        let reasons = split_reason_codes("HIGH_DTI; LOW_SCORE;;");
        let codes: Vec<_> = reasons.iter().map(|reason| reason.code.as_str()).collect();
        assert_eq!(codes, vec!["HIGH_DTI", "LOW_SCORE"]);
        assert_eq!(reasons[0].description, "HIGH_DTI");
        assert!(reasons[0].ecoa_category.is_none());
    }

    #[test]
    fn blank_reason_cell_yields_no_reasons() {
        assert!(split_reason_codes("  ").is_empty());
    }
}
