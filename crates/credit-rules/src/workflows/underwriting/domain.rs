use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for loan applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Online,
    Branch,
    Broker,
    Phone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    Personal,
    Auto,
    SmallBusiness,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanPurpose {
    DebtConsolidation,
    HomeImprovement,
    AutoPurchase,
    Education,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollateralType {
    Vehicle,
    Savings,
    Property,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    EmployedFullTime,
    EmployedPartTime,
    SelfEmployed,
    Unemployed,
    Retired,
}

/// Who produced the recorded decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    Auto,
    Manual,
}

/// Binary underwriting outcome recorded on historical applications and targeted by rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Approve,
    Decline,
}

impl Outcome {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Decline => "decline",
        }
    }
}

/// Twelve month repayment performance, populated once the loan has seasoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceLabel {
    #[serde(rename = "good")]
    Good,
    #[serde(rename = "30d_plus_delinquent")]
    ThirtyDaysPlusDelinquent,
    #[serde(rename = "60d_plus_delinquent")]
    SixtyDaysPlusDelinquent,
    #[serde(rename = "default")]
    Default,
}

/// Adverse action reason captured by an underwriter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclineReason {
    pub code: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ecoa_category: Option<String>,
}

/// One historical or incoming loan application.
///
/// Engines only ever borrow applications; nothing in mining or evaluation mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub application_id: ApplicationId,
    pub application_datetime: DateTime<Utc>,
    pub channel: Channel,
    pub product_type: ProductType,
    pub loan_purpose: LoanPurpose,
    pub state: String,

    pub loan_amount: f64,
    pub loan_term_months: u32,
    pub secured_flag: bool,
    #[serde(default)]
    pub collateral_type: Option<CollateralType>,
    #[serde(default)]
    pub collateral_value: Option<f64>,
    #[serde(default)]
    pub ltv_ratio: Option<f64>,
    pub prior_relationship_flag: bool,

    pub credit_score: u32,
    pub credit_history_length_years: f64,
    pub num_open_tradelines: u32,
    pub num_revolving_accounts: u32,
    pub revolving_utilization_pct: f64,
    pub num_30d_late_last_12m: u32,
    pub num_60d_late_last_24m: u32,
    pub num_90d_late_last_24m: u32,
    pub bankruptcy_last_7y_flag: bool,
    pub foreclosure_last_7y_flag: bool,
    pub collections_count: u32,
    pub chargeoff_count: u32,
    pub public_judgment_count: u32,
    pub inquiries_last_6m: u32,

    pub monthly_gross_income: f64,
    pub monthly_debt_payments: f64,
    pub dti_ratio: f64,
    pub employment_status: EmploymentStatus,
    pub months_in_job: u32,
    #[serde(default)]
    pub months_in_industry: Option<u32>,

    pub decision_source: DecisionSource,
    #[serde(default)]
    pub final_decision: Option<Outcome>,
    #[serde(default)]
    pub manual_decline_reasons: Vec<DeclineReason>,
    #[serde(default)]
    pub performance_12m: Option<PerformanceLabel>,
}

impl LoanApplication {
    /// Outcome recorded by an underwriter, if this application was decided manually.
    pub fn manual_outcome(&self) -> Option<Outcome> {
        match self.decision_source {
            DecisionSource::Manual => self.final_decision,
            DecisionSource::Auto => None,
        }
    }

    pub fn is_manually_labeled(&self) -> bool {
        self.manual_outcome().is_some()
    }
}
