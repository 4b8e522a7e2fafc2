use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::workflows::underwriting::codec::encode;
use crate::workflows::underwriting::domain::{
    ApplicationId, Channel, DecisionSource, DeclineReason, EmploymentStatus, LoanApplication,
    LoanPurpose, Outcome, ProductType,
};
use crate::workflows::underwriting::family::{Predicate, RuleFamily};
use crate::workflows::underwriting::profile::{
    DecisionProfile, FamilyRef, Rule, RuleConfig, RuleId,
};

/// Unlabeled application that matches none of the built-in family grids.
pub(super) fn application(id: &str) -> LoanApplication {
    LoanApplication {
        application_id: ApplicationId(id.to_string()),
        application_datetime: Utc
            .with_ymd_and_hms(2024, 5, 14, 15, 30, 0)
            .single()
            .expect("valid timestamp"),
        channel: Channel::Online,
        product_type: ProductType::Personal,
        loan_purpose: LoanPurpose::DebtConsolidation,
        state: "IA".to_string(),
        loan_amount: 15_000.0,
        loan_term_months: 48,
        secured_flag: false,
        collateral_type: None,
        collateral_value: None,
        ltv_ratio: None,
        prior_relationship_flag: false,
        credit_score: 700,
        credit_history_length_years: 4.0,
        num_open_tradelines: 6,
        num_revolving_accounts: 2,
        revolving_utilization_pct: 0.45,
        num_30d_late_last_12m: 0,
        num_60d_late_last_24m: 0,
        num_90d_late_last_24m: 0,
        bankruptcy_last_7y_flag: false,
        foreclosure_last_7y_flag: false,
        collections_count: 0,
        chargeoff_count: 0,
        public_judgment_count: 0,
        inquiries_last_6m: 1,
        monthly_gross_income: 6_000.0,
        monthly_debt_payments: 2_100.0,
        dti_ratio: 0.35,
        employment_status: EmploymentStatus::EmployedFullTime,
        months_in_job: 36,
        months_in_industry: Some(60),
        decision_source: DecisionSource::Auto,
        final_decision: None,
        manual_decline_reasons: Vec::new(),
        performance_12m: None,
    }
}

pub(super) fn manual(id: &str, outcome: Outcome) -> LoanApplication {
    LoanApplication {
        decision_source: DecisionSource::Manual,
        final_decision: Some(outcome),
        ..application(id)
    }
}

pub(super) fn reason(code: &str) -> DeclineReason {
    DeclineReason {
        code: code.to_string(),
        description: format!("{code} description"),
        ecoa_category: None,
    }
}

pub(super) fn declined(id: &str, codes: &[&str]) -> LoanApplication {
    LoanApplication {
        manual_decline_reasons: codes.iter().map(|code| reason(code)).collect(),
        ..manual(id, Outcome::Decline)
    }
}

pub(super) fn late_payer(id: &str, lates: u32, outcome: Outcome, codes: &[&str]) -> LoanApplication {
    let base = match outcome {
        Outcome::Decline => declined(id, codes),
        Outcome::Approve => manual(id, Outcome::Approve),
    };
    LoanApplication {
        num_30d_late_last_12m: lates,
        ..base
    }
}

/// Nine manual decisions where two or more recent lates always led to a decline, plus one
/// auto-decided record the miner must ignore.
pub(super) fn delinquency_book() -> Vec<LoanApplication> {
    vec![
        late_payer("L-01", 3, Outcome::Decline, &["DELINQUENCY"]),
        late_payer("L-02", 3, Outcome::Decline, &["DELINQUENCY", "HIGH_DTI"]),
        late_payer("L-03", 3, Outcome::Decline, &["DELINQUENCY"]),
        late_payer("L-04", 1, Outcome::Approve, &[]),
        late_payer("L-05", 2, Outcome::Decline, &["RECENT_LATES"]),
        manual("L-06", Outcome::Approve),
        manual("L-07", Outcome::Approve),
        manual("L-08", Outcome::Approve),
        manual("L-09", Outcome::Approve),
        LoanApplication {
            num_30d_late_last_12m: 5,
            ..application("L-10")
        },
    ]
}

pub(super) fn prime(id: &str, credit_score: u32, dti_ratio: f64, outcome: Outcome) -> LoanApplication {
    LoanApplication {
        credit_score,
        dti_ratio,
        ..manual(id, outcome)
    }
}

/// Prime borrowers with low DTI were always approved; one with a 0.38 DTI was declined.
pub(super) fn prime_book() -> Vec<LoanApplication> {
    vec![
        prime("P-01", 780, 0.20, Outcome::Approve),
        prime("P-02", 790, 0.22, Outcome::Approve),
        prime("P-03", 800, 0.18, Outcome::Approve),
        prime("P-04", 780, 0.38, Outcome::Decline),
        manual("P-05", Outcome::Approve),
        manual("P-06", Outcome::Decline),
    ]
}

pub(super) fn predicate(family: RuleFamily, thresholds: &[f64]) -> Predicate {
    Predicate::new(family, thresholds.to_vec()).expect("valid predicate")
}

/// Hand-built rule carrying a structured predicate.
pub(super) fn rule(
    family: RuleFamily,
    thresholds: &[f64],
    base_score: f64,
    aligned_reason_codes: &[&str],
) -> Rule {
    let predicate = predicate(family, thresholds);
    Rule {
        id: RuleId(format!("{}:test", family.id())),
        family_id: FamilyRef::Known(family),
        name: format!("{} test rule", family.id()),
        expression: encode(&predicate),
        description: None,
        predicate: Some(predicate.into()),
        target_outcome: family.target(),
        base_score,
        suggested_weight: 1.0,
        hard_decline_suggested: false,
        support_count: 0,
        confidence: 0.0,
        aligned_reason_codes: aligned_reason_codes
            .iter()
            .map(|code| code.to_string())
            .collect(),
        explanation: None,
    }
}

pub(super) fn bind(rule: Rule, hard_decline: bool) -> RuleConfig {
    RuleConfig {
        rule,
        weight_override: 1.0,
        hard_decline,
        active: true,
    }
}

pub(super) fn profile(name: &str, approval_threshold: f64, rules: Vec<RuleConfig>) -> DecisionProfile {
    DecisionProfile {
        id: Some(format!("profile-{name}")),
        name: name.to_string(),
        description: None,
        approval_threshold,
        rules,
        created_at: None,
        source_application_ids: Vec::new(),
        explanation: None,
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn json_request(uri: &str, payload: &Value) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::post(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(payload).expect("serialize payload"),
        ))
        .expect("request builds")
}
