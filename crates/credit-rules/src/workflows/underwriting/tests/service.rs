use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::common::*;

use crate::workflows::underwriting::domain::{ApplicationId, LoanApplication};
use crate::workflows::underwriting::explain::{
    profile_prompt, rule_prompt, Explainer, ExplanationError, NoopExplainer,
};
use crate::workflows::underwriting::family::RuleFamily;
use crate::workflows::underwriting::mining::MiningConfig;
use crate::workflows::underwriting::profile::{DecisionProfile, Rule};
use crate::workflows::underwriting::service::{UnderwritingService, UnderwritingServiceError};
use crate::workflows::underwriting::validation::ValidationError;

#[derive(Default)]
struct ScriptedExplainer {
    calls: AtomicUsize,
}

impl Explainer for ScriptedExplainer {
    fn explain_rule(&self, rule: &Rule) -> Result<String, ExplanationError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if rule.family_id.to_string() == RuleFamily::HighScoreLowDti.id() {
            return Err(ExplanationError::Timeout);
        }
        Ok(format!("  Declines borrowers matching {}.  ", rule.expression))
    }

    fn explain_profile(&self, _profile: &DecisionProfile) -> Result<String, ExplanationError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok("   ".to_string())
    }
}

fn service() -> UnderwritingService<NoopExplainer> {
    UnderwritingService::without_explanations(MiningConfig::default())
}

#[test]
fn noop_explainer_leaves_annotations_unset() {
    let report = service().mine(&delinquency_book()).expect("mining succeeds");

    assert!(report.candidate_profile.explanation.is_none());
    assert!(report
        .candidate_profile
        .rules
        .iter()
        .all(|config| config.rule.explanation.is_none()));
}

#[test]
fn explainer_failures_are_swallowed_per_annotation() {
    let explainer = Arc::new(ScriptedExplainer::default());
    let service = UnderwritingService::new(MiningConfig::default(), explainer.clone());
    let mut records = delinquency_book();
    records.extend(prime_book());

    let report = service.mine(&records).expect("mining succeeds");
    let rules = &report.candidate_profile.rules;

    assert_eq!(rules.len(), 2);
    assert_eq!(
        rules[0].rule.explanation.as_deref(),
        Some("Declines borrowers matching num_30d_late_last_12m >= 2.")
    );
    assert!(rules[1].rule.explanation.is_none());
    assert!(report.candidate_profile.explanation.is_none());
    assert_eq!(explainer.calls.load(Ordering::Relaxed), 3);

    let plain = UnderwritingService::without_explanations(MiningConfig::default())
        .mine(&records)
        .expect("mining succeeds");
    for (annotated, bare) in rules.iter().zip(&plain.candidate_profile.rules) {
        assert_eq!(annotated.rule.id, bare.rule.id);
        assert_eq!(annotated.rule.base_score, bare.rule.base_score);
    }
}

#[test]
fn empty_profiles_are_not_sent_for_explanation() {
    let explainer = Arc::new(ScriptedExplainer::default());
    let service = UnderwritingService::new(MiningConfig::default(), explainer.clone());

    service.mine(&[application("A-1")]).expect("mining succeeds");
    assert_eq!(explainer.calls.load(Ordering::Relaxed), 0);
}

#[test]
fn mining_rejects_invalid_records_before_running() {
    let bad = LoanApplication {
        revolving_utilization_pct: 1.4,
        ..application("A-1")
    };

    let err = service().mine(&[bad]).expect_err("utilization out of range");
    let UnderwritingServiceError::Validation(validation) = err;
    assert!(matches!(
        validation,
        ValidationError::OutOfRange {
            field: "revolving_utilization_pct",
            ..
        }
    ));
}

#[test]
fn decide_rejects_blank_ids_and_bad_amounts() {
    let blank = LoanApplication {
        application_id: ApplicationId("   ".to_string()),
        ..application("A-1")
    };
    let err = service().decide(&[blank], &[]).expect_err("blank id");
    assert!(err.to_string().contains("position 0"));

    let negative = LoanApplication {
        monthly_debt_payments: -10.0,
        ..application("A-2")
    };
    let err = service().decide(&[negative], &[]).expect_err("negative amount");
    assert!(err.to_string().contains("monthly_debt_payments"));

    let infinite = LoanApplication {
        dti_ratio: f64::INFINITY,
        ..application("A-3")
    };
    assert!(service().decide(&[infinite], &[]).is_err());

    let low_score = LoanApplication {
        credit_score: 250,
        ..application("A-4")
    };
    assert!(service().decide(&[low_score], &[]).is_err());
}

#[test]
fn decide_rejects_non_finite_profile_values() {
    let mut config = bind(rule(RuleFamily::Many30dLates, &[2.0], -90.0, &[]), false);
    config.weight_override = f64::NAN;
    let profiles = vec![profile("nan", 50.0, vec![config])];

    let err = service()
        .decide(&[application("A-1")], &profiles)
        .expect_err("NaN weight");
    assert!(err.to_string().contains("weight_override"));

    let profiles = vec![profile("inf", f64::INFINITY, Vec::new())];
    assert!(service().decide(&[application("A-1")], &profiles).is_err());
}

#[test]
fn prompts_carry_rule_and_profile_context() {
    let report = service().mine(&delinquency_book()).expect("mining succeeds");
    let rule = &report.candidate_profile.rules[0].rule;

    let prompt = rule_prompt(rule);
    assert!(prompt.contains("Rule id: many_30d_lates:2"));
    assert!(prompt.contains("Target decision: decline"));
    assert!(prompt.contains("Confidence (share of matches with that decision): 1.00"));
    assert!(prompt.contains("DELINQUENCY, HIGH_DTI, RECENT_LATES"));

    let prompt = profile_prompt(&report.candidate_profile);
    assert!(prompt.contains("Profile name: Auto profile from manual decisions"));
    assert!(prompt.contains("- many_30d_lates:2: 2+ recent 30-day delinquencies"));
}
