use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::super::domain::LoanApplication;
use super::super::profile::DecisionProfile;
use super::rules::evaluate_rule;
use super::{ProfileDecisionResult, RuleEvaluation};

/// Width of the refer band below a profile's approval threshold.
///
/// Fixed policy constant; profiles cannot configure it.
pub const REFER_BAND: f64 = 20.0;

/// Decision produced by a single profile, or by the aggregate across profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileDecision {
    Approve,
    Refer,
    Decline,
}

impl ProfileDecision {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Refer => "refer",
            Self::Decline => "decline",
        }
    }

    /// Threshold test used when no hard decline fired.
    pub fn from_score(total_score: f64, approval_threshold: f64) -> Self {
        if total_score >= approval_threshold {
            Self::Approve
        } else if total_score >= approval_threshold - REFER_BAND {
            Self::Refer
        } else {
            Self::Decline
        }
    }
}

pub(crate) fn decide_profile(
    profile: &DecisionProfile,
    application: &LoanApplication,
) -> ProfileDecisionResult {
    let mut rule_evaluations: Vec<RuleEvaluation> = Vec::new();
    let mut hard_decline_triggered = false;

    for config in profile.active_rules() {
        let evaluation = evaluate_rule(&config.rule, application, config.weight_override);
        if config.hard_decline && evaluation.fired {
            hard_decline_triggered = true;
        }
        rule_evaluations.push(evaluation);
    }

    let total_score: f64 = rule_evaluations
        .iter()
        .map(|evaluation| evaluation.rule_score)
        .sum();

    let decline_reason_codes: Vec<String> = rule_evaluations
        .iter()
        .filter(|evaluation| evaluation.fired)
        .flat_map(|evaluation| evaluation.decline_reason_codes.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let decision = if hard_decline_triggered {
        ProfileDecision::Decline
    } else {
        ProfileDecision::from_score(total_score, profile.approval_threshold)
    };

    ProfileDecisionResult {
        profile_id: profile.id.clone().unwrap_or_default(),
        profile_name: profile.name.clone(),
        total_score,
        decision,
        hard_decline_triggered,
        rule_evaluations,
        decline_reason_codes,
    }
}
