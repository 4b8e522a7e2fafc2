mod aggregate;
mod policy;
mod rules;

pub use aggregate::SystemDecision;
pub use policy::{ProfileDecision, REFER_BAND};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{ApplicationId, DecisionSource, DeclineReason, LoanApplication, Outcome};
use super::profile::{DecisionProfile, Rule, RuleId};

/// Outcome of replaying one rule against one application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEvaluation {
    pub rule_id: RuleId,
    pub rule_name: String,
    pub fired: bool,
    pub rule_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_details: Option<String>,
    #[serde(default)]
    pub decline_reason_codes: Vec<String>,
}

/// One profile's verdict on one application, with the full rule trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDecisionResult {
    pub profile_id: String,
    pub profile_name: String,
    pub total_score: f64,
    pub decision: ProfileDecision,
    pub hard_decline_triggered: bool,
    pub rule_evaluations: Vec<RuleEvaluation>,
    pub decline_reason_codes: Vec<String>,
}

/// Per-application output of [`DecisionEngine::decide`].
///
/// Manual labels are copied through untouched so callers can compare them with the system
/// decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationDecisionResult {
    pub application_id: ApplicationId,
    pub manual_decision_source: DecisionSource,
    pub manual_final_decision: Option<Outcome>,
    pub manual_decline_reasons: Vec<DeclineReason>,
    pub profile_results: Vec<ProfileDecisionResult>,
    pub final_decision: ProfileDecision,
    pub needs_manual_review: bool,
    pub aggregated_decline_reason_codes: Vec<String>,
}

/// Stateless evaluator applying profiles to applications.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionEngine;

impl DecisionEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate_rule(
        &self,
        rule: &Rule,
        application: &LoanApplication,
        weight_override: f64,
    ) -> RuleEvaluation {
        rules::evaluate_rule(rule, application, weight_override)
    }

    pub fn evaluate_profile(
        &self,
        profile: &DecisionProfile,
        application: &LoanApplication,
    ) -> ProfileDecisionResult {
        policy::decide_profile(profile, application)
    }

    pub fn aggregate(&self, results: &[ProfileDecisionResult]) -> SystemDecision {
        aggregate::aggregate(results)
    }

    /// Evaluate every profile against one application and aggregate the verdicts.
    pub fn decide_one(
        &self,
        application: &LoanApplication,
        profiles: &[DecisionProfile],
    ) -> ApplicationDecisionResult {
        let profile_results: Vec<ProfileDecisionResult> = profiles
            .iter()
            .map(|profile| self.evaluate_profile(profile, application))
            .collect();

        let SystemDecision {
            final_decision,
            needs_manual_review,
            aggregated_decline_reason_codes,
        } = self.aggregate(&profile_results);

        debug!(
            application_id = %application.application_id,
            decision = final_decision.label(),
            needs_manual_review,
            "application decided"
        );

        ApplicationDecisionResult {
            application_id: application.application_id.clone(),
            manual_decision_source: application.decision_source,
            manual_final_decision: application.final_decision,
            manual_decline_reasons: application.manual_decline_reasons.clone(),
            profile_results,
            final_decision,
            needs_manual_review,
            aggregated_decline_reason_codes,
        }
    }

    /// Decide every application, preserving input order.
    pub fn decide(
        &self,
        applications: &[LoanApplication],
        profiles: &[DecisionProfile],
    ) -> Vec<ApplicationDecisionResult> {
        applications
            .par_iter()
            .map(|application| self.decide_one(application, profiles))
            .collect()
    }
}
