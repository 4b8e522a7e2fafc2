//! Narrative annotations for mined rules and profiles.
//!
//! Explanations are written after mining completes and only ever fill the `explanation`
//! fields. Any failure leaves the field unset.

use tracing::{debug, warn};

use super::domain::LoanApplication;
use super::mining::{MiningReport, RuleMiner};
use super::profile::{DecisionProfile, Rule};

#[derive(Debug, thiserror::Error)]
pub enum ExplanationError {
    #[error("explanations are disabled")]
    Disabled,
    #[error("explanation backend unavailable: {0}")]
    Unavailable(String),
    #[error("explanation backend timed out")]
    Timeout,
    #[error("explanation backend returned no usable text")]
    Empty,
}

/// Adapter to whatever produces narrative text (typically a chat-completion endpoint).
pub trait Explainer: Send + Sync {
    fn explain_rule(&self, rule: &Rule) -> Result<String, ExplanationError>;
    fn explain_profile(&self, profile: &DecisionProfile) -> Result<String, ExplanationError>;
}

/// Default explainer that never annotates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopExplainer;

impl Explainer for NoopExplainer {
    fn explain_rule(&self, _rule: &Rule) -> Result<String, ExplanationError> {
        Err(ExplanationError::Disabled)
    }

    fn explain_profile(&self, _profile: &DecisionProfile) -> Result<String, ExplanationError> {
        Err(ExplanationError::Disabled)
    }
}

pub fn rule_prompt(rule: &Rule) -> String {
    let codes = if rule.aligned_reason_codes.is_empty() {
        "none".to_string()
    } else {
        rule.aligned_reason_codes.join(", ")
    };

    format!(
        "Explain the following candidate decision rule in 3-5 sentences of plain language.\n\
         Focus on which applicants it covers, why it leads to {target}, and caveats an \
         underwriter should keep in mind.\n\n\
         Rule id: {id}\n\
         Family: {family}\n\
         Name: {name}\n\
         Expression: {expression}\n\
         Target decision: {target}\n\
         Support (matching loans): {support}\n\
         Confidence (share of matches with that decision): {confidence:.2}\n\
         Aligned decline reason codes: {codes}",
        id = rule.id,
        family = rule.family_id,
        name = rule.name,
        expression = rule.expression,
        target = rule.target_outcome.label(),
        support = rule.support_count,
        confidence = rule.confidence,
    )
}

pub fn profile_prompt(profile: &DecisionProfile) -> String {
    let rules = if profile.rules.is_empty() {
        "No rules.".to_string()
    } else {
        profile
            .rules
            .iter()
            .map(|config| {
                format!(
                    "- {}: {} | expr: {} | target: {} | score: {}",
                    config.rule.id,
                    config.rule.name,
                    config.rule.expression,
                    config.rule.target_outcome.label(),
                    config.rule.base_score
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "A decision profile is a set of scored rules; the total score is compared with an \
         approval threshold.\nExplain the profile below in 4-6 sentences: who it approves or \
         declines, how conservative it is, and its obvious strengths and weaknesses.\n\n\
         Profile name: {name}\n\
         Description: {description}\n\
         Approval threshold: {threshold}\n\n\
         Rules:\n{rules}",
        name = profile.name,
        description = profile.description.as_deref().unwrap_or("None"),
        threshold = profile.approval_threshold,
    )
}

/// Run the deterministic miner, then annotate its output.
pub fn mine_with_explainer(
    miner: &RuleMiner,
    applications: &[LoanApplication],
    explainer: &dyn Explainer,
) -> MiningReport {
    let mut report = miner.mine(applications);
    annotate(&mut report, explainer);
    report
}

/// Fill explanation fields on a finished mining report, best effort.
pub fn annotate(report: &mut MiningReport, explainer: &dyn Explainer) {
    let profile = &mut report.candidate_profile;
    if profile.rules.is_empty() {
        return;
    }

    for config in &mut profile.rules {
        let result = explainer.explain_rule(&config.rule);
        config.rule.explanation = accept(result, config.rule.id.0.as_str());
    }

    let result = explainer.explain_profile(profile);
    profile.explanation = accept(result, profile.name.as_str());
}

fn accept(result: Result<String, ExplanationError>, subject: &str) -> Option<String> {
    match result {
        Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Ok(_) => {
            warn!(subject, error = %ExplanationError::Empty, "explanation discarded");
            None
        }
        Err(ExplanationError::Disabled) => {
            debug!(subject, "explanations disabled");
            None
        }
        Err(err) => {
            warn!(subject, error = %err, "explanation failed");
            None
        }
    }
}
