use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::codec::CodecError;
use super::domain::{ApplicationId, Outcome};
use super::family::{Predicate, RuleFamily};

/// Stable identifier of a rule instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(pub String);

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Family tag as received on the wire.
///
/// Tags outside the closed family set are kept rather than rejected so a profile carrying
/// a rule this build cannot evaluate still scores its remaining rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FamilyRef {
    Known(RuleFamily),
    Unregistered(String),
}

impl From<String> for FamilyRef {
    fn from(value: String) -> Self {
        match RuleFamily::from_id(&value) {
            Some(family) => Self::Known(family),
            None => Self::Unregistered(value),
        }
    }
}

impl From<FamilyRef> for String {
    fn from(value: FamilyRef) -> Self {
        match value {
            FamilyRef::Known(family) => family.id().to_string(),
            FamilyRef::Unregistered(tag) => tag,
        }
    }
}

impl From<RuleFamily> for FamilyRef {
    fn from(value: RuleFamily) -> Self {
        Self::Known(value)
    }
}

impl std::fmt::Display for FamilyRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FamilyRef::Known(family) => f.write_str(family.id()),
            FamilyRef::Unregistered(tag) => f.write_str(tag),
        }
    }
}

/// Structured condition as carried on a rule.
///
/// The shape is only checked when the rule is evaluated, so one hand-authored rule with the
/// wrong family or threshold count fails on its own instead of rejecting the whole profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulePredicate {
    pub family: FamilyRef,
    pub thresholds: Vec<f64>,
}

impl RulePredicate {
    pub fn resolve(&self) -> Result<Predicate, PredicateError> {
        match &self.family {
            FamilyRef::Known(family) => Ok(Predicate::new(*family, self.thresholds.clone())?),
            FamilyRef::Unregistered(tag) => Err(PredicateError::Unregistered(tag.clone())),
        }
    }
}

impl From<Predicate> for RulePredicate {
    fn from(value: Predicate) -> Self {
        Self {
            family: value.family().into(),
            thresholds: value.thresholds().to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredicateError {
    #[error("predicate family {0} has no evaluator")]
    Unregistered(String),
    #[error(transparent)]
    Shape(#[from] CodecError),
}

/// A mined or hand-authored condition plus its scoring metadata and mining statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    pub family_id: FamilyRef,
    pub name: String,
    pub expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Structured condition; when absent the expression is decoded instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<RulePredicate>,
    pub target_outcome: Outcome,
    pub base_score: f64,
    #[serde(default = "default_weight")]
    pub suggested_weight: f64,
    #[serde(default)]
    pub hard_decline_suggested: bool,
    #[serde(default)]
    pub support_count: usize,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub aligned_reason_codes: Vec<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

/// Binding of a rule into a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub rule: Rule,
    #[serde(default = "default_weight")]
    pub weight_override: f64,
    #[serde(default)]
    pub hard_decline: bool,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl RuleConfig {
    /// Binding used for freshly mined rules.
    pub fn suggested(rule: Rule) -> Self {
        let hard_decline = rule.target_outcome == Outcome::Decline && rule.hard_decline_suggested;
        Self {
            weight_override: rule.suggested_weight,
            hard_decline,
            active: true,
            rule,
        }
    }
}

/// Weighted collection of rules plus the score needed for approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionProfile {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub approval_threshold: f64,
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source_application_ids: Vec<ApplicationId>,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl DecisionProfile {
    pub fn active_rules(&self) -> impl Iterator<Item = &RuleConfig> {
        self.rules.iter().filter(|config| config.active)
    }
}

fn default_weight() -> f64 {
    1.0
}

fn default_active() -> bool {
    true
}
