//! Credit underwriting rules: mining candidate profiles from manually decided loans and
//! replaying profiles against new applications.

pub mod codec;
pub mod domain;
pub mod evaluation;
pub mod explain;
pub mod family;
pub mod mining;
pub mod profile;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use codec::{decode, encode, CodecError};
pub use domain::{
    ApplicationId, Channel, CollateralType, DecisionSource, DeclineReason, EmploymentStatus,
    LoanApplication, LoanPurpose, Outcome, PerformanceLabel, ProductType,
};
pub use evaluation::{
    ApplicationDecisionResult, DecisionEngine, ProfileDecision, ProfileDecisionResult,
    RuleEvaluation, SystemDecision, REFER_BAND,
};
pub use explain::{
    annotate, mine_with_explainer, profile_prompt, rule_prompt, Explainer, ExplanationError,
    NoopExplainer,
};
pub use family::{Predicate, RuleFamily};
pub use mining::{
    MiningConfig, MiningFloors, MiningReport, RuleMiner, SummaryMetrics,
    DEFAULT_APPROVAL_THRESHOLD,
};
pub use profile::{
    DecisionProfile, FamilyRef, PredicateError, Rule, RuleConfig, RuleId, RulePredicate,
};
pub use router::underwriting_router;
pub use service::{UnderwritingService, UnderwritingServiceError};
pub use validation::ValidationError;
