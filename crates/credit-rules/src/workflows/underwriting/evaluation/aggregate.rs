use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::policy::ProfileDecision;
use super::ProfileDecisionResult;

/// System-level decision for one application across every evaluated profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemDecision {
    pub final_decision: ProfileDecision,
    pub needs_manual_review: bool,
    pub aggregated_decline_reason_codes: Vec<String>,
}

/// Approve only when every profile approves; decline when something declines and nothing
/// approves; refer otherwise. Referrals always need manual review.
///
/// A referral outranks an approval: `[approve, refer]` is `refer`, not `approve`.
pub(crate) fn aggregate(results: &[ProfileDecisionResult]) -> SystemDecision {
    if results.is_empty() {
        return SystemDecision {
            final_decision: ProfileDecision::Refer,
            needs_manual_review: true,
            aggregated_decline_reason_codes: Vec::new(),
        };
    }

    let count = |decision: ProfileDecision| {
        results
            .iter()
            .filter(|result| result.decision == decision)
            .count()
    };
    let approvals = count(ProfileDecision::Approve);
    let declines = count(ProfileDecision::Decline);

    let final_decision = if approvals == results.len() {
        ProfileDecision::Approve
    } else if declines > 0 && approvals == 0 {
        ProfileDecision::Decline
    } else {
        ProfileDecision::Refer
    };

    let aggregated_decline_reason_codes = results
        .iter()
        .flat_map(|result| result.decline_reason_codes.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    SystemDecision {
        final_decision,
        needs_manual_review: final_decision == ProfileDecision::Refer,
        aggregated_decline_reason_codes,
    }
}
