mod families;
mod kernel;

pub use families::{grid, FamilyGrid};
pub use kernel::{accepted_points, score_from_confidence, select_best, GridPoint, MiningFloors};

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::codec::{encode, render_number};
use super::domain::{LoanApplication, Outcome};
use super::family::RuleFamily;
use super::profile::{DecisionProfile, FamilyRef, Rule, RuleConfig, RuleId};

#[cfg(test)]
pub(crate) use kernel::{grid_candidates, measure};

/// Approval threshold given to mined candidate profiles.
pub const DEFAULT_APPROVAL_THRESHOLD: f64 = 50.0;

/// Tunables for a mining pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiningConfig {
    #[serde(default = "default_approval_threshold")]
    pub approval_threshold: f64,
    /// Replaces a family's built-in support/confidence floors.
    #[serde(default)]
    pub floor_overrides: BTreeMap<RuleFamily, MiningFloors>,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            approval_threshold: DEFAULT_APPROVAL_THRESHOLD,
            floor_overrides: BTreeMap::new(),
        }
    }
}

fn default_approval_threshold() -> f64 {
    DEFAULT_APPROVAL_THRESHOLD
}

/// Counts describing the data a candidate profile was mined from.
///
/// Split and match-rate fields are reserved and always serialized as null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub num_records_analyzed: usize,
    pub num_records_train: Option<usize>,
    pub num_records_validation: Option<usize>,
    pub train_match_rate: Option<f64>,
    pub validation_match_rate: Option<f64>,
    pub train_auto_decision_rate: Option<f64>,
    pub validation_auto_decision_rate: Option<f64>,
    pub false_approvals: Option<usize>,
    pub false_declines: Option<usize>,
}

/// Output of a mining pass: an unsaved profile plus summary counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiningReport {
    pub candidate_profile: DecisionProfile,
    pub summary_metrics: SummaryMetrics,
}

/// Grid-search miner shared by every rule family.
#[derive(Debug, Clone, Default)]
pub struct RuleMiner {
    config: MiningConfig,
}

impl RuleMiner {
    pub fn new(config: MiningConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MiningConfig {
        &self.config
    }

    pub fn floors(&self, family: RuleFamily) -> MiningFloors {
        self.config
            .floor_overrides
            .get(&family)
            .copied()
            .unwrap_or(grid(family).floors)
    }

    pub fn accepted_points(
        &self,
        family: RuleFamily,
        manual: &[&LoanApplication],
    ) -> Vec<GridPoint> {
        accepted_points(manual, family, grid(family).axes, self.floors(family))
    }

    /// Mine one family from manually labeled applications; `None` when no point qualifies.
    pub fn mine_family(&self, family: RuleFamily, manual: &[&LoanApplication]) -> Option<Rule> {
        let accepted = self.accepted_points(family, manual);
        let candidates = accepted.len();
        let Some(best) = select_best(accepted) else {
            debug!(%family, records = manual.len(), "no grid point met the floors");
            return None;
        };

        debug!(
            %family,
            candidates,
            support = best.support,
            confidence = best.confidence,
            "family mined"
        );
        Some(synthesize_rule(grid(family), best, manual))
    }

    /// Mine every family and assemble a candidate profile from the rules found.
    pub fn mine(&self, applications: &[LoanApplication]) -> MiningReport {
        let manual: Vec<&LoanApplication> = applications
            .iter()
            .filter(|application| application.is_manually_labeled())
            .collect();

        if manual.is_empty() {
            info!(
                records = applications.len(),
                "no manually decided applications to mine"
            );
            return MiningReport {
                candidate_profile: DecisionProfile {
                    id: None,
                    name: "Empty profile (no manual loans available)".to_string(),
                    description: None,
                    approval_threshold: self.config.approval_threshold,
                    rules: Vec::new(),
                    created_at: None,
                    source_application_ids: Vec::new(),
                    explanation: None,
                },
                summary_metrics: SummaryMetrics::default(),
            };
        }

        let families = RuleFamily::ordered();
        let rules: Vec<Rule> = families[..]
            .par_iter()
            .filter_map(|family| self.mine_family(*family, &manual))
            .collect();

        info!(
            records = applications.len(),
            manual = manual.len(),
            rules = rules.len(),
            "rule mining complete"
        );

        let candidate_profile = DecisionProfile {
            id: None,
            name: "Auto profile from manual decisions".to_string(),
            description: Some(
                "Profile assembled automatically from manually decided loans by grid search \
                 over delinquency, score, DTI, utilization, and file-depth thresholds."
                    .to_string(),
            ),
            approval_threshold: self.config.approval_threshold,
            rules: rules.into_iter().map(RuleConfig::suggested).collect(),
            created_at: None,
            source_application_ids: manual
                .iter()
                .map(|application| application.application_id.clone())
                .collect(),
            explanation: None,
        };

        MiningReport {
            candidate_profile,
            summary_metrics: SummaryMetrics {
                num_records_analyzed: manual.len(),
                ..SummaryMetrics::default()
            },
        }
    }
}

fn synthesize_rule(grid: &FamilyGrid, best: GridPoint, manual: &[&LoanApplication]) -> Rule {
    let family = grid.family;
    let target = family.target();
    let GridPoint {
        predicate,
        support,
        confidence,
    } = best;

    let aligned_reason_codes = if target == Outcome::Decline {
        manual
            .iter()
            .filter(|application| {
                application.manual_outcome() == Some(target) && predicate.matches(application)
            })
            .flat_map(|application| application.manual_decline_reasons.iter())
            .map(|reason| reason.code.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    } else {
        Vec::new()
    };

    let id = predicate
        .clauses()
        .take(predicate.thresholds().len())
        .map(|(slot, threshold)| render_number(slot.kind, threshold))
        .collect::<Vec<_>>()
        .join("/");

    Rule {
        id: RuleId(format!("{}:{id}", family.id())),
        family_id: FamilyRef::Known(family),
        name: families::rule_name(&predicate),
        expression: encode(&predicate),
        description: families::rule_description(&predicate),
        target_outcome: target,
        base_score: score_from_confidence(confidence, target),
        suggested_weight: 1.0,
        hard_decline_suggested: grid
            .hard_decline_at
            .is_some_and(|floor| confidence >= floor),
        support_count: support,
        confidence,
        aligned_reason_codes,
        explanation: None,
        predicate: Some(predicate.into()),
    }
}
