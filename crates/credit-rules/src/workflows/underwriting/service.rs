use std::sync::Arc;

use tracing::info;

use super::domain::LoanApplication;
use super::evaluation::{ApplicationDecisionResult, DecisionEngine};
use super::explain::{mine_with_explainer, Explainer, NoopExplainer};
use super::mining::{MiningConfig, MiningReport, RuleMiner};
use super::profile::DecisionProfile;
use super::validation::{validate_applications, validate_profiles, ValidationError};

/// Service composing input validation, the rule miner, and the decision engine.
pub struct UnderwritingService<E = NoopExplainer> {
    miner: RuleMiner,
    engine: DecisionEngine,
    explainer: Arc<E>,
}

impl UnderwritingService<NoopExplainer> {
    pub fn without_explanations(config: MiningConfig) -> Self {
        Self::new(config, Arc::new(NoopExplainer))
    }
}

impl<E> UnderwritingService<E>
where
    E: Explainer + 'static,
{
    pub fn new(config: MiningConfig, explainer: Arc<E>) -> Self {
        Self {
            miner: RuleMiner::new(config),
            engine: DecisionEngine::new(),
            explainer,
        }
    }

    /// Mine a candidate profile from historical applications and annotate it.
    pub fn mine(
        &self,
        applications: &[LoanApplication],
    ) -> Result<MiningReport, UnderwritingServiceError> {
        validate_applications(applications)?;

        let report = mine_with_explainer(&self.miner, applications, &*self.explainer);

        info!(
            records = report.summary_metrics.num_records_analyzed,
            rules = report.candidate_profile.rules.len(),
            "mining request completed"
        );
        Ok(report)
    }

    /// Replay profiles against applications, one result per application in input order.
    pub fn decide(
        &self,
        applications: &[LoanApplication],
        profiles: &[DecisionProfile],
    ) -> Result<Vec<ApplicationDecisionResult>, UnderwritingServiceError> {
        validate_applications(applications)?;
        validate_profiles(profiles)?;

        let results = self.engine.decide(applications, profiles);

        info!(
            applications = results.len(),
            profiles = profiles.len(),
            "decision request completed"
        );
        Ok(results)
    }
}

/// Error raised by the underwriting service.
#[derive(Debug, thiserror::Error)]
pub enum UnderwritingServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
