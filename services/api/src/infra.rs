use credit_rules::config::AppConfig;
use credit_rules::workflows::underwriting::{NoopExplainer, UnderwritingService};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Underwriting service wired from configuration. Explanations are off until an adapter is
/// configured.
pub(crate) fn build_service(config: &AppConfig) -> UnderwritingService<NoopExplainer> {
    UnderwritingService::without_explanations(config.underwriting.mining_config())
}
