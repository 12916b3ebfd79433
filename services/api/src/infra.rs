use assessment_tools::assessment::{AssessmentService, InMemoryAssessmentStore};
use assessment_tools::config::AssessmentConfig;
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type MemoryAssessmentService = AssessmentService<InMemoryAssessmentStore>;

/// Process-local store; state lives as long as the process.
pub(crate) fn in_memory_service(config: AssessmentConfig) -> Arc<MemoryAssessmentService> {
    Arc::new(AssessmentService::new(
        Arc::new(InMemoryAssessmentStore::new()),
        config,
    ))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
