use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use job_catalog::config::{MatcherConfig, RosterConfig};
use job_catalog::error::AppError;
use job_catalog::workflows::assignment::{
    AssignmentState, EligibilityMatcher, EligibilityQuery, HttpEligibilityQuery,
    RosterEligibilityQuery,
};
use job_catalog::workflows::roster::{RosterImporter, RosterSnapshot, RosterStore};
use tracing::{info, warn};

pub(crate) const ELIGIBILITY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type ServiceState = AssignmentState<dyn EligibilityQuery>;

/// Loads the configured roster export, or starts empty until one is uploaded.
pub(crate) fn load_roster(config: &RosterConfig) -> Result<RosterSnapshot, AppError> {
    match config.csv_path.as_deref() {
        Some(path) => Ok(RosterImporter::from_path(path)?),
        None => {
            warn!("ROSTER_CSV not set; starting with an empty roster");
            Ok(RosterSnapshot::default())
        }
    }
}

/// Remote service when a URL is configured, otherwise the local roster.
pub(crate) fn eligibility_query(
    config: &MatcherConfig,
    store: &RosterStore,
) -> Result<Arc<dyn EligibilityQuery>, AppError> {
    match config.eligibility_url.as_deref() {
        Some(base_url) => {
            let query = HttpEligibilityQuery::new(base_url, ELIGIBILITY_TIMEOUT)?;
            info!(endpoint = query.endpoint(), "using remote eligibility service");
            Ok(Arc::new(query))
        }
        None => Ok(Arc::new(RosterEligibilityQuery::new(store.clone()))),
    }
}

pub(crate) fn service_state(
    config: &MatcherConfig,
    roster: RosterSnapshot,
) -> Result<ServiceState, AppError> {
    let store = RosterStore::new(roster);
    let query = eligibility_query(config, &store)?;
    Ok(AssignmentState {
        roster: store,
        matcher: Arc::new(EligibilityMatcher::new(query, config.clone())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_roster_path_is_an_error() {
        let config = RosterConfig {
            csv_path: Some(PathBuf::from("/nonexistent/roster.csv")),
        };
        assert!(matches!(load_roster(&config), Err(AppError::Roster(_))));
    }

    #[test]
    fn unset_roster_path_starts_empty() {
        let roster = load_roster(&RosterConfig::default()).expect("empty roster");
        assert!(roster.is_empty());
    }

    #[test]
    fn remote_query_is_built_from_configured_url() {
        let config = MatcherConfig {
            eligibility_url: Some("http://hr.internal:8080".to_string()),
            ..MatcherConfig::default()
        };
        let state = service_state(&config, RosterSnapshot::default()).expect("state builds");
        assert_eq!(state.matcher.config(), &config);
    }
}
