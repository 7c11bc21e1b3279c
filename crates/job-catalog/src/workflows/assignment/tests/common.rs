use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::config::MatcherConfig;
use crate::workflows::assignment::{
    evaluate_request, EligibilityMatcher, EligibilityQuery, EligibilityRequest,
    EligibilityResponse, MatchCriteria, QueryError,
};
use crate::workflows::roster::{EmployeeRecord, RosterSnapshot, RosterStore};

pub(super) fn employee(identifier: u64, display_name: &str) -> EmployeeRecord {
    EmployeeRecord {
        identifier,
        is_vacancy: false,
        display_name: display_name.to_string(),
        business_function_name: Some("Corporate Services".to_string()),
        business_function_id: Some(1),
        department_name: Some("Finance".to_string()),
        department_id: Some(10),
        unit_name: Some("Payroll".to_string()),
        unit_id: Some(100),
        job_function_name: Some("Accounting".to_string()),
        job_function_id: Some(1000),
        position_group_name: Some("Specialists".to_string()),
        position_group_id: Some(5000),
        grading_level: Some("M1".to_string()),
        job_title: Some("Accountant".to_string()),
        line_manager_name: Some("Grace Hopper".to_string()),
    }
}

pub(super) fn vacancy(identifier: u64) -> EmployeeRecord {
    EmployeeRecord {
        is_vacancy: true,
        display_name: "Vacant position".to_string(),
        line_manager_name: None,
        ..employee(identifier, "")
    }
}

/// Two "Finance" departments under different business functions; the Operations one
/// is listed first so unscoped scans hit it before the Corporate one.
pub(super) fn records() -> Vec<EmployeeRecord> {
    let operations = EmployeeRecord {
        business_function_name: Some("Operations".to_string()),
        business_function_id: Some(2),
        department_name: Some("FINANCE".to_string()),
        department_id: Some(20),
        unit_name: None,
        unit_id: None,
        ..employee(1, "Dana Ortiz")
    };

    let carl = EmployeeRecord {
        unit_name: Some("reporting".to_string()),
        unit_id: Some(101),
        grading_level: Some("M2".to_string()),
        department_name: Some("finance".to_string()),
        ..employee(3, "Carl Weber")
    };

    let pia = EmployeeRecord {
        job_title: Some("Payroll Officer".to_string()),
        grading_level: Some("M2".to_string()),
        ..employee(5, "Pia Lind")
    };

    vec![operations, employee(2, "Ada Byron"), carl, vacancy(4), pia]
}

pub(super) fn roster() -> RosterSnapshot {
    RosterSnapshot::new(records())
}

pub(super) fn criteria(job_title: &str) -> MatchCriteria {
    MatchCriteria {
        job_title: job_title.to_string(),
        business_function_name: "corporate services".to_string(),
        department_name: "Finance".to_string(),
        unit_name: None,
        job_function_name: "ACCOUNTING".to_string(),
        position_group_name: " Specialists ".to_string(),
        grading_levels: Vec::new(),
    }
}

pub(super) fn matcher_config() -> MatcherConfig {
    MatcherConfig {
        debounce: Duration::from_millis(1000),
        result_cap: 25,
        ..MatcherConfig::default()
    }
}

pub(super) fn matcher<Q: EligibilityQuery>(query: Arc<Q>) -> EligibilityMatcher<Q> {
    EligibilityMatcher::new(query, matcher_config())
}

/// Evaluates against a roster store, counting calls and optionally stalling
/// specific job titles.
#[derive(Default)]
pub(super) struct CountingQuery {
    store: RosterStore,
    calls: AtomicUsize,
    delays: HashMap<String, Duration>,
}

impl CountingQuery {
    pub(super) fn new(roster: RosterSnapshot) -> Self {
        Self {
            store: RosterStore::new(roster),
            ..Self::default()
        }
    }

    pub(super) fn with_delay(mut self, job_title: &str, delay: Duration) -> Self {
        self.delays.insert(job_title.to_string(), delay);
        self
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EligibilityQuery for CountingQuery {
    async fn preview(
        &self,
        request: &EligibilityRequest,
    ) -> Result<EligibilityResponse, QueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(&request.criteria.job_title) {
            tokio::time::sleep(*delay).await;
        }
        Ok(evaluate_request(&self.store.current(), request))
    }
}

pub(super) struct FailingQuery(pub(super) QueryError);

#[async_trait]
impl EligibilityQuery for FailingQuery {
    async fn preview(
        &self,
        _request: &EligibilityRequest,
    ) -> Result<EligibilityResponse, QueryError> {
        Err(self.0.clone())
    }
}

pub(super) struct StaticQuery(pub(super) EligibilityResponse);

#[async_trait]
impl EligibilityQuery for StaticQuery {
    async fn preview(
        &self,
        _request: &EligibilityRequest,
    ) -> Result<EligibilityResponse, QueryError> {
        Ok(self.0.clone())
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
