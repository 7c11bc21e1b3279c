use async_trait::async_trait;
use tracing::debug;

use super::{EligibilityQuery, EligibilityRequest, EligibilityResponse, QueryError};
use crate::workflows::assignment::domain::{AssignmentStrategy, ResolvedCriteria};
use crate::workflows::roster::{
    names_match, normalize_name, EmployeeRecord, RosterSnapshot, RosterStore,
};

/// Answers eligibility requests from the roster held in a [`RosterStore`].
#[derive(Debug, Clone, Default)]
pub struct RosterEligibilityQuery {
    store: RosterStore,
}

impl RosterEligibilityQuery {
    pub fn new(store: RosterStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EligibilityQuery for RosterEligibilityQuery {
    async fn preview(
        &self,
        request: &EligibilityRequest,
    ) -> Result<EligibilityResponse, QueryError> {
        let roster = self.store.current();
        Ok(evaluate_request(&roster, request))
    }
}

/// Evaluates a request against a snapshot. Counts are totals; lists are capped at
/// `max_results`.
pub fn evaluate_request(
    roster: &RosterSnapshot,
    request: &EligibilityRequest,
) -> EligibilityResponse {
    let criteria = &request.criteria;
    let job_title = normalize_name(&criteria.job_title);
    let grading_levels = criteria
        .grading_levels
        .iter()
        .map(|level| normalize_name(level))
        .filter(|level| !level.is_empty())
        .collect::<Vec<_>>();

    let (vacancies, employees): (Vec<&EmployeeRecord>, Vec<&EmployeeRecord>) = roster
        .records()
        .iter()
        .filter(|record| request.include_vacancies || !record.is_vacancy)
        .filter(|record| is_eligible(record, criteria, &job_title, &grading_levels))
        .partition(|record| record.is_vacancy);

    let employee_count = employees.len();
    let vacancy_count = vacancies.len();
    let total_count = employee_count + vacancy_count;

    let employees = employees
        .into_iter()
        .take(request.max_results)
        .cloned()
        .collect::<Vec<_>>();
    let remaining = request.max_results.saturating_sub(employees.len());
    let vacancies = vacancies
        .into_iter()
        .take(remaining)
        .cloned()
        .collect::<Vec<_>>();

    debug!(
        job_title = %criteria.job_title,
        employee_count,
        vacancy_count,
        "evaluated eligibility against roster"
    );

    EligibilityResponse {
        strategy: Some(AssignmentStrategy::from_total(total_count)),
        employees,
        vacancies,
        records: None,
        employee_count: Some(employee_count),
        vacancy_count: Some(vacancy_count),
        total_count: Some(total_count),
    }
}

fn is_eligible(
    record: &EmployeeRecord,
    criteria: &ResolvedCriteria,
    job_title: &str,
    grading_levels: &[String],
) -> bool {
    if record.business_function_id != Some(criteria.business_function_id)
        || record.department_id != Some(criteria.department_id)
        || record.job_function_id != Some(criteria.job_function_id)
        || record.position_group_id != Some(criteria.position_group_id)
    {
        return false;
    }

    if let Some(unit_id) = criteria.unit_id {
        if record.unit_id != Some(unit_id) {
            return false;
        }
    }

    let title_matches = record
        .job_title
        .as_deref()
        .map(|title| names_match(title, job_title))
        .unwrap_or(false);
    if !title_matches {
        return false;
    }

    grading_levels.is_empty()
        || record
            .grading_level
            .as_deref()
            .map(|level| grading_levels.contains(&normalize_name(level)))
            .unwrap_or(false)
}
