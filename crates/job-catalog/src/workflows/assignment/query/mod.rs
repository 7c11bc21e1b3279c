mod http;
mod roster;

pub use http::HttpEligibilityQuery;
pub use roster::{evaluate_request, RosterEligibilityQuery};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::domain::{AssignmentStrategy, MatchSet, ResolvedCriteria};
use crate::workflows::roster::EmployeeRecord;

pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to preview employee matches";

/// Resolved criteria plus the paging/vacancy controls sent to the eligibility service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityRequest {
    #[serde(flatten)]
    pub criteria: ResolvedCriteria,
    pub max_results: usize,
    #[serde(default = "default_include_vacancies")]
    pub include_vacancies: bool,
}

fn default_include_vacancies() -> bool {
    true
}

/// Eligibility service payload.
///
/// Matches arrive either as separate `employees`/`vacancies` arrays or as one merged
/// `records` array tagged per record; counts are optional and derived when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityResponse {
    #[serde(
        default,
        deserialize_with = "lenient_strategy",
        skip_serializing_if = "Option::is_none"
    )]
    pub strategy: Option<AssignmentStrategy>,
    #[serde(default)]
    pub employees: Vec<EmployeeRecord>,
    #[serde(default)]
    pub vacancies: Vec<EmployeeRecord>,
    #[serde(
        default,
        alias = "all_records",
        alias = "matches",
        skip_serializing_if = "Option::is_none"
    )]
    pub records: Option<Vec<EmployeeRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vacancy_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<usize>,
}

/// Unrecognized strategy tags decode as absent; the matcher derives strategy from counts.
fn lenient_strategy<'de, D>(deserializer: D) -> Result<Option<AssignmentStrategy>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| serde_json::from_value(value).ok()))
}

impl EligibilityResponse {
    pub fn into_match_set(self) -> MatchSet {
        let records = match self.records {
            Some(merged) if !merged.is_empty() => merged,
            _ => {
                let mut combined = self.employees;
                combined.extend(self.vacancies);
                combined
            }
        };

        let listed_vacancies = records.iter().filter(|record| record.is_vacancy).count();
        let employee_count = self
            .employee_count
            .unwrap_or(records.len() - listed_vacancies);
        let vacancy_count = self.vacancy_count.unwrap_or(listed_vacancies);
        let total_count = self.total_count.unwrap_or(employee_count + vacancy_count);

        MatchSet {
            records,
            employee_count,
            vacancy_count,
            total_count,
        }
    }
}

/// Boundary to whatever evaluates eligibility authoritatively.
#[async_trait]
pub trait EligibilityQuery: Send + Sync {
    async fn preview(
        &self,
        request: &EligibilityRequest,
    ) -> Result<EligibilityResponse, QueryError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("eligibility service unreachable: {0}")]
    Transport(String),
    #[error("eligibility service rejected the request with status {status}")]
    Rejected {
        status: u16,
        detail: Option<String>,
        message: Option<String>,
    },
    #[error("eligibility service returned an unreadable payload: {0}")]
    Decode(String),
}

impl QueryError {
    /// Most specific text available: service detail, then message, then a generic fallback.
    pub fn user_message(&self) -> String {
        let candidates = match self {
            QueryError::Rejected {
                detail, message, ..
            } => [detail.as_deref(), message.as_deref()],
            QueryError::Transport(message) | QueryError::Decode(message) => {
                [Some(message.as_str()), None]
            }
        };
        candidates
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|text| !text.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn split_arrays_merge_employees_first() {
        let response: EligibilityResponse = serde_json::from_value(json!({
            "employees": [{ "identifier": 1, "display_name": "Ada" }],
            "vacancies": [{ "identifier": 2, "is_vacancy": true }]
        }))
        .expect("response parses");

        let matches = response.into_match_set();
        assert_eq!(
            matches
                .records
                .iter()
                .map(|record| record.identifier)
                .collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(matches.employee_count, 1);
        assert_eq!(matches.vacancy_count, 1);
        assert_eq!(matches.total_count, 2);
    }

    #[test]
    fn merged_list_is_accepted_and_counts_are_derived() {
        let response: EligibilityResponse = serde_json::from_value(json!({
            "all_records": [
                { "identifier": 3, "is_vacancy": true },
                { "identifier": 4 },
                { "identifier": 5 }
            ]
        }))
        .expect("response parses");

        let matches = response.into_match_set();
        assert_eq!(matches.records.len(), 3);
        assert_eq!(matches.employee_count, 2);
        assert_eq!(matches.vacancy_count, 1);
        assert_eq!(matches.total_count, 3);
    }

    #[test]
    fn reported_counts_override_truncated_lists() {
        let response = EligibilityResponse {
            employees: vec![EmployeeRecord {
                identifier: 9,
                ..EmployeeRecord::default()
            }],
            employee_count: Some(12),
            vacancy_count: Some(0),
            total_count: Some(12),
            ..EligibilityResponse::default()
        };

        let matches = response.into_match_set();
        assert_eq!(matches.records.len(), 1);
        assert_eq!(matches.total_count, 12);
    }

    #[test]
    fn unknown_strategy_tag_does_not_reject_response() {
        let response: EligibilityResponse = serde_json::from_value(json!({
            "strategy": "single_match",
            "employees": [{ "identifier": 1 }],
            "total_count": 1
        }))
        .expect("response parses");

        assert_eq!(response.strategy, None);
        let matches = response.into_match_set();
        assert_eq!(matches.records.len(), 1);
        assert_eq!(matches.total_count, 1);
    }

    #[test]
    fn known_strategy_tag_is_kept() {
        let response: EligibilityResponse = serde_json::from_value(json!({
            "strategy": "no_employees_found",
            "total_count": 0
        }))
        .expect("response parses");
        assert_eq!(response.strategy, Some(AssignmentStrategy::NoEmployeesFound));
    }

    #[test]
    fn user_message_prefers_detail_over_message() {
        let rejected = QueryError::Rejected {
            status: 422,
            detail: Some("Department 41 is archived".to_string()),
            message: Some("Unprocessable".to_string()),
        };
        assert_eq!(rejected.user_message(), "Department 41 is archived");

        let message_only = QueryError::Rejected {
            status: 500,
            detail: None,
            message: Some("Internal failure".to_string()),
        };
        assert_eq!(message_only.user_message(), "Internal failure");

        let bare = QueryError::Rejected {
            status: 502,
            detail: Some("  ".to_string()),
            message: None,
        };
        assert_eq!(bare.user_message(), GENERIC_FAILURE_MESSAGE);
    }
}
