use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::workflows::roster::{normalize_name, AttributeKind, EmployeeRecord};

pub const JOB_TITLE_LABEL: &str = "Job Title";

const NO_MATCH_MESSAGE: &str =
    "No matching employees or vacancies; the job description will be created unassigned";

/// Organizational descriptor captured from the job description form.
///
/// Blank strings count as missing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchCriteria {
    pub job_title: String,
    pub business_function_name: String,
    pub department_name: String,
    pub unit_name: Option<String>,
    pub job_function_name: String,
    pub position_group_name: String,
    pub grading_levels: Vec<String>,
}

impl MatchCriteria {
    /// The supplied name for `kind`, if non-blank.
    pub fn name_for(&self, kind: AttributeKind) -> Option<&str> {
        let raw = match kind {
            AttributeKind::BusinessFunction => self.business_function_name.as_str(),
            AttributeKind::Department => self.department_name.as_str(),
            AttributeKind::Unit => self.unit_name.as_deref().unwrap_or_default(),
            AttributeKind::JobFunction => self.job_function_name.as_str(),
            AttributeKind::PositionGroup => self.position_group_name.as_str(),
        };
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Labels of required fields that are blank, in form order.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.job_title.trim().is_empty() {
            missing.push(JOB_TITLE_LABEL);
        }
        for kind in AttributeKind::RESOLUTION_ORDER {
            if is_required(kind) && self.name_for(kind).is_none() {
                missing.push(kind.label());
            }
        }
        missing
    }

    /// Grading levels trimmed and de-duplicated case-insensitively, first spelling kept.
    pub fn normalized_grading_levels(&self) -> Vec<String> {
        let mut seen = Vec::new();
        let mut levels = Vec::new();
        for level in &self.grading_levels {
            let trimmed = level.trim();
            if trimmed.is_empty() {
                continue;
            }
            let key = normalize_name(trimmed);
            if !seen.contains(&key) {
                seen.push(key);
                levels.push(trimmed.to_string());
            }
        }
        levels
    }
}

pub(crate) fn is_required(kind: AttributeKind) -> bool {
    !matches!(kind, AttributeKind::Unit)
}

/// Criteria after every organizational name has been mapped to its backend id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCriteria {
    pub job_title: String,
    pub business_function_id: u64,
    pub department_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<u64>,
    pub job_function_id: u64,
    pub position_group_id: u64,
    #[serde(default)]
    pub grading_levels: Vec<String>,
}

/// A supplied name that could not be mapped to an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedField {
    pub kind: AttributeKind,
    pub name: String,
}

impl UnresolvedField {
    pub fn describe(&self) -> String {
        format!("{} \"{}\"", self.kind.label(), self.name)
    }
}

/// Outcome of the matcher's decision process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStrategy {
    NoCriteria,
    Resolving,
    AutoAssignSingle,
    ManualSelectionRequired,
    NoEmployeesFound,
    Error,
}

impl AssignmentStrategy {
    pub const fn label(self) -> &'static str {
        match self {
            AssignmentStrategy::NoCriteria => "no_criteria",
            AssignmentStrategy::Resolving => "resolving",
            AssignmentStrategy::AutoAssignSingle => "auto_assign_single",
            AssignmentStrategy::ManualSelectionRequired => "manual_selection_required",
            AssignmentStrategy::NoEmployeesFound => "no_employees_found",
            AssignmentStrategy::Error => "error",
        }
    }

    pub fn from_total(total: usize) -> Self {
        match total {
            0 => AssignmentStrategy::NoEmployeesFound,
            1 => AssignmentStrategy::AutoAssignSingle,
            _ => AssignmentStrategy::ManualSelectionRequired,
        }
    }
}

/// Ephemeral, strategy-tagged result rendered by the job description form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentPreview {
    pub strategy: AssignmentStrategy,
    pub matched_records: Vec<EmployeeRecord>,
    pub employee_count: usize,
    pub vacancy_count: usize,
    pub total_count: usize,
    pub requires_manual_selection: bool,
    pub message: String,
    pub resolved_criteria: Option<ResolvedCriteria>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unresolved_fields: Vec<UnresolvedField>,
}

impl AssignmentPreview {
    fn empty(strategy: AssignmentStrategy, message: String) -> Self {
        Self {
            strategy,
            matched_records: Vec::new(),
            employee_count: 0,
            vacancy_count: 0,
            total_count: 0,
            requires_manual_selection: false,
            message,
            resolved_criteria: None,
            unresolved_fields: Vec::new(),
        }
    }

    pub fn no_criteria(missing: &[&str]) -> Self {
        Self::empty(
            AssignmentStrategy::NoCriteria,
            format!(
                "Complete the required fields to preview matching employees: {}",
                missing.join(", ")
            ),
        )
    }

    pub fn unresolved(fields: Vec<UnresolvedField>) -> Self {
        let described = fields
            .iter()
            .map(UnresolvedField::describe)
            .collect::<Vec<_>>()
            .join(", ");
        let mut preview = Self::empty(
            AssignmentStrategy::Resolving,
            format!("Could not resolve organizational references: {described}"),
        );
        preview.unresolved_fields = fields;
        preview
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::empty(AssignmentStrategy::Error, message.into())
    }

    pub fn matched(criteria: ResolvedCriteria, matches: MatchSet) -> Self {
        let matches = matches.reconciled();
        let strategy = AssignmentStrategy::from_total(matches.total_count);
        let message = match strategy {
            AssignmentStrategy::AutoAssignSingle => match matches.records.first() {
                Some(record) if record.is_vacancy => format!(
                    "Job description will be assigned to vacant position #{}",
                    record.identifier
                ),
                Some(record) => format!(
                    "Job description will be assigned to {}",
                    record.display_name
                ),
                None => NO_MATCH_MESSAGE.to_string(),
            },
            AssignmentStrategy::ManualSelectionRequired => format!(
                "{} matching records found ({} employees, {} vacancies); select one to assign",
                matches.total_count, matches.employee_count, matches.vacancy_count
            ),
            _ => NO_MATCH_MESSAGE.to_string(),
        };

        Self {
            strategy,
            matched_records: matches.records,
            employee_count: matches.employee_count,
            vacancy_count: matches.vacancy_count,
            total_count: matches.total_count,
            requires_manual_selection: strategy == AssignmentStrategy::ManualSelectionRequired,
            message,
            resolved_criteria: Some(criteria),
            unresolved_fields: Vec::new(),
        }
    }

    /// The single assignment target, when the strategy allows auto-assignment.
    pub fn assignment_target(&self) -> Option<&EmployeeRecord> {
        match self.strategy {
            AssignmentStrategy::AutoAssignSingle => self.matched_records.first(),
            _ => None,
        }
    }
}

/// Matched records and counts as interpreted from an eligibility response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    pub records: Vec<EmployeeRecord>,
    pub employee_count: usize,
    pub vacancy_count: usize,
    pub total_count: usize,
}

impl MatchSet {
    /// A single reported match is only assignable when exactly that record is listed;
    /// otherwise the counts are rebuilt from the listed records.
    fn reconciled(self) -> Self {
        if self.total_count != 1 || self.records.len() == 1 {
            return self;
        }
        let vacancy_count = self.records.iter().filter(|record| record.is_vacancy).count();
        warn!(
            reported_total = self.total_count,
            listed = self.records.len(),
            "single reported match does not agree with listed records"
        );
        Self {
            employee_count: self.records.len() - vacancy_count,
            vacancy_count,
            total_count: self.records.len(),
            records: self.records,
        }
    }
}
