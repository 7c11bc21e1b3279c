use serde::{Deserialize, Serialize};

/// Organizational attributes that carry a name/id pair on roster records.
///
/// Variants are declared parent-first; `Ord` follows that dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    BusinessFunction,
    Department,
    Unit,
    JobFunction,
    PositionGroup,
}

impl AttributeKind {
    /// Order in which names are resolved; children are scoped to their parents.
    pub const RESOLUTION_ORDER: [AttributeKind; 5] = [
        AttributeKind::BusinessFunction,
        AttributeKind::Department,
        AttributeKind::Unit,
        AttributeKind::JobFunction,
        AttributeKind::PositionGroup,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            AttributeKind::BusinessFunction => "Business Function",
            AttributeKind::Department => "Department",
            AttributeKind::Unit => "Unit",
            AttributeKind::JobFunction => "Job Function",
            AttributeKind::PositionGroup => "Position Group",
        }
    }
}

/// An employee or a vacant position as supplied by the roster provider.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub identifier: u64,
    #[serde(default)]
    pub is_vacancy: bool,
    #[serde(default)]
    pub display_name: String,
    pub business_function_name: Option<String>,
    pub business_function_id: Option<u64>,
    pub department_name: Option<String>,
    pub department_id: Option<u64>,
    pub unit_name: Option<String>,
    pub unit_id: Option<u64>,
    pub job_function_name: Option<String>,
    pub job_function_id: Option<u64>,
    pub position_group_name: Option<String>,
    pub position_group_id: Option<u64>,
    pub grading_level: Option<String>,
    pub job_title: Option<String>,
    pub line_manager_name: Option<String>,
}

impl EmployeeRecord {
    pub fn attribute_name(&self, kind: AttributeKind) -> Option<&str> {
        let name = match kind {
            AttributeKind::BusinessFunction => &self.business_function_name,
            AttributeKind::Department => &self.department_name,
            AttributeKind::Unit => &self.unit_name,
            AttributeKind::JobFunction => &self.job_function_name,
            AttributeKind::PositionGroup => &self.position_group_name,
        };
        name.as_deref()
    }

    pub fn attribute_id(&self, kind: AttributeKind) -> Option<u64> {
        match kind {
            AttributeKind::BusinessFunction => self.business_function_id,
            AttributeKind::Department => self.department_id,
            AttributeKind::Unit => self.unit_id,
            AttributeKind::JobFunction => self.job_function_id,
            AttributeKind::PositionGroup => self.position_group_id,
        }
    }
}

/// Catalog reference data (e.g. a department with no current headcount) that can
/// seed the fallback index alongside roster-derived names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub kind: AttributeKind,
    pub name: String,
    pub id: u64,
}
