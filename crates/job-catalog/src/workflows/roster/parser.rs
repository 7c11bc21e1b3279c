use serde::{Deserialize, Deserializer};
use std::io::Read;

use super::domain::EmployeeRecord;
use super::RosterImportError;

const VACANCY_PLACEHOLDER: &str = "Vacant position";

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<EmployeeRecord>, RosterImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for row in csv_reader.deserialize::<RosterRow>() {
        let row = row?;
        records.push(row.into_record()?);
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(alias = "id", alias = "employee_id")]
    identifier: u64,
    #[serde(default, alias = "isVacancy", deserialize_with = "empty_string_as_none")]
    is_vacancy: Option<String>,
    #[serde(
        default,
        alias = "displayName",
        alias = "full_name",
        deserialize_with = "empty_string_as_none"
    )]
    display_name: Option<String>,
    #[serde(
        default,
        alias = "businessFunctionName",
        deserialize_with = "empty_string_as_none"
    )]
    business_function_name: Option<String>,
    #[serde(default, alias = "businessFunctionId")]
    business_function_id: Option<u64>,
    #[serde(
        default,
        alias = "departmentName",
        deserialize_with = "empty_string_as_none"
    )]
    department_name: Option<String>,
    #[serde(default, alias = "departmentId")]
    department_id: Option<u64>,
    #[serde(default, alias = "unitName", deserialize_with = "empty_string_as_none")]
    unit_name: Option<String>,
    #[serde(default, alias = "unitId")]
    unit_id: Option<u64>,
    #[serde(
        default,
        alias = "jobFunctionName",
        deserialize_with = "empty_string_as_none"
    )]
    job_function_name: Option<String>,
    #[serde(default, alias = "jobFunctionId")]
    job_function_id: Option<u64>,
    #[serde(
        default,
        alias = "positionGroupName",
        deserialize_with = "empty_string_as_none"
    )]
    position_group_name: Option<String>,
    #[serde(default, alias = "positionGroupId")]
    position_group_id: Option<u64>,
    #[serde(
        default,
        alias = "gradingLevel",
        deserialize_with = "empty_string_as_none"
    )]
    grading_level: Option<String>,
    #[serde(default, alias = "jobTitle", deserialize_with = "empty_string_as_none")]
    job_title: Option<String>,
    #[serde(
        default,
        alias = "lineManagerName",
        deserialize_with = "empty_string_as_none"
    )]
    line_manager_name: Option<String>,
}

impl RosterRow {
    fn into_record(self) -> Result<EmployeeRecord, RosterImportError> {
        let is_vacancy = match self.is_vacancy.as_deref() {
            None => false,
            Some(raw) => parse_flag(raw).ok_or_else(|| RosterImportError::InvalidVacancyFlag {
                identifier: self.identifier,
                value: raw.to_string(),
            })?,
        };

        let display_name = match self.display_name {
            Some(name) => name,
            None if is_vacancy => VACANCY_PLACEHOLDER.to_string(),
            None => String::new(),
        };

        Ok(EmployeeRecord {
            identifier: self.identifier,
            is_vacancy,
            display_name,
            business_function_name: self.business_function_name,
            business_function_id: positive(self.business_function_id),
            department_name: self.department_name,
            department_id: positive(self.department_id),
            unit_name: self.unit_name,
            unit_id: positive(self.unit_id),
            job_function_name: self.job_function_name,
            job_function_id: positive(self.job_function_id),
            position_group_name: self.position_group_name,
            position_group_id: positive(self.position_group_id),
            grading_level: self.grading_level,
            job_title: self.job_title,
            line_manager_name: self.line_manager_name,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// Exports write `0` for "no id"; ids are positive.
fn positive(id: Option<u64>) -> Option<u64> {
    id.filter(|value| *value > 0)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
