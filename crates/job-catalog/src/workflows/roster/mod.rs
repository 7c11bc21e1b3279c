//! Employee/vacancy roster: record model, CSV import, and the shared snapshot that
//! matching runs against.

pub mod domain;
mod normalizer;
mod parser;
pub mod snapshot;

pub use domain::{AttributeKind, EmployeeRecord, ReferenceEntry};
pub use snapshot::{ReferenceIndex, RosterSnapshot, RosterStore, RosterSummary};

pub(crate) use normalizer::{names_match, normalize_name};

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum RosterImportError {
    #[error("failed to read roster export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid roster CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("roster record {identifier} has an unrecognized vacancy flag '{value}'")]
    InvalidVacancyFlag { identifier: u64, value: String },
    #[error("roster identifier {0} appears more than once")]
    DuplicateIdentifier(u64),
    #[error("roster identifier must be a positive integer")]
    ZeroIdentifier,
}

pub struct RosterImporter;

impl RosterImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<RosterSnapshot, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<RosterSnapshot, RosterImportError> {
        let records = parser::parse_records(reader)?;
        let snapshot = Self::from_records(records)?;

        let summary = snapshot.summary();
        info!(
            records = summary.records,
            employees = summary.employees,
            vacancies = summary.vacancies,
            indexed_names = summary.indexed_names,
            "roster snapshot loaded"
        );

        Ok(snapshot)
    }

    /// Validates identifiers and builds the snapshot (and its reference index).
    pub fn from_records(records: Vec<EmployeeRecord>) -> Result<RosterSnapshot, RosterImportError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if record.identifier == 0 {
                return Err(RosterImportError::ZeroIdentifier);
            }
            if !seen.insert(record.identifier) {
                return Err(RosterImportError::DuplicateIdentifier(record.identifier));
            }
        }
        Ok(RosterSnapshot::new(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "identifier,is_vacancy,display_name,business_function_name,business_function_id,department_name,department_id,unit_name,unit_id,job_function_name,job_function_id,position_group_name,position_group_id,grading_level,job_title,line_manager_name";

    #[test]
    fn parses_blank_cells_as_missing() {
        let csv = format!(
            "{HEADER}\n\
1,false,Ada Byron,Corporate,1,Finance,10,,,Accounting,100,Specialists,1000,M1,Accountant,Grace Hopper\n\
2,yes,,Corporate,1,Finance,10,Payroll,20,Accounting,100,Specialists,1000,,Accountant,\n"
        );

        let snapshot = RosterImporter::from_reader(csv.as_bytes()).expect("roster imports");
        let records = snapshot.records();
        assert_eq!(records.len(), 2);

        assert!(!records[0].is_vacancy);
        assert_eq!(records[0].unit_name, None);
        assert_eq!(records[0].unit_id, None);
        assert_eq!(records[0].line_manager_name.as_deref(), Some("Grace Hopper"));

        assert!(records[1].is_vacancy);
        assert_eq!(records[1].display_name, "Vacant position");
        assert_eq!(records[1].unit_id, Some(20));
        assert_eq!(records[1].grading_level, None);

        let summary = snapshot.summary();
        assert_eq!(summary.employees, 1);
        assert_eq!(summary.vacancies, 1);
    }

    #[test]
    fn accepts_camel_case_headers() {
        let csv = "identifier,isVacancy,displayName,departmentName,departmentId\n7,0,Lin,Legal,30\n";
        let snapshot = RosterImporter::from_reader(csv.as_bytes()).expect("roster imports");
        assert_eq!(
            snapshot.index().lookup(AttributeKind::Department, "LEGAL"),
            Some(30)
        );
    }

    #[test]
    fn rejects_duplicate_identifiers() {
        let csv = "identifier,display_name\n4,A\n4,B\n";
        match RosterImporter::from_reader(csv.as_bytes()) {
            Err(RosterImportError::DuplicateIdentifier(4)) => {}
            other => panic!("expected duplicate identifier error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_vacancy_flag() {
        let csv = "identifier,is_vacancy\n5,sometimes\n";
        match RosterImporter::from_reader(csv.as_bytes()) {
            Err(RosterImportError::InvalidVacancyFlag { identifier, value }) => {
                assert_eq!(identifier, 5);
                assert_eq!(value, "sometimes");
            }
            other => panic!("expected invalid vacancy flag, got {other:?}"),
        }
    }
}
