use crate::infra::service_state;
use chrono::Local;
use clap::Args;
use job_catalog::config::AppConfig;
use job_catalog::error::AppError;
use job_catalog::workflows::assignment::{AssignmentPreview, AssignmentStrategy, MatchCriteria};
use job_catalog::workflows::roster::{EmployeeRecord, RosterImporter};
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct PreviewArgs {
    /// Roster CSV export to match against
    #[arg(long)]
    pub(crate) roster: PathBuf,
    /// Title of the new job description
    #[arg(long)]
    pub(crate) job_title: String,
    #[arg(long)]
    pub(crate) business_function: String,
    #[arg(long)]
    pub(crate) department: String,
    /// Optional unit narrowing the department
    #[arg(long)]
    pub(crate) unit: Option<String>,
    #[arg(long)]
    pub(crate) job_function: String,
    #[arg(long)]
    pub(crate) position_group: String,
    /// Accepted grading level; repeat for several
    #[arg(long = "grading-level")]
    pub(crate) grading_levels: Vec<String>,
    /// Print the preview as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

impl PreviewArgs {
    pub(crate) fn criteria(&self) -> MatchCriteria {
        MatchCriteria {
            job_title: self.job_title.clone(),
            business_function_name: self.business_function.clone(),
            department_name: self.department.clone(),
            unit_name: self.unit.clone(),
            job_function_name: self.job_function.clone(),
            position_group_name: self.position_group.clone(),
            grading_levels: self.grading_levels.clone(),
        }
    }
}

pub(crate) async fn run_preview(args: PreviewArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let roster = RosterImporter::from_path(&args.roster)?;
    let state = service_state(&config.matcher, roster)?;

    let criteria = args.criteria();
    let preview = state
        .matcher
        .compute_preview(&criteria, &state.roster.current())
        .await;

    if args.json {
        let payload = serde_json::to_string_pretty(&preview).map_err(std::io::Error::from)?;
        println!("{payload}");
    } else {
        print!("{}", render_preview(&args.job_title, &preview));
        println!("Evaluated {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    }
    Ok(())
}

pub(crate) fn render_preview(job_title: &str, preview: &AssignmentPreview) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Assignment preview for \"{}\"", job_title.trim());
    let _ = writeln!(out, "Strategy: {}", preview.strategy.label());
    let _ = writeln!(out, "{}", preview.message);

    if let Some(resolved) = &preview.resolved_criteria {
        let unit = resolved
            .unit_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "Resolved ids: business function {} | department {} | unit {} | \
             job function {} | position group {}",
            resolved.business_function_id,
            resolved.department_id,
            unit,
            resolved.job_function_id,
            resolved.position_group_id
        );
    }

    for field in &preview.unresolved_fields {
        let _ = writeln!(out, "  - unresolved {}", field.describe());
    }

    match preview.strategy {
        AssignmentStrategy::AutoAssignSingle | AssignmentStrategy::ManualSelectionRequired => {
            let _ = writeln!(
                out,
                "\nMatches ({} employees, {} vacancies, {} total)",
                preview.employee_count, preview.vacancy_count, preview.total_count
            );
            for record in &preview.matched_records {
                let _ = writeln!(out, "  - {}", describe_record(record));
            }
            let hidden = preview
                .total_count
                .saturating_sub(preview.matched_records.len());
            if hidden > 0 {
                let _ = writeln!(out, "  ... {hidden} more not listed");
            }
        }
        _ => {}
    }

    out
}

fn describe_record(record: &EmployeeRecord) -> String {
    let mut line = if record.is_vacancy {
        format!("#{} vacant position", record.identifier)
    } else {
        format!("#{} {}", record.identifier, record.display_name)
    };
    if let Some(level) = record.grading_level.as_deref() {
        let _ = write!(line, " [{level}]");
    }
    if let Some(manager) = record.line_manager_name.as_deref() {
        let _ = write!(line, " reports to {manager}");
    }
    line
}
