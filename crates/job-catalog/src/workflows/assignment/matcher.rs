use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::domain::{
    is_required, AssignmentPreview, MatchCriteria, ResolvedCriteria, UnresolvedField,
};
use super::query::{EligibilityQuery, EligibilityRequest};
use super::resolver::{ReferenceIdResolver, ResolutionScope};
use crate::config::MatcherConfig;
use crate::workflows::roster::{AttributeKind, RosterSnapshot};

/// Local half of a preview: either settled without the network, or ready to query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewPlan {
    Settled(AssignmentPreview),
    Query(EligibilityRequest),
}

/// Decides which roster records a new job description should be bound to.
pub struct EligibilityMatcher<Q: ?Sized> {
    query: Arc<Q>,
    config: MatcherConfig,
}

impl<Q> EligibilityMatcher<Q>
where
    Q: EligibilityQuery + ?Sized,
{
    pub fn new(query: Arc<Q>, config: MatcherConfig) -> Self {
        Self { query, config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Maps every supplied name to its id, parents first, each lookup scoped by the
    /// names already resolved in this pass.
    pub fn resolve_criteria(
        &self,
        criteria: &MatchCriteria,
        roster: &RosterSnapshot,
    ) -> Result<ResolvedCriteria, Vec<UnresolvedField>> {
        let resolver = ReferenceIdResolver::new(roster)
            .with_substring_fallback(self.config.substring_fallback);
        let mut scope = ResolutionScope::new();
        let mut ids = BTreeMap::new();
        let mut unresolved = Vec::new();

        for kind in AttributeKind::RESOLUTION_ORDER {
            let Some(name) = criteria.name_for(kind) else {
                if is_required(kind) {
                    unresolved.push(UnresolvedField {
                        kind,
                        name: String::new(),
                    });
                }
                continue;
            };
            match resolver.resolve_id(kind, name, &scope) {
                Some(id) => {
                    ids.insert(kind, id);
                    scope.push(kind, name);
                }
                None => unresolved.push(UnresolvedField {
                    kind,
                    name: name.to_string(),
                }),
            }
        }

        let required = (
            ids.get(&AttributeKind::BusinessFunction),
            ids.get(&AttributeKind::Department),
            ids.get(&AttributeKind::JobFunction),
            ids.get(&AttributeKind::PositionGroup),
        );
        match required {
            (
                Some(&business_function_id),
                Some(&department_id),
                Some(&job_function_id),
                Some(&position_group_id),
            ) if unresolved.is_empty() => Ok(ResolvedCriteria {
                job_title: criteria.job_title.trim().to_string(),
                business_function_id,
                department_id,
                unit_id: ids.get(&AttributeKind::Unit).copied(),
                job_function_id,
                position_group_id,
                grading_levels: criteria.normalized_grading_levels(),
            }),
            _ => Err(unresolved),
        }
    }

    /// Runs validation and id resolution without touching the eligibility service.
    pub fn plan(&self, criteria: &MatchCriteria, roster: &RosterSnapshot) -> PreviewPlan {
        let missing = criteria.missing_required();
        if !missing.is_empty() {
            debug!(?missing, "assignment preview waiting on required fields");
            return PreviewPlan::Settled(AssignmentPreview::no_criteria(&missing));
        }

        match self.resolve_criteria(criteria, roster) {
            Ok(resolved) => PreviewPlan::Query(EligibilityRequest {
                criteria: resolved,
                max_results: self.config.result_cap,
                include_vacancies: self.config.include_vacancies,
            }),
            Err(unresolved) => {
                let fields = unresolved
                    .iter()
                    .map(UnresolvedField::describe)
                    .collect::<Vec<_>>();
                warn!(
                    unresolved = ?fields,
                    roster_records = roster.len(),
                    "organizational names could not be mapped to ids"
                );
                PreviewPlan::Settled(AssignmentPreview::unresolved(unresolved))
            }
        }
    }

    /// Sends a planned request and classifies the response. Failures become
    /// `error` previews; nothing is returned as `Err`.
    pub async fn execute(&self, request: EligibilityRequest) -> AssignmentPreview {
        match self.query.preview(&request).await {
            Ok(response) => {
                let reported = response.strategy;
                let preview =
                    AssignmentPreview::matched(request.criteria, response.into_match_set());
                if reported.is_some_and(|strategy| strategy != preview.strategy) {
                    debug!(
                        ?reported,
                        derived = preview.strategy.label(),
                        "eligibility service strategy disagrees with counts; using counts"
                    );
                }
                info!(
                    strategy = preview.strategy.label(),
                    total = preview.total_count,
                    employees = preview.employee_count,
                    vacancies = preview.vacancy_count,
                    "assignment preview computed"
                );
                preview
            }
            Err(err) => {
                warn!(error = %err, "eligibility preview failed");
                AssignmentPreview::failed(err.user_message())
            }
        }
    }

    pub async fn compute_preview(
        &self,
        criteria: &MatchCriteria,
        roster: &RosterSnapshot,
    ) -> AssignmentPreview {
        match self.plan(criteria, roster) {
            PreviewPlan::Settled(preview) => preview,
            PreviewPlan::Query(request) => self.execute(request).await,
        }
    }
}
