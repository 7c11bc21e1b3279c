//! Employee/vacancy eligibility matching and assignment previews for new job descriptions.
//!
//! A preview moves through validation (`no_criteria`), name → id resolution (`resolving`),
//! and an eligibility query whose counts pick the final strategy. Sessions debounce
//! recomputation and only ever publish the newest request's result.

pub mod domain;
pub mod matcher;
pub mod query;
pub mod resolver;
pub mod router;
pub mod session;

#[cfg(test)]
mod tests;

pub use domain::{
    AssignmentPreview, AssignmentStrategy, MatchCriteria, MatchSet, ResolvedCriteria,
    UnresolvedField,
};
pub use matcher::{EligibilityMatcher, PreviewPlan};
pub use query::{
    evaluate_request, EligibilityQuery, EligibilityRequest, EligibilityResponse,
    HttpEligibilityQuery, QueryError, RosterEligibilityQuery,
};
pub use resolver::{ReferenceIdResolver, ResolutionScope};
pub use router::{
    assignment_router, AssignmentPreviewRequest, AssignmentPreviewResponse, AssignmentState,
};
pub use session::{PreviewSession, PreviewState};
