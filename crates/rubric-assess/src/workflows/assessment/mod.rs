//! Application assessment against weighted rubrics.
//!
//! Assessors record one score per rubric subcategory into a ledger; progress and the weighted
//! overall score are recomputed from that ledger on demand, and the lifecycle module gates the
//! draft → in progress → completed/submitted → approved transitions. The service composes these
//! pieces over pluggable repository and rubric catalog implementations.

pub mod aggregation;
pub mod domain;
pub mod ledger;
pub mod lifecycle;
pub mod report;
pub mod repository;
pub mod router;
pub mod rubric;
pub mod service;

#[cfg(test)]
mod tests;

pub use aggregation::{AggregateScore, CategoryScore};
pub use domain::{
    ApplicationId, Assessment, AssessmentId, AssessmentRequest, AssessmentStatus, CategoryId,
    Classification, ConfidenceLevel, RubricId, ScoreInput, ScoreRecord, SubcategoryId,
};
pub use ledger::{InvalidScoreError, ScoreLedger};
pub use lifecycle::{SubmissionNotAllowedError, TransitionError};
pub use report::PortfolioSummary;
pub use repository::{AssessmentRepository, AssessmentView, RepositoryError, RubricCatalog};
pub use router::assessment_router;
pub use rubric::{
    Category, Rubric, RubricLoadError, RubricWarning, ScoringCriterion, ScoringScale, Subcategory,
};
pub use service::{
    AssessmentService, AssessmentServiceError, MissingRubricError, ScoreOutcome, Scorecard,
};
