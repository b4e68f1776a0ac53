use serde::Serialize;

use super::domain::{Assessment, AssessmentId, AssessmentStatus, RubricId, ScoreRecord};
use super::rubric::Rubric;

impl Assessment {
    pub fn status_summary(&self) -> String {
        match self.status {
            AssessmentStatus::Draft => "awaiting first score".to_string(),
            AssessmentStatus::InProgress => format!("in progress ({}% scored)", self.progress),
            AssessmentStatus::Completed => "all subcategories scored, ready to submit".to_string(),
            AssessmentStatus::Submitted | AssessmentStatus::Approved => {
                let verb = self.status.label();
                match (self.classification, self.overall_score) {
                    (Some(classification), Some(score)) => {
                        format!("{verb} as {} ({score:.2})", classification.label())
                    }
                    _ => verb.to_string(),
                }
            }
        }
    }

    pub fn view(&self) -> AssessmentView {
        AssessmentView {
            assessment_id: self.id.clone(),
            rubric_id: self.rubric_id.clone(),
            status: self.status.label(),
            progress: self.progress,
            overall_score: self.overall_score,
            classification: self.classification.map(|classification| classification.label()),
            summary: self.status_summary(),
        }
    }
}

/// Storage abstraction for assessments and their score ledger.
///
/// Scores are keyed by (assessment, subcategory); `save_score` replaces any record with the
/// same key and writes the assessment header in the same step. Implementations must apply both
/// writes or neither.
pub trait AssessmentRepository: Send + Sync {
    fn insert(&self, assessment: Assessment) -> Result<Assessment, RepositoryError>;
    fn update(&self, assessment: Assessment) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &AssessmentId) -> Result<Option<Assessment>, RepositoryError>;
    fn list(&self) -> Result<Vec<Assessment>, RepositoryError>;
    fn save_score(
        &self,
        record: ScoreRecord,
        assessment: Assessment,
    ) -> Result<(), RepositoryError>;
    fn scores(&self, id: &AssessmentId) -> Result<Vec<ScoreRecord>, RepositoryError>;
}

/// Whole-tree rubric lookup.
pub trait RubricCatalog: Send + Sync {
    fn fetch(&self, id: &RubricId) -> Result<Option<Rubric>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Sanitized representation of an assessment for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentView {
    pub assessment_id: AssessmentId,
    pub rubric_id: RubricId,
    pub status: &'static str,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<&'static str>,
    pub summary: String,
}
