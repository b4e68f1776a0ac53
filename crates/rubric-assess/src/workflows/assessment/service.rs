use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::aggregation::{self, AggregateScore};
use super::domain::{
    Assessment, AssessmentId, AssessmentRequest, Classification, RubricId, ScoreInput,
    ScoreRecord, SubcategoryId,
};
use super::ledger::{InvalidScoreError, ScoreLedger};
use super::lifecycle::{self, SubmissionNotAllowedError, TransitionError};
use super::report::PortfolioSummary;
use super::repository::{AssessmentRepository, RepositoryError, RubricCatalog};
use super::rubric::Rubric;

/// Service composing the rubric catalog, the assessment repository, and the scoring engine.
///
/// Mutations of a single assessment (score writes and status transitions) run inside a
/// per-assessment critical section, so two concurrent submissions cannot both succeed.
pub struct AssessmentService<R, C> {
    repository: Arc<R>,
    catalog: Arc<C>,
    sequence: AtomicU64,
    locks: Mutex<HashMap<AssessmentId, Arc<Mutex<()>>>>,
}

/// Saved score together with the assessment state it produced.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreOutcome {
    pub record: ScoreRecord,
    pub assessment: Assessment,
}

/// Aggregation snapshot for an assessment. `degraded` is set when the rubric could not be
/// fetched, in which case the figures are zeroed.
#[derive(Debug, Clone, Serialize)]
pub struct Scorecard {
    pub assessment_id: AssessmentId,
    pub rubric_id: RubricId,
    #[serde(flatten)]
    pub aggregate: AggregateScore,
    pub projected_classification: Classification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<MissingRubricError>,
}

impl Scorecard {
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

impl<R, C> AssessmentService<R, C>
where
    R: AssessmentRepository + 'static,
    C: RubricCatalog + 'static,
{
    pub fn new(repository: Arc<R>, catalog: Arc<C>) -> Self {
        Self {
            repository,
            catalog,
            sequence: AtomicU64::new(1),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Open a draft assessment against an existing rubric.
    pub fn start(
        &self,
        request: AssessmentRequest,
    ) -> Result<Assessment, AssessmentServiceError> {
        let id = self.next_assessment_id();
        if self.catalog.fetch(&request.rubric_id)?.is_none() {
            return Err(MissingRubricError {
                assessment_id: id,
                rubric_id: request.rubric_id,
            }
            .into());
        }

        let assessment = Assessment::draft(id, request, Utc::now());
        let stored = self.repository.insert(assessment)?;
        info!(assessment_id = %stored.id, rubric_id = %stored.rubric_id, "assessment opened");
        Ok(stored)
    }

    pub fn get(&self, id: &AssessmentId) -> Result<Assessment, AssessmentServiceError> {
        let assessment = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(assessment)
    }

    pub fn list(&self) -> Result<Vec<Assessment>, AssessmentServiceError> {
        Ok(self.repository.list()?)
    }

    /// Validate and save a score, then refresh progress and the draft status.
    pub fn record_score(
        &self,
        id: &AssessmentId,
        input: ScoreInput,
    ) -> Result<ScoreOutcome, AssessmentServiceError> {
        self.get(id)?;
        let lock = self.lock_for(id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let assessment = self.get(id)?;
        lifecycle::ensure_scorable(&assessment)?;
        let rubric = self.rubric_for(&assessment)?;

        let mut ledger = ScoreLedger::from_records(self.repository.scores(id)?);
        let now = Utc::now();
        let record = ledger.upsert(&rubric, id, input, now)?;

        let progress = aggregation::progress(&rubric, &ledger.list_for(id));
        let next = lifecycle::record_score(&assessment, progress, now);
        self.repository.save_score(record.clone(), next.clone())?;
        if next.status != assessment.status {
            info!(
                assessment_id = %id,
                from = assessment.status.label(),
                to = next.status.label(),
                "assessment status changed"
            );
        }

        Ok(ScoreOutcome {
            record,
            assessment: next,
        })
    }

    pub fn score(
        &self,
        id: &AssessmentId,
        subcategory_id: &SubcategoryId,
    ) -> Result<Option<ScoreRecord>, AssessmentServiceError> {
        let ledger = ScoreLedger::from_records(self.repository.scores(id)?);
        Ok(ledger.get(id, subcategory_id).cloned())
    }

    pub fn scores(&self, id: &AssessmentId) -> Result<Vec<ScoreRecord>, AssessmentServiceError> {
        let ledger = ScoreLedger::from_records(self.repository.scores(id)?);
        Ok(ledger.list_for(id))
    }

    /// Whether saving `candidate` would change anything; lets callers skip no-op saves.
    pub fn has_changes(
        &self,
        id: &AssessmentId,
        candidate: &ScoreInput,
    ) -> Result<bool, AssessmentServiceError> {
        let ledger = ScoreLedger::from_records(self.repository.scores(id)?);
        Ok(ledger.has_changes(id, candidate))
    }

    /// Recompute progress and scores from the current ledger. A missing rubric yields a zeroed,
    /// degraded scorecard instead of an error.
    pub fn scorecard(&self, id: &AssessmentId) -> Result<Scorecard, AssessmentServiceError> {
        let assessment = self.get(id)?;

        let (aggregate, degraded) = match self.rubric_for(&assessment) {
            Ok(rubric) => {
                let records = self.scores(id)?;
                (aggregation::aggregate(&rubric, &records), None)
            }
            Err(AssessmentServiceError::MissingRubric(missing)) => {
                warn!(assessment_id = %id, rubric_id = %assessment.rubric_id, "scorecard degraded: rubric missing");
                (AggregateScore::empty(), Some(missing))
            }
            Err(other) => return Err(other),
        };

        Ok(Scorecard {
            assessment_id: assessment.id,
            rubric_id: assessment.rubric_id,
            projected_classification: Classification::from_score(aggregate.overall_score),
            aggregate,
            degraded,
        })
    }

    pub fn complete(&self, id: &AssessmentId) -> Result<Assessment, AssessmentServiceError> {
        self.get(id)?;
        let lock = self.lock_for(id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let assessment = self.get(id)?;
        let rubric = self.rubric_for(&assessment)?;
        let records = self.scores(id)?;

        let next = lifecycle::complete(&assessment, &rubric, &records, Utc::now())?;
        self.repository.update(next.clone())?;
        info!(assessment_id = %id, "assessment completed");
        Ok(next)
    }

    /// Submit a fully scored assessment. The new status, score, classification and timestamps
    /// are persisted in a single update, and only when every guard passes.
    pub fn submit(&self, id: &AssessmentId) -> Result<Assessment, AssessmentServiceError> {
        self.get(id)?;
        let lock = self.lock_for(id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let assessment = self.get(id)?;
        let rubric = self.rubric_for(&assessment)?;
        let records = self.scores(id)?;

        let next = match lifecycle::submit(&assessment, &rubric, &records, Utc::now()) {
            Ok(next) => next,
            Err(error) => {
                warn!(assessment_id = %id, %error, "submission rejected");
                return Err(error.into());
            }
        };
        self.repository.update(next.clone())?;

        info!(
            assessment_id = %id,
            overall_score = next.overall_score.unwrap_or_default(),
            classification = next.classification.map(Classification::label).unwrap_or_default(),
            "assessment submitted"
        );
        Ok(next)
    }

    pub fn approve(&self, id: &AssessmentId) -> Result<Assessment, AssessmentServiceError> {
        self.get(id)?;
        let lock = self.lock_for(id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let assessment = self.get(id)?;
        let next = lifecycle::approve(&assessment, Utc::now())?;
        self.repository.update(next.clone())?;
        info!(assessment_id = %id, "assessment approved");
        Ok(next)
    }

    pub fn portfolio_summary(&self) -> Result<PortfolioSummary, AssessmentServiceError> {
        let assessments = self.repository.list()?;
        Ok(PortfolioSummary::from_assessments(&assessments))
    }

    fn rubric_for(&self, assessment: &Assessment) -> Result<Rubric, AssessmentServiceError> {
        self.catalog.fetch(&assessment.rubric_id)?.ok_or_else(|| {
            MissingRubricError {
                assessment_id: assessment.id.clone(),
                rubric_id: assessment.rubric_id.clone(),
            }
            .into()
        })
    }

    /// Callers check the assessment exists first so unknown ids never get an entry.
    fn lock_for(&self, id: &AssessmentId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(id.clone()).or_default().clone()
    }

    #[cfg(test)]
    pub(crate) fn tracked_locks(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn next_assessment_id(&self) -> AssessmentId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        AssessmentId(format!("assessment-{id:06}"))
    }
}

/// Aggregation requested for an assessment whose rubric is not available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("rubric '{rubric_id}' for assessment {assessment_id} is not available")]
pub struct MissingRubricError {
    pub assessment_id: AssessmentId,
    pub rubric_id: RubricId,
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    InvalidScore(#[from] InvalidScoreError),
    #[error(transparent)]
    SubmissionNotAllowed(#[from] SubmissionNotAllowedError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    MissingRubric(#[from] MissingRubricError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
