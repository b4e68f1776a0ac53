//! Assessment status transitions. Each transition works on a copy of the assessment and hands
//! back the new value set only when every guard passes, so a rejected transition leaves the
//! caller's assessment untouched.

use chrono::{DateTime, Utc};

use super::aggregation;
use super::domain::{Assessment, AssessmentId, AssessmentStatus, Classification, ScoreRecord};
use super::rubric::Rubric;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionNotAllowedError {
    #[error("assessment {assessment_id} is {progress}% complete; every subcategory must be scored before submission")]
    Incomplete {
        assessment_id: AssessmentId,
        progress: u8,
    },
    #[error("assessment {assessment_id} is already {}", .status.label())]
    Locked {
        assessment_id: AssessmentId,
        status: AssessmentStatus,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("assessment {assessment_id} cannot move from {} to {}", .from.label(), .to.label())]
    NotAllowed {
        assessment_id: AssessmentId,
        from: AssessmentStatus,
        to: AssessmentStatus,
    },
    #[error("assessment {assessment_id} is {}; scores can no longer change", .status.label())]
    Locked {
        assessment_id: AssessmentId,
        status: AssessmentStatus,
    },
    #[error("assessment {assessment_id} is only {progress}% complete")]
    Incomplete {
        assessment_id: AssessmentId,
        progress: u8,
    },
}

/// Guard run before a score is written: submitted and approved assessments are frozen.
pub fn ensure_scorable(assessment: &Assessment) -> Result<(), TransitionError> {
    if assessment.status.is_locked() {
        return Err(TransitionError::Locked {
            assessment_id: assessment.id.clone(),
            status: assessment.status,
        });
    }
    Ok(())
}

/// Apply the effects of a saved score: the first score moves a draft to in progress and the
/// progress figure is always refreshed. Reaching 100% never changes the status by itself.
pub fn record_score(assessment: &Assessment, progress: u8, now: DateTime<Utc>) -> Assessment {
    let mut next = assessment.clone();
    if next.status == AssessmentStatus::Draft {
        next.status = AssessmentStatus::InProgress;
    }
    next.progress = progress;
    next.updated_at = now;
    next
}

/// Explicit completion once every subcategory is scored.
pub fn complete(
    assessment: &Assessment,
    rubric: &Rubric,
    records: &[ScoreRecord],
    now: DateTime<Utc>,
) -> Result<Assessment, TransitionError> {
    if assessment.status != AssessmentStatus::InProgress {
        return Err(TransitionError::NotAllowed {
            assessment_id: assessment.id.clone(),
            from: assessment.status,
            to: AssessmentStatus::Completed,
        });
    }

    let progress = aggregation::progress(rubric, records);
    if progress < 100 {
        return Err(TransitionError::Incomplete {
            assessment_id: assessment.id.clone(),
            progress,
        });
    }

    let mut next = assessment.clone();
    next.status = AssessmentStatus::Completed;
    next.progress = progress;
    next.completed_at = Some(now);
    next.updated_at = now;
    Ok(next)
}

/// Submit a fully scored assessment, fixing its overall score and classification.
pub fn submit(
    assessment: &Assessment,
    rubric: &Rubric,
    records: &[ScoreRecord],
    now: DateTime<Utc>,
) -> Result<Assessment, SubmissionNotAllowedError> {
    if assessment.status.is_locked() {
        return Err(SubmissionNotAllowedError::Locked {
            assessment_id: assessment.id.clone(),
            status: assessment.status,
        });
    }

    let progress = aggregation::progress(rubric, records);
    if progress < 100 {
        return Err(SubmissionNotAllowedError::Incomplete {
            assessment_id: assessment.id.clone(),
            progress,
        });
    }

    let overall_score = aggregation::overall_score(rubric, records);

    let mut next = assessment.clone();
    next.status = AssessmentStatus::Submitted;
    next.progress = 100;
    next.overall_score = Some(overall_score);
    next.classification = Some(Classification::from_score(overall_score));
    next.completed_at = Some(now);
    next.submitted_at = Some(now);
    next.updated_at = now;
    Ok(next)
}

pub fn approve(assessment: &Assessment, now: DateTime<Utc>) -> Result<Assessment, TransitionError> {
    if assessment.status != AssessmentStatus::Submitted {
        return Err(TransitionError::NotAllowed {
            assessment_id: assessment.id.clone(),
            from: assessment.status,
            to: AssessmentStatus::Approved,
        });
    }

    let mut next = assessment.clone();
    next.status = AssessmentStatus::Approved;
    next.approved_at = Some(now);
    next.updated_at = now;
    Ok(next)
}
