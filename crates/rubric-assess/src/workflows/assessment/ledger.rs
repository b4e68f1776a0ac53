use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::domain::{
    AssessmentId, CategoryId, ConfidenceLevel, InvalidConfidenceLevel, RubricId, ScoreInput,
    ScoreRecord, SubcategoryId,
};
use super::rubric::Rubric;

/// Rejection raised when a score does not correspond to a criterion of the rubric.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidScoreError {
    #[error("category '{category_id}' is not part of rubric '{rubric_id}'")]
    UnknownCategory {
        rubric_id: RubricId,
        category_id: CategoryId,
    },
    #[error("subcategory '{subcategory_id}' is not part of category '{category_id}'")]
    UnknownSubcategory {
        category_id: CategoryId,
        subcategory_id: SubcategoryId,
    },
    #[error("score {score} is not a defined criterion for '{subcategory_id}' (allowed: {allowed:?})")]
    UndefinedCriterion {
        subcategory_id: SubcategoryId,
        score: u8,
        allowed: Vec<u8>,
    },
    #[error(transparent)]
    Confidence(#[from] InvalidConfidenceLevel),
}

/// In-memory snapshot of recorded scores keyed by (assessment, subcategory).
///
/// Saving a score for a subcategory that already has one replaces it; the ledger never holds two
/// records for the same key.
#[derive(Debug, Clone, Default)]
pub struct ScoreLedger {
    records: BTreeMap<(AssessmentId, SubcategoryId), ScoreRecord>,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from persisted records. Later duplicates win.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = ScoreRecord>,
    {
        let records = records
            .into_iter()
            .map(|record| {
                (
                    (record.assessment_id.clone(), record.subcategory_id.clone()),
                    record,
                )
            })
            .collect();
        Self { records }
    }

    /// Validate `input` against `rubric` and store it, replacing any prior record for the same
    /// subcategory. Nothing is stored when validation fails.
    pub fn upsert(
        &mut self,
        rubric: &Rubric,
        assessment_id: &AssessmentId,
        input: ScoreInput,
        now: DateTime<Utc>,
    ) -> Result<ScoreRecord, InvalidScoreError> {
        let previous = self.get(assessment_id, &input.subcategory_id);
        let record = build_record(rubric, assessment_id, input, previous, now)?;

        self.records.insert(
            (assessment_id.clone(), record.subcategory_id.clone()),
            record.clone(),
        );
        Ok(record)
    }

    pub fn get(
        &self,
        assessment_id: &AssessmentId,
        subcategory_id: &SubcategoryId,
    ) -> Option<&ScoreRecord> {
        self.records
            .get(&(assessment_id.clone(), subcategory_id.clone()))
    }

    pub fn list_for(&self, assessment_id: &AssessmentId) -> Vec<ScoreRecord> {
        self.records
            .values()
            .filter(|record| &record.assessment_id == assessment_id)
            .cloned()
            .collect()
    }

    /// Whether saving `candidate` would change the stored record. Comments compare trimmed and
    /// a missing confidence level counts as the default on both sides.
    pub fn has_changes(&self, assessment_id: &AssessmentId, candidate: &ScoreInput) -> bool {
        let Some(existing) = self.get(assessment_id, &candidate.subcategory_id) else {
            return true;
        };

        let stored_comment = existing.comment.as_deref().unwrap_or_default().trim();
        let candidate_comment = candidate.comment.as_deref().unwrap_or_default().trim();
        let candidate_confidence = candidate
            .confidence_level
            .unwrap_or(ConfidenceLevel::DEFAULT.value());

        existing.score != candidate.score
            || stored_comment != candidate_comment
            || existing.confidence_level.value() != candidate_confidence
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Validate a score against the rubric and produce the record that would be stored. `previous`
/// keeps the original creation timestamp when a score is replaced.
pub fn build_record(
    rubric: &Rubric,
    assessment_id: &AssessmentId,
    input: ScoreInput,
    previous: Option<&ScoreRecord>,
    now: DateTime<Utc>,
) -> Result<ScoreRecord, InvalidScoreError> {
    let category =
        rubric
            .category(&input.category_id)
            .ok_or_else(|| InvalidScoreError::UnknownCategory {
                rubric_id: rubric.id.clone(),
                category_id: input.category_id.clone(),
            })?;

    let subcategory = category.subcategory(&input.subcategory_id).ok_or_else(|| {
        InvalidScoreError::UnknownSubcategory {
            category_id: input.category_id.clone(),
            subcategory_id: input.subcategory_id.clone(),
        }
    })?;

    if subcategory.criterion(input.score).is_none() {
        return Err(InvalidScoreError::UndefinedCriterion {
            subcategory_id: input.subcategory_id,
            score: input.score,
            allowed: subcategory.allowed_scores(),
        });
    }

    let confidence_level = match input.confidence_level {
        Some(value) => ConfidenceLevel::try_from(value)?,
        None => ConfidenceLevel::DEFAULT,
    };

    let comment = input
        .comment
        .map(|comment| comment.trim().to_string())
        .filter(|comment| !comment.is_empty());

    Ok(ScoreRecord {
        assessment_id: assessment_id.clone(),
        category_id: input.category_id,
        subcategory_id: input.subcategory_id,
        score: input.score,
        comment,
        confidence_level,
        created_at: previous.map(|record| record.created_at).unwrap_or(now),
        updated_at: now,
    })
}
