//! CSV score sheet import.
//!
//! Sheets carry `Category,Subcategory,Score,Comments,Confidence` columns. Rows are applied to a
//! ledger in order, so a later row for the same subcategory replaces an earlier one. The
//! `Category` cell may be left blank when the subcategory id is unique within the rubric.

mod parser;

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::workflows::assessment::{
    AssessmentId, CategoryId, InvalidScoreError, Rubric, ScoreInput, ScoreLedger, SubcategoryId,
};

#[derive(Debug)]
pub enum ScoreSheetImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    UnknownSubcategory {
        row: usize,
        subcategory_id: SubcategoryId,
    },
    InvalidScore {
        row: usize,
        source: InvalidScoreError,
    },
}

impl std::fmt::Display for ScoreSheetImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreSheetImportError::Io(err) => write!(f, "failed to read score sheet: {}", err),
            ScoreSheetImportError::Csv(err) => write!(f, "invalid score sheet data: {}", err),
            ScoreSheetImportError::UnknownSubcategory {
                row,
                subcategory_id,
            } => write!(
                f,
                "row {}: subcategory '{}' is not part of the rubric",
                row, subcategory_id
            ),
            ScoreSheetImportError::InvalidScore { row, source } => {
                write!(f, "row {}: {}", row, source)
            }
        }
    }
}

impl std::error::Error for ScoreSheetImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScoreSheetImportError::Io(err) => Some(err),
            ScoreSheetImportError::Csv(err) => Some(err),
            ScoreSheetImportError::UnknownSubcategory { .. } => None,
            ScoreSheetImportError::InvalidScore { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for ScoreSheetImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ScoreSheetImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct ScoreSheetImporter;

impl ScoreSheetImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        rubric: &Rubric,
        assessment_id: &AssessmentId,
        now: DateTime<Utc>,
    ) -> Result<ScoreLedger, ScoreSheetImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, rubric, assessment_id, now)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        rubric: &Rubric,
        assessment_id: &AssessmentId,
        now: DateTime<Utc>,
    ) -> Result<ScoreLedger, ScoreSheetImportError> {
        let mut ledger = ScoreLedger::new();
        Self::apply(reader, rubric, assessment_id, now, &mut ledger)?;
        Ok(ledger)
    }

    /// Apply a sheet on top of an existing ledger, returning how many rows were written. The
    /// sheet is validated in full before anything touches `ledger`.
    pub fn apply<R: Read>(
        reader: R,
        rubric: &Rubric,
        assessment_id: &AssessmentId,
        now: DateTime<Utc>,
        ledger: &mut ScoreLedger,
    ) -> Result<usize, ScoreSheetImportError> {
        let rows = parser::parse_rows(reader)?;
        let mut staged = ledger.clone();

        for row in &rows {
            let input = score_input(rubric, row)?;
            staged
                .upsert(rubric, assessment_id, input, now)
                .map_err(|source| ScoreSheetImportError::InvalidScore {
                    row: row.row,
                    source,
                })?;
        }

        *ledger = staged;
        Ok(rows.len())
    }
}

fn score_input(
    rubric: &Rubric,
    row: &parser::ScoreSheetRow,
) -> Result<ScoreInput, ScoreSheetImportError> {
    let subcategory_id = SubcategoryId(row.subcategory.clone());
    let category_id = match &row.category {
        Some(category) => CategoryId(category.clone()),
        None => rubric
            .locate(&subcategory_id)
            .map(|(category, _)| category.id.clone())
            .ok_or_else(|| ScoreSheetImportError::UnknownSubcategory {
                row: row.row,
                subcategory_id: subcategory_id.clone(),
            })?,
    };

    Ok(ScoreInput {
        category_id,
        subcategory_id,
        score: row.score,
        comment: row.comments.clone(),
        confidence_level: row.confidence,
    })
}
