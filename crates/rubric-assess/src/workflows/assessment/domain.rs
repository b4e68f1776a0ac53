use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for assessments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssessmentId(pub String);

/// Identifier of the application (system) under assessment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RubricId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubcategoryId(pub String);

macro_rules! display_inner {
    ($($name:ident),+ $(,)?) => {
        $(
            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }
        )+
    };
}

display_inner!(AssessmentId, ApplicationId, RubricId, CategoryId, SubcategoryId);

/// Status tracked throughout the assessment lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    Draft,
    InProgress,
    Completed,
    Submitted,
    Approved,
}

impl AssessmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AssessmentStatus::Draft => "draft",
            AssessmentStatus::InProgress => "in_progress",
            AssessmentStatus::Completed => "completed",
            AssessmentStatus::Submitted => "submitted",
            AssessmentStatus::Approved => "approved",
        }
    }

    pub const fn ordered() -> [AssessmentStatus; 5] {
        [
            AssessmentStatus::Draft,
            AssessmentStatus::InProgress,
            AssessmentStatus::Completed,
            AssessmentStatus::Submitted,
            AssessmentStatus::Approved,
        ]
    }

    /// Submitted and approved assessments are frozen; nothing in the engine reopens them.
    pub const fn is_locked(self) -> bool {
        matches!(
            self,
            AssessmentStatus::Submitted | AssessmentStatus::Approved
        )
    }
}

/// Portfolio disposition derived from the overall score at submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Strategic,
    Important,
    Acceptable,
    NeedsImprovement,
    Retire,
}

impl Classification {
    pub const STRATEGIC_THRESHOLD: f64 = 4.5;
    pub const IMPORTANT_THRESHOLD: f64 = 3.5;
    pub const ACCEPTABLE_THRESHOLD: f64 = 2.5;
    pub const NEEDS_IMPROVEMENT_THRESHOLD: f64 = 1.5;

    /// Threshold the overall score into a classification. Cut points are inclusive.
    pub fn from_score(overall_score: f64) -> Self {
        if overall_score >= Self::STRATEGIC_THRESHOLD {
            Classification::Strategic
        } else if overall_score >= Self::IMPORTANT_THRESHOLD {
            Classification::Important
        } else if overall_score >= Self::ACCEPTABLE_THRESHOLD {
            Classification::Acceptable
        } else if overall_score >= Self::NEEDS_IMPROVEMENT_THRESHOLD {
            Classification::NeedsImprovement
        } else {
            Classification::Retire
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Classification::Strategic => "strategic",
            Classification::Important => "important",
            Classification::Acceptable => "acceptable",
            Classification::NeedsImprovement => "needs_improvement",
            Classification::Retire => "retire",
        }
    }

    pub const fn ordered() -> [Classification; 5] {
        [
            Classification::Strategic,
            Classification::Important,
            Classification::Acceptable,
            Classification::NeedsImprovement,
            Classification::Retire,
        ]
    }
}

/// Assessor confidence in a recorded score, on a 1-5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ConfidenceLevel(u8);

impl ConfidenceLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    pub const DEFAULT: ConfidenceLevel = ConfidenceLevel(3);

    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX)
            .contains(&value)
            .then_some(Self(value))
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl Default for ConfidenceLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for ConfidenceLevel {
    type Error = InvalidConfidenceLevel;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidConfidenceLevel(value))
    }
}

impl From<ConfidenceLevel> for u8 {
    fn from(value: ConfidenceLevel) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("confidence level {0} is outside the 1-5 scale")]
pub struct InvalidConfidenceLevel(pub u8);

/// Score captured by an assessor for a single subcategory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreInput {
    pub category_id: CategoryId,
    pub subcategory_id: SubcategoryId,
    pub score: u8,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub confidence_level: Option<u8>,
}

/// Ledger fact: the current score for one subcategory of one assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub assessment_id: AssessmentId,
    pub category_id: CategoryId,
    pub subcategory_id: SubcategoryId,
    pub score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub confidence_level: ConfidenceLevel,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to open a new assessment of an application against a rubric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentRequest {
    pub application_id: ApplicationId,
    pub rubric_id: RubricId,
    pub assessor_id: String,
}

/// Assessment header plus the values derived from its ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: AssessmentId,
    pub application_id: ApplicationId,
    pub rubric_id: RubricId,
    pub assessor_id: String,
    pub status: AssessmentStatus,
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assessment {
    pub fn draft(id: AssessmentId, request: AssessmentRequest, now: DateTime<Utc>) -> Self {
        Self {
            id,
            application_id: request.application_id,
            rubric_id: request.rubric_id,
            assessor_id: request.assessor_id,
            status: AssessmentStatus::Draft,
            progress: 0,
            overall_score: None,
            classification: None,
            started_at: now,
            completed_at: None,
            submitted_at: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
