use serde::Serialize;

use super::domain::{Assessment, AssessmentStatus, Classification};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: AssessmentStatus,
    pub status_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationCount {
    pub classification: Classification,
    pub classification_label: &'static str,
    pub count: usize,
}

/// Portfolio-wide roll-up of assessment status and outcomes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub total: usize,
    /// Completed, submitted, and approved assessments.
    pub finished: usize,
    pub by_status: Vec<StatusCount>,
    pub by_classification: Vec<ClassificationCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_overall_score: Option<f64>,
    pub average_progress: u8,
}

impl PortfolioSummary {
    pub fn from_assessments(assessments: &[Assessment]) -> Self {
        let by_status = AssessmentStatus::ordered()
            .into_iter()
            .map(|status| StatusCount {
                status,
                status_label: status.label(),
                count: assessments
                    .iter()
                    .filter(|assessment| assessment.status == status)
                    .count(),
            })
            .collect();

        let by_classification = Classification::ordered()
            .into_iter()
            .map(|classification| ClassificationCount {
                classification,
                classification_label: classification.label(),
                count: assessments
                    .iter()
                    .filter(|assessment| assessment.classification == Some(classification))
                    .count(),
            })
            .collect();

        let finished = assessments
            .iter()
            .filter(|assessment| {
                matches!(
                    assessment.status,
                    AssessmentStatus::Completed
                        | AssessmentStatus::Submitted
                        | AssessmentStatus::Approved
                )
            })
            .count();

        let scored: Vec<f64> = assessments
            .iter()
            .filter_map(|assessment| assessment.overall_score)
            .collect();
        let average_overall_score =
            (!scored.is_empty()).then(|| scored.iter().sum::<f64>() / scored.len() as f64);

        let average_progress = if assessments.is_empty() {
            0
        } else {
            let total: u32 = assessments
                .iter()
                .map(|assessment| u32::from(assessment.progress))
                .sum();
            (f64::from(total) / assessments.len() as f64).round() as u8
        };

        Self {
            total: assessments.len(),
            finished,
            by_status,
            by_classification,
            average_overall_score,
            average_progress,
        }
    }

    pub fn count_for(&self, status: AssessmentStatus) -> usize {
        self.by_status
            .iter()
            .find(|entry| entry.status == status)
            .map(|entry| entry.count)
            .unwrap_or(0)
    }
}
